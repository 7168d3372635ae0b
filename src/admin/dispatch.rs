use crate::admin::commands::{AdminCommand, CommandOutcome, OutcomeData};
use crate::admin::query::{self, Page, QueryError};
use crate::admin::roles::{has_role, AccountRole};
use crate::admin::{accounts, items, maps, monsters, players, spells};
use crate::config::GameConfig;
use crate::world::state::WorldState;
use std::sync::{Arc, Mutex};

/// Who is issuing commands. The role value is resolved once when the
/// session opens; a role change applies from the next session on.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub account: String,
    pub role: u8,
}

impl AdminIdentity {
    pub fn new(account: impl Into<String>, role: u8) -> AdminIdentity {
        AdminIdentity {
            account: account.into(),
            role,
        }
    }
}

/// Required tier per command. Reads are open to any operator, destructive
/// player-facing commands need admin, and catalog or role edits need the
/// top tier.
pub fn required_role(command: &AdminCommand) -> AccountRole {
    match command {
        AdminCommand::SearchAccounts { .. }
        | AdminCommand::ListPlayers { .. }
        | AdminCommand::SearchItems { .. }
        | AdminCommand::SearchMonsters { .. }
        | AdminCommand::ListMaps
        | AdminCommand::SearchSpells { .. } => AccountRole::Normal,
        AdminCommand::Broadcast { .. } => AccountRole::Operator,
        AdminCommand::BanAccount { .. }
        | AdminCommand::UnbanAccount { .. }
        | AdminCommand::AdjustCurrency { .. }
        | AdminCommand::TeleportPlayer { .. }
        | AdminCommand::SummonPlayer { .. }
        | AdminCommand::KickPlayer { .. }
        | AdminCommand::LevelUp { .. }
        | AdminCommand::ItemDetail { .. }
        | AdminCommand::GiveItem { .. }
        | AdminCommand::MonsterDetail { .. }
        | AdminCommand::SpawnMonsters { .. }
        | AdminCommand::ClearMapMonsters { .. }
        | AdminCommand::MapDetail { .. }
        | AdminCommand::GrantSpell { .. }
        | AdminCommand::GrantClassSpells { .. }
        | AdminCommand::RevokeSpell { .. } => AccountRole::Admin,
        AdminCommand::SetAccountRole { .. }
        | AdminCommand::CreateItem { .. }
        | AdminCommand::UpdateItem { .. }
        | AdminCommand::CreateMonster { .. }
        | AdminCommand::UpdateMonster { .. }
        | AdminCommand::CreateMap { .. }
        | AdminCommand::UpdateMap { .. }
        | AdminCommand::UpdateSpell { .. } => AccountRole::SuperAdmin,
    }
}

/// The command gateway. Shares the world mutex with the simulation loop and
/// holds a command for exactly one lock acquisition.
pub struct AdminConsole {
    world: Arc<Mutex<WorldState>>,
    config: GameConfig,
}

impl AdminConsole {
    pub fn new(world: Arc<Mutex<WorldState>>, config: GameConfig) -> AdminConsole {
        AdminConsole { world, config }
    }

    pub fn world(&self) -> &Arc<Mutex<WorldState>> {
        &self.world
    }

    /// Role gate, then the per-command body. Queries degrade to an empty
    /// result when the world lock is poisoned; mutations fail instead.
    pub fn execute(&self, identity: &AdminIdentity, command: AdminCommand) -> CommandOutcome {
        let required = required_role(&command);
        if !has_role(identity.role, required) {
            return CommandOutcome::failure(format!(
                "this command requires the {} role",
                required.name()
            ));
        }

        match command {
            AdminCommand::SearchAccounts { keyword, page } => page_outcome(
                accounts::search_accounts(&self.world, &keyword, page),
                OutcomeData::Accounts,
                query::ACCOUNT_PAGE_SIZE,
                "accounts",
            ),
            AdminCommand::BanAccount { email } => {
                self.locked(|world| accounts::set_ban(world, &email, true))
            }
            AdminCommand::UnbanAccount { email } => {
                self.locked(|world| accounts::set_ban(world, &email, false))
            }
            AdminCommand::AdjustCurrency {
                email,
                currency,
                delta,
            } => self.locked(|world| accounts::adjust_currency(world, &email, currency, delta)),
            AdminCommand::SetAccountRole { email, role } => {
                self.locked(|world| accounts::set_account_role(world, &email, role))
            }
            AdminCommand::ListPlayers { keyword } => list_outcome(
                players::list_players(&self.world, &keyword),
                OutcomeData::Players,
                "players",
            ),
            AdminCommand::TeleportPlayer { name, map, x, y } => {
                self.locked(|world| players::teleport_player(world, &name, map, x, y))
            }
            AdminCommand::SummonPlayer { target, anchor } => {
                self.locked(|world| players::summon_player(world, &target, &anchor))
            }
            AdminCommand::KickPlayer { name } => {
                self.locked(|world| players::kick_player(world, &name))
            }
            AdminCommand::LevelUp { name, levels } => self.locked(|world| {
                players::level_up(world, &name, levels, self.config.max_level)
            }),
            AdminCommand::Broadcast { message } => {
                self.locked(|world| players::broadcast(world, &message))
            }
            AdminCommand::SearchItems {
                keyword,
                category,
                page,
            } => page_outcome(
                items::search_items(&self.world, &keyword, category, page),
                OutcomeData::Items,
                query::ITEM_PAGE_SIZE,
                "items",
            ),
            AdminCommand::ItemDetail { item } => {
                self.locked(|world| items::item_detail(world, item))
            }
            AdminCommand::GiveItem { name, item, count } => self.locked(|world| {
                items::give_item(world, &name, item, count, self.config.inventory_capacity)
            }),
            AdminCommand::CreateItem { name, patch } => {
                self.locked(|world| items::create_item(world, &name, &patch))
            }
            AdminCommand::UpdateItem { item, patch } => {
                self.locked(|world| items::update_item(world, item, &patch))
            }
            AdminCommand::SearchMonsters { keyword, page } => page_outcome(
                monsters::search_monsters(&self.world, &keyword, page),
                OutcomeData::Monsters,
                query::MONSTER_PAGE_SIZE,
                "monsters",
            ),
            AdminCommand::MonsterDetail { monster } => {
                self.locked(|world| monsters::monster_detail(world, monster))
            }
            AdminCommand::SpawnMonsters {
                anchor,
                monster,
                count,
                radius,
            } => self.locked(|world| {
                monsters::spawn_monsters(world, &anchor, monster, count, radius)
            }),
            AdminCommand::ClearMapMonsters { anchor } => {
                self.locked(|world| monsters::clear_map_monsters(world, &anchor))
            }
            AdminCommand::CreateMonster { name, patch } => {
                self.locked(|world| monsters::create_monster(world, &name, &patch))
            }
            AdminCommand::UpdateMonster { monster, patch } => {
                self.locked(|world| monsters::update_monster(world, monster, &patch))
            }
            AdminCommand::ListMaps => list_outcome(
                maps::list_maps(&self.world),
                OutcomeData::Maps,
                "maps",
            ),
            AdminCommand::MapDetail { map } => self.locked(|world| maps::map_detail(world, map)),
            AdminCommand::CreateMap { file_name, patch } => {
                self.locked(|world| maps::create_map(world, &file_name, &patch))
            }
            AdminCommand::UpdateMap { map, patch } => {
                self.locked(|world| maps::update_map(world, map, &patch))
            }
            AdminCommand::SearchSpells {
                keyword,
                class,
                school,
                page,
            } => page_outcome(
                spells::search_spells(&self.world, &keyword, class, school, page),
                OutcomeData::Spells,
                query::SPELL_PAGE_SIZE,
                "spells",
            ),
            AdminCommand::GrantSpell { name, spell, level } => self.locked(|world| {
                spells::grant_spell(world, &name, spell, level, self.config.max_spell_level)
            }),
            AdminCommand::GrantClassSpells { name, level } => self.locked(|world| {
                spells::grant_class_spells(world, &name, level, self.config.max_spell_level)
            }),
            AdminCommand::RevokeSpell { name, spell } => {
                self.locked(|world| spells::revoke_spell(world, &name, spell))
            }
            AdminCommand::UpdateSpell { spell, patch } => {
                self.locked(|world| spells::update_spell(world, spell, &patch))
            }
        }
    }

    fn locked<F>(&self, body: F) -> CommandOutcome
    where
        F: FnOnce(&mut WorldState) -> Result<CommandOutcome, String>,
    {
        let Ok(mut world) = self.world.lock() else {
            return CommandOutcome::failure("world state unavailable");
        };
        body(&mut world).unwrap_or_else(|message| CommandOutcome::failure(message))
    }
}

fn page_outcome<T>(
    result: Result<Page<T>, QueryError>,
    wrap: fn(Page<T>) -> OutcomeData,
    page_size: usize,
    what: &str,
) -> CommandOutcome {
    let page = result.unwrap_or_else(|_| Page::empty(page_size));
    CommandOutcome::with_data(format!("found {} {}", page.total, what), wrap(page))
}

fn list_outcome<T>(
    result: Result<Vec<T>, QueryError>,
    wrap: fn(Vec<T>) -> OutcomeData,
    what: &str,
) -> CommandOutcome {
    let items = result.unwrap_or_default();
    CommandOutcome::with_data(format!("found {} {}", items.len(), what), wrap(items))
}
