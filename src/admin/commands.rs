use crate::admin::accounts::AccountView;
use crate::admin::maps::MapView;
use crate::admin::players::PlayerView;
use crate::admin::query::Page;
use crate::entities::account::CurrencyKind;
use crate::entities::character::CharacterClass;
use crate::entities::item::{ClassRequirement, ItemCategory, ItemRecord, Rarity};
use crate::entities::monster::MonsterRecord;
use crate::entities::spell::{CastMode, SpellRecord, SpellSchool, SPELL_TIERS};
use crate::entities::stats::StatKind;
use crate::world::map::MapRecord;

/// One administrative action. Every variant maps to exactly one required
/// role and one execute body in the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    SearchAccounts { keyword: String, page: i64 },
    BanAccount { email: String },
    UnbanAccount { email: String },
    AdjustCurrency { email: String, currency: CurrencyKind, delta: i64 },
    SetAccountRole { email: String, role: u8 },
    ListPlayers { keyword: String },
    TeleportPlayer { name: String, map: u32, x: i32, y: i32 },
    SummonPlayer { target: String, anchor: String },
    KickPlayer { name: String },
    LevelUp { name: String, levels: u16 },
    Broadcast { message: String },
    SearchItems { keyword: String, category: Option<ItemCategory>, page: i64 },
    ItemDetail { item: u32 },
    GiveItem { name: String, item: u32, count: u32 },
    CreateItem { name: String, patch: ItemPatch },
    UpdateItem { item: u32, patch: ItemPatch },
    SearchMonsters { keyword: String, page: i64 },
    MonsterDetail { monster: u32 },
    SpawnMonsters { anchor: String, monster: u32, count: u32, radius: i32 },
    ClearMapMonsters { anchor: String },
    CreateMonster { name: String, patch: MonsterPatch },
    UpdateMonster { monster: u32, patch: MonsterPatch },
    ListMaps,
    MapDetail { map: u32 },
    CreateMap { file_name: String, patch: MapPatch },
    UpdateMap { map: u32, patch: MapPatch },
    SearchSpells {
        keyword: String,
        class: Option<CharacterClass>,
        school: Option<SpellSchool>,
        page: i64,
    },
    GrantSpell { name: String, spell: u32, level: u8 },
    GrantClassSpells { name: String, level: u8 },
    RevokeSpell { name: String, spell: u32 },
    UpdateSpell { spell: u32, patch: SpellPatch },
}

/// Uniform result of every dispatched command. Failures carry a lowercase
/// reason; successes may carry structured data for the caller to render.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub ok: bool,
    pub message: String,
    pub data: Option<OutcomeData>,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> CommandOutcome {
        CommandOutcome {
            ok: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: OutcomeData) -> CommandOutcome {
        CommandOutcome {
            ok: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> CommandOutcome {
        CommandOutcome {
            ok: false,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OutcomeData {
    Accounts(Page<AccountView>),
    Players(Vec<PlayerView>),
    Items(Page<ItemRecord>),
    Item(ItemRecord),
    Monsters(Page<MonsterRecord>),
    Monster(MonsterRecord),
    Maps(Vec<MapView>),
    Map(MapRecord),
    Spells(Page<SpellRecord>),
}

/// Field set for item create/update. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub category: Option<ItemCategory>,
    pub required_class: Option<ClassRequirement>,
    pub required_level: Option<u16>,
    pub stack_size: Option<u32>,
    pub price: Option<u32>,
    pub weight: Option<u32>,
    pub durability: Option<u32>,
    pub rarity: Option<Rarity>,
}

impl ItemPatch {
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = Some(required_text(value, "item name")?),
            "category" => {
                self.category = Some(
                    ItemCategory::parse(value)
                        .ok_or_else(|| format!("unknown category '{}'", value))?,
                )
            }
            "required_class" | "class" => {
                self.required_class = Some(
                    ClassRequirement::parse(value)
                        .ok_or_else(|| format!("unknown class requirement '{}'", value))?,
                )
            }
            "required_level" => self.required_level = Some(parse_number(value, "required_level")?),
            "stack_size" => self.stack_size = Some(parse_number(value, "stack_size")?),
            "price" => self.price = Some(parse_number(value, "price")?),
            "weight" => self.weight = Some(parse_number(value, "weight")?),
            "durability" => self.durability = Some(parse_number(value, "durability")?),
            "rarity" => {
                self.rarity = Some(
                    Rarity::parse(value).ok_or_else(|| format!("unknown rarity '{}'", value))?,
                )
            }
            _ => return Err(format!("unknown item field '{}'", key)),
        }
        Ok(())
    }

    pub fn apply(&self, record: &mut ItemRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(category) = self.category {
            record.category = category;
        }
        if let Some(required_class) = self.required_class {
            record.required_class = required_class;
        }
        if let Some(required_level) = self.required_level {
            record.required_level = required_level;
        }
        if let Some(stack_size) = self.stack_size {
            record.stack_size = stack_size;
        }
        if let Some(price) = self.price {
            record.price = price;
        }
        if let Some(weight) = self.weight {
            record.weight = weight;
        }
        if let Some(durability) = self.durability {
            record.durability = durability;
        }
        if let Some(rarity) = self.rarity {
            record.rarity = rarity;
        }
        // A stack size below 1 is stored as 1.
        record.stack_size = record.stack_size.max(1);
    }
}

/// Field set for monster create/update. Stat entries go through the sparse
/// set, where an amount of 0 removes the entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonsterPatch {
    pub name: Option<String>,
    pub level: Option<u16>,
    pub experience: Option<u32>,
    pub view_range: Option<u8>,
    pub attack_delay: Option<u32>,
    pub move_delay: Option<u32>,
    pub boss: Option<bool>,
    pub undead: Option<bool>,
    pub tameable: Option<bool>,
    pub pushable: Option<bool>,
    pub stats: Vec<(StatKind, i32)>,
}

impl MonsterPatch {
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = Some(required_text(value, "monster name")?),
            "level" => self.level = Some(parse_number(value, "level")?),
            "experience" => self.experience = Some(parse_number(value, "experience")?),
            "view_range" => self.view_range = Some(parse_number(value, "view_range")?),
            "attack_delay" => self.attack_delay = Some(parse_number(value, "attack_delay")?),
            "move_delay" => self.move_delay = Some(parse_number(value, "move_delay")?),
            "boss" => self.boss = Some(parse_bool(value, "boss")?),
            "undead" => self.undead = Some(parse_bool(value, "undead")?),
            "tameable" => self.tameable = Some(parse_bool(value, "tameable")?),
            "pushable" => self.pushable = Some(parse_bool(value, "pushable")?),
            _ => {
                let Some(kind) = StatKind::parse(key) else {
                    return Err(format!("unknown monster field '{}'", key));
                };
                let amount = parse_number(value, key)?;
                self.stats.push((kind, amount));
            }
        }
        Ok(())
    }

    pub fn apply(&self, record: &mut MonsterRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(level) = self.level {
            record.level = level;
        }
        if let Some(experience) = self.experience {
            record.experience = experience;
        }
        if let Some(view_range) = self.view_range {
            record.view_range = view_range;
        }
        if let Some(attack_delay) = self.attack_delay {
            record.attack_delay = attack_delay;
        }
        if let Some(move_delay) = self.move_delay {
            record.move_delay = move_delay;
        }
        if let Some(boss) = self.boss {
            record.flags.boss = boss;
        }
        if let Some(undead) = self.undead {
            record.flags.undead = undead;
        }
        if let Some(tameable) = self.tameable {
            record.flags.tameable = tameable;
        }
        if let Some(pushable) = self.pushable {
            record.flags.pushable = pushable;
        }
        for (kind, amount) in &self.stats {
            record.stats.set(*kind, *amount);
        }
        record.stats_changed();
    }
}

/// Field set for map create/update. Only the definition record changes; a
/// running grid is never touched by these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPatch {
    pub file_name: Option<String>,
    pub description: Option<String>,
    pub allow_recall: Option<bool>,
    pub allow_teleport: Option<bool>,
    pub can_mine: Option<bool>,
    pub min_level: Option<u16>,
    pub max_level: Option<u16>,
    pub drop_rate: Option<u32>,
    pub max_drop_rate: Option<u32>,
    pub experience_rate: Option<u32>,
    pub max_experience_rate: Option<u32>,
    pub gold_rate: Option<u32>,
    pub max_gold_rate: Option<u32>,
}

impl MapPatch {
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "file" => self.file_name = Some(required_text(value, "map file name")?),
            "description" => self.description = Some(value.to_string()),
            "allow_recall" => self.allow_recall = Some(parse_bool(value, "allow_recall")?),
            "allow_teleport" => self.allow_teleport = Some(parse_bool(value, "allow_teleport")?),
            "can_mine" => self.can_mine = Some(parse_bool(value, "can_mine")?),
            "min_level" => self.min_level = Some(parse_number(value, "min_level")?),
            "max_level" => self.max_level = Some(parse_number(value, "max_level")?),
            "drop_rate" => self.drop_rate = Some(parse_number(value, "drop_rate")?),
            "max_drop_rate" => self.max_drop_rate = Some(parse_number(value, "max_drop_rate")?),
            "experience_rate" => {
                self.experience_rate = Some(parse_number(value, "experience_rate")?)
            }
            "max_experience_rate" => {
                self.max_experience_rate = Some(parse_number(value, "max_experience_rate")?)
            }
            "gold_rate" => self.gold_rate = Some(parse_number(value, "gold_rate")?),
            "max_gold_rate" => self.max_gold_rate = Some(parse_number(value, "max_gold_rate")?),
            _ => return Err(format!("unknown map field '{}'", key)),
        }
        Ok(())
    }

    pub fn apply(&self, record: &mut MapRecord) {
        if let Some(file_name) = &self.file_name {
            record.file_name = file_name.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(allow_recall) = self.allow_recall {
            record.allow_recall = allow_recall;
        }
        if let Some(allow_teleport) = self.allow_teleport {
            record.allow_teleport = allow_teleport;
        }
        if let Some(can_mine) = self.can_mine {
            record.can_mine = can_mine;
        }
        if let Some(min_level) = self.min_level {
            record.min_level = min_level;
        }
        if let Some(max_level) = self.max_level {
            record.max_level = max_level;
        }
        if let Some(drop_rate) = self.drop_rate {
            record.drop_rate = drop_rate;
        }
        if let Some(max_drop_rate) = self.max_drop_rate {
            record.max_drop_rate = max_drop_rate;
        }
        if let Some(experience_rate) = self.experience_rate {
            record.experience_rate = experience_rate;
        }
        if let Some(max_experience_rate) = self.max_experience_rate {
            record.max_experience_rate = max_experience_rate;
        }
        if let Some(gold_rate) = self.gold_rate {
            record.gold_rate = gold_rate;
        }
        if let Some(max_gold_rate) = self.max_gold_rate {
            record.max_gold_rate = max_gold_rate;
        }
    }
}

/// Field set for spell definition updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpellPatch {
    pub name: Option<String>,
    pub class: Option<CharacterClass>,
    pub school: Option<SpellSchool>,
    pub mode: Option<CastMode>,
    pub min_power: Option<u16>,
    pub max_power: Option<u16>,
    pub mana_cost: Option<u16>,
    pub cost_per_level: Option<u16>,
    pub need_levels: Option<[u16; SPELL_TIERS]>,
    pub tier_experience: Option<[u32; SPELL_TIERS]>,
    pub delay_ms: Option<u32>,
    pub description: Option<String>,
}

impl SpellPatch {
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => self.name = Some(required_text(value, "spell name")?),
            "class" => {
                self.class = Some(
                    CharacterClass::parse(value)
                        .ok_or_else(|| format!("unknown class '{}'", value))?,
                )
            }
            "school" => {
                self.school = Some(
                    SpellSchool::parse(value)
                        .ok_or_else(|| format!("unknown school '{}'", value))?,
                )
            }
            "mode" => {
                self.mode = Some(
                    CastMode::parse(value)
                        .ok_or_else(|| format!("unknown cast mode '{}'", value))?,
                )
            }
            "min_power" => self.min_power = Some(parse_number(value, "min_power")?),
            "max_power" => self.max_power = Some(parse_number(value, "max_power")?),
            "mana_cost" => self.mana_cost = Some(parse_number(value, "mana_cost")?),
            "cost_per_level" => self.cost_per_level = Some(parse_number(value, "cost_per_level")?),
            "need_levels" => self.need_levels = Some(parse_tiers(value, "need_levels")?),
            "tier_experience" => {
                self.tier_experience = Some(parse_tiers(value, "tier_experience")?)
            }
            "delay" => self.delay_ms = Some(parse_number(value, "delay")?),
            "description" => self.description = Some(value.to_string()),
            _ => return Err(format!("unknown spell field '{}'", key)),
        }
        Ok(())
    }

    pub fn apply(&self, record: &mut SpellRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(class) = self.class {
            record.class = class;
        }
        if let Some(school) = self.school {
            record.school = school;
        }
        if let Some(mode) = self.mode {
            record.mode = mode;
        }
        if let Some(min_power) = self.min_power {
            record.min_power = min_power;
        }
        if let Some(max_power) = self.max_power {
            record.max_power = max_power;
        }
        if let Some(mana_cost) = self.mana_cost {
            record.mana_cost = mana_cost;
        }
        if let Some(cost_per_level) = self.cost_per_level {
            record.cost_per_level = cost_per_level;
        }
        if let Some(need_levels) = self.need_levels {
            record.need_levels = need_levels;
        }
        if let Some(tier_experience) = self.tier_experience {
            record.tier_experience = tier_experience;
        }
        if let Some(delay_ms) = self.delay_ms {
            record.delay_ms = delay_ms;
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
    }
}

/// One line typed at the operator console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleInput {
    Command(AdminCommand),
    Save,
    Reload,
    Quit,
    Help,
    Empty,
}

/// Parses a console line into a command. Double quotes glue spaces into a
/// single argument, so names and messages with spaces work.
pub fn parse_console_command(line: &str) -> Result<ConsoleInput, String> {
    let tokens = tokenize(line)?;
    let Some(first) = tokens.first() else {
        return Ok(ConsoleInput::Empty);
    };
    let command = first.to_ascii_lowercase();
    let args = &tokens[1..];

    let parsed = match command.as_str() {
        "accounts" => AdminCommand::SearchAccounts {
            keyword: optional_keyword(args, 0),
            page: optional_page(args, 1)?,
        },
        "ban" => AdminCommand::BanAccount {
            email: arg(args, 0, "account email")?.to_string(),
        },
        "unban" => AdminCommand::UnbanAccount {
            email: arg(args, 0, "account email")?.to_string(),
        },
        "gold" => {
            let email = arg(args, 0, "account email")?.to_string();
            let kind = arg(args, 1, "currency kind")?;
            let currency = CurrencyKind::parse(kind)
                .ok_or_else(|| format!("unknown currency '{}'", kind))?;
            let delta = parse_number(arg(args, 2, "gold delta")?, "gold delta")?;
            AdminCommand::AdjustCurrency {
                email,
                currency,
                delta,
            }
        }
        "role" => AdminCommand::SetAccountRole {
            email: arg(args, 0, "account email")?.to_string(),
            role: parse_number(arg(args, 1, "role value")?, "role value")?,
        },
        "players" => AdminCommand::ListPlayers {
            keyword: optional_keyword(args, 0),
        },
        "teleport" | "tp" => AdminCommand::TeleportPlayer {
            name: arg(args, 0, "player name")?.to_string(),
            map: parse_number(arg(args, 1, "map index")?, "map index")?,
            x: parse_number(arg(args, 2, "x coordinate")?, "x coordinate")?,
            y: parse_number(arg(args, 3, "y coordinate")?, "y coordinate")?,
        },
        "summon" => AdminCommand::SummonPlayer {
            target: arg(args, 0, "target player")?.to_string(),
            anchor: arg(args, 1, "anchor player")?.to_string(),
        },
        "kick" => AdminCommand::KickPlayer {
            name: arg(args, 0, "player name")?.to_string(),
        },
        "levelup" => AdminCommand::LevelUp {
            name: arg(args, 0, "player name")?.to_string(),
            levels: parse_number(arg(args, 1, "level count")?, "level count")?,
        },
        "broadcast" => {
            if args.is_empty() {
                return Err("broadcast needs a message".to_string());
            }
            AdminCommand::Broadcast {
                message: args.join(" "),
            }
        }
        "items" => {
            let keyword = optional_keyword(args, 0);
            let mut category = None;
            let mut page = 1;
            for extra in args.iter().skip(1) {
                if let Ok(value) = extra.parse::<i64>() {
                    page = value;
                } else if let Some(parsed) = ItemCategory::parse(extra) {
                    category = Some(parsed);
                } else {
                    return Err(format!("unknown item filter '{}'", extra));
                }
            }
            AdminCommand::SearchItems {
                keyword,
                category,
                page,
            }
        }
        "item" => AdminCommand::ItemDetail {
            item: parse_number(arg(args, 0, "item index")?, "item index")?,
        },
        "give" => AdminCommand::GiveItem {
            name: arg(args, 0, "player name")?.to_string(),
            item: parse_number(arg(args, 1, "item index")?, "item index")?,
            count: optional_number(args, 2, 1, "item count")?,
        },
        "createitem" => AdminCommand::CreateItem {
            name: arg(args, 0, "item name")?.to_string(),
            patch: parse_patch_args(&args[1..], ItemPatch::set)?,
        },
        "updateitem" => AdminCommand::UpdateItem {
            item: parse_number(arg(args, 0, "item index")?, "item index")?,
            patch: parse_patch_args(&args[1..], ItemPatch::set)?,
        },
        "monsters" => AdminCommand::SearchMonsters {
            keyword: optional_keyword(args, 0),
            page: optional_page(args, 1)?,
        },
        "monster" => AdminCommand::MonsterDetail {
            monster: parse_number(arg(args, 0, "monster index")?, "monster index")?,
        },
        "spawn" => AdminCommand::SpawnMonsters {
            anchor: arg(args, 0, "anchor player")?.to_string(),
            monster: parse_number(arg(args, 1, "monster index")?, "monster index")?,
            count: optional_number(args, 2, 1, "spawn count")?,
            radius: optional_number(args, 3, 5, "spawn radius")?,
        },
        "clearmap" => AdminCommand::ClearMapMonsters {
            anchor: arg(args, 0, "anchor player")?.to_string(),
        },
        "createmonster" => AdminCommand::CreateMonster {
            name: arg(args, 0, "monster name")?.to_string(),
            patch: parse_patch_args(&args[1..], MonsterPatch::set)?,
        },
        "updatemonster" => AdminCommand::UpdateMonster {
            monster: parse_number(arg(args, 0, "monster index")?, "monster index")?,
            patch: parse_patch_args(&args[1..], MonsterPatch::set)?,
        },
        "maps" => AdminCommand::ListMaps,
        "map" => AdminCommand::MapDetail {
            map: parse_number(arg(args, 0, "map index")?, "map index")?,
        },
        "createmap" => AdminCommand::CreateMap {
            file_name: arg(args, 0, "map file name")?.to_string(),
            patch: parse_patch_args(&args[1..], MapPatch::set)?,
        },
        "updatemap" => AdminCommand::UpdateMap {
            map: parse_number(arg(args, 0, "map index")?, "map index")?,
            patch: parse_patch_args(&args[1..], MapPatch::set)?,
        },
        "spells" => {
            let keyword = optional_keyword(args, 0);
            let mut class = None;
            let mut school = None;
            let mut page = 1;
            for extra in args.iter().skip(1) {
                if let Ok(value) = extra.parse::<i64>() {
                    page = value;
                } else if let Some(parsed) = CharacterClass::parse(extra) {
                    class = Some(parsed);
                } else if let Some(parsed) = SpellSchool::parse(extra) {
                    school = Some(parsed);
                } else {
                    return Err(format!("unknown spell filter '{}'", extra));
                }
            }
            AdminCommand::SearchSpells {
                keyword,
                class,
                school,
                page,
            }
        }
        "grantspell" => AdminCommand::GrantSpell {
            name: arg(args, 0, "player name")?.to_string(),
            spell: parse_number(arg(args, 1, "spell index")?, "spell index")?,
            level: optional_number(args, 2, 1, "spell level")?,
        },
        "grantclassspells" => AdminCommand::GrantClassSpells {
            name: arg(args, 0, "player name")?.to_string(),
            level: optional_number(args, 1, 1, "spell level")?,
        },
        "revokespell" => AdminCommand::RevokeSpell {
            name: arg(args, 0, "player name")?.to_string(),
            spell: parse_number(arg(args, 1, "spell index")?, "spell index")?,
        },
        "updatespell" => AdminCommand::UpdateSpell {
            spell: parse_number(arg(args, 0, "spell index")?, "spell index")?,
            patch: parse_patch_args(&args[1..], SpellPatch::set)?,
        },
        "save" => return Ok(ConsoleInput::Save),
        "reload" => return Ok(ConsoleInput::Reload),
        "quit" | "exit" => return Ok(ConsoleInput::Quit),
        "help" => return Ok(ConsoleInput::Help),
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(ConsoleInput::Command(parsed))
}

fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(ch);
    }
    if in_quotes {
        return Err("unclosed quote in command".to_string());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn arg<'a>(args: &'a [String], pos: usize, what: &str) -> Result<&'a str, String> {
    args.get(pos)
        .map(|value| value.as_str())
        .ok_or_else(|| format!("{} is required", what))
}

fn optional_keyword(args: &[String], pos: usize) -> String {
    args.get(pos).cloned().unwrap_or_default()
}

fn optional_page(args: &[String], pos: usize) -> Result<i64, String> {
    match args.get(pos) {
        Some(value) => parse_number(value, "page"),
        None => Ok(1),
    }
}

fn optional_number<N: std::str::FromStr>(
    args: &[String],
    pos: usize,
    default: N,
    what: &str,
) -> Result<N, String> {
    match args.get(pos) {
        Some(value) => parse_number(value, what),
        None => Ok(default),
    }
}

fn parse_number<N: std::str::FromStr>(value: &str, what: &str) -> Result<N, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", what, value))
}

fn parse_bool(value: &str, what: &str) -> Result<bool, String> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(format!("invalid {} '{}', expected 0 or 1", what, other)),
    }
}

fn required_text(value: &str, what: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} is empty", what));
    }
    Ok(trimmed.to_string())
}

fn parse_tiers<N: std::str::FromStr + Copy + Default>(
    value: &str,
    what: &str,
) -> Result<[N; SPELL_TIERS], String> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != SPELL_TIERS {
        return Err(format!("{} takes {} values", what, SPELL_TIERS));
    }
    let mut out = [N::default(); SPELL_TIERS];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("invalid {} value '{}'", what, part))?;
    }
    Ok(out)
}

fn parse_patch_args<P: Default>(
    args: &[String],
    set: fn(&mut P, &str, &str) -> Result<(), String>,
) -> Result<P, String> {
    let mut patch = P::default();
    for pair in args {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("expected key=value, got '{}'", pair));
        };
        set(&mut patch, key.trim(), value.trim())?;
    }
    Ok(patch)
}
