use crate::admin::commands::{CommandOutcome, SpellPatch};
use crate::admin::query::{keyword_matches, paginate, Page, QueryError, SPELL_PAGE_SIZE};
use crate::entities::character::CharacterClass;
use crate::entities::spell::{SpellRecord, SpellSchool};
use crate::telemetry::logging;
use crate::world::state::{SpellGrant, WorldState};
use std::sync::Mutex;

/// Grimoire search. Class and school filters are exact; rows sort by class,
/// school, first tier level, then index.
pub fn search_spells(
    world: &Mutex<WorldState>,
    keyword: &str,
    class: Option<CharacterClass>,
    school: Option<SpellSchool>,
    page: i64,
) -> Result<Page<SpellRecord>, QueryError> {
    let world = world.lock().map_err(|_| QueryError::WorldUnavailable)?;
    let mut records: Vec<SpellRecord> = world
        .records
        .spells
        .iter()
        .filter(|record| class.map_or(true, |class| record.class == class))
        .filter(|record| school.map_or(true, |school| record.school == school))
        .filter(|record| keyword_matches(keyword, record.index, &[record.name.as_str()]))
        .cloned()
        .collect();
    drop(world);

    records.sort_by(|a, b| {
        a.class
            .cmp(&b.class)
            .then(a.school.cmp(&b.school))
            .then(a.need_levels[0].cmp(&b.need_levels[0]))
            .then(a.index.cmp(&b.index))
    });
    Ok(paginate(records, page, SPELL_PAGE_SIZE))
}

/// Teaches one spell, or re-levels it if already known. The requested level
/// clamps to the configured ceiling; experience resets either way.
pub fn grant_spell(
    world: &mut WorldState,
    name: &str,
    spell: u32,
    level: u8,
    max_spell_level: u8,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    let id = player.id;
    let player_name = player.name.clone();
    let Some(record) = world.records.spells.get(spell) else {
        return Err(format!("no spell with index {}", spell));
    };
    let spell_name = record.name.clone();

    let level = level.min(max_spell_level);
    match world.grant_spell(id, spell, level)? {
        SpellGrant::Learned => {
            logging::log_admin(&format!(
                "player {} learned {} at level {}",
                player_name, spell_name, level
            ));
            Ok(CommandOutcome::success(format!(
                "{} learned {} at level {}",
                player_name, spell_name, level
            )))
        }
        SpellGrant::Leveled => {
            logging::log_admin(&format!(
                "player {} spell {} set to level {}",
                player_name, spell_name, level
            ));
            Ok(CommandOutcome::success(format!(
                "{} already knew {}; level set to {}",
                player_name, spell_name, level
            )))
        }
    }
}

/// Grants every spell of the player's class at one clamped level. Reports
/// how many were newly added and how many were re-leveled.
pub fn grant_class_spells(
    world: &mut WorldState,
    name: &str,
    level: u8,
    max_spell_level: u8,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    let id = player.id;
    let player_name = player.name.clone();
    let class = player.class;

    let level = level.min(max_spell_level);
    let matching: Vec<u32> = world
        .records
        .spells
        .iter()
        .filter(|record| record.class == class)
        .map(|record| record.index)
        .collect();

    let mut added = 0;
    let mut updated = 0;
    for spell in matching {
        match world.grant_spell(id, spell, level)? {
            SpellGrant::Learned => added += 1,
            SpellGrant::Leveled => updated += 1,
        }
    }

    logging::log_admin(&format!(
        "player {} granted all {} spells at level {}: {} added, {} updated",
        player_name,
        class.name(),
        level,
        added,
        updated
    ));
    Ok(CommandOutcome::success(format!(
        "{}: {} spells added, {} updated at level {}",
        player_name, added, updated, level
    )))
}

pub fn revoke_spell(
    world: &mut WorldState,
    name: &str,
    spell: u32,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    let id = player.id;
    let player_name = player.name.clone();
    let spell_name = world
        .records
        .spells
        .get(spell)
        .map(|record| record.name.clone())
        .unwrap_or_else(|| format!("spell {}", spell));

    world.revoke_spell(id, spell)?;
    logging::log_admin(&format!("player {} forgot {}", player_name, spell_name));
    Ok(CommandOutcome::success(format!(
        "{} removed from {}; the change shows after they reconnect",
        spell_name, player_name
    )))
}

pub fn update_spell(
    world: &mut WorldState,
    spell: u32,
    patch: &SpellPatch,
) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.spells.get_mut(spell) else {
        return Err(format!("no spell with index {}", spell));
    };
    patch.apply(record);
    let name = record.name.clone();
    logging::log_admin(&format!("spell {} '{}' updated", spell, name));
    Ok(CommandOutcome::success(format!(
        "spell {} '{}' updated",
        spell, name
    )))
}
