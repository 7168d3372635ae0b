use crate::admin::commands::{CommandOutcome, MonsterPatch, OutcomeData};
use crate::admin::query::{keyword_matches, paginate, Page, QueryError, MONSTER_PAGE_SIZE};
use crate::entities::monster::MonsterRecord;
use crate::telemetry::logging;
use crate::world::spawn::{self, clamp_spawn_count, clamp_spawn_radius};
use crate::world::state::WorldState;
use std::sync::Mutex;

/// Bestiary search, sorted by level then index.
pub fn search_monsters(
    world: &Mutex<WorldState>,
    keyword: &str,
    page: i64,
) -> Result<Page<MonsterRecord>, QueryError> {
    let world = world.lock().map_err(|_| QueryError::WorldUnavailable)?;
    let mut records: Vec<MonsterRecord> = world
        .records
        .monsters
        .iter()
        .filter(|record| keyword_matches(keyword, record.index, &[record.name.as_str()]))
        .cloned()
        .collect();
    drop(world);

    records.sort_by(|a, b| a.level.cmp(&b.level).then(a.index.cmp(&b.index)));
    Ok(paginate(records, page, MONSTER_PAGE_SIZE))
}

pub fn monster_detail(world: &WorldState, monster: u32) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.monsters.get(monster) else {
        return Err(format!("no monster with index {}", monster));
    };
    Ok(CommandOutcome::with_data(
        format!("monster {} '{}'", record.index, record.name),
        OutcomeData::Monster(record.clone()),
    ))
}

/// Scatters instances around the anchor player. Each unit gets its own
/// placement attempts; a unit whose attempts all land on blocked or occupied
/// cells is skipped, and the outcome reports placed-of-requested.
pub fn spawn_monsters(
    world: &mut WorldState,
    anchor: &str,
    monster: u32,
    count: u32,
    radius: i32,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(anchor) else {
        return Err(format!("{} is not online", anchor));
    };
    let map = player.map;
    let anchor_cell = player.position;
    let Some(record) = world.records.monsters.get(monster) else {
        return Err(format!("no monster with index {}", monster));
    };
    let monster_name = record.name.clone();
    let Some(grid) = world.grid_for_map(map) else {
        return Err(format!("map {} is not loaded", map));
    };

    let requested = clamp_spawn_count(count);
    let radius = clamp_spawn_radius(radius.clamp(0, i32::from(spawn::MAX_SPAWN_RADIUS)) as u16);
    let mut placed = 0;
    for _ in 0..requested {
        let Some(cell) = spawn::find_spawn_cell(&grid, anchor_cell, radius, world.rng_mut()) else {
            continue;
        };
        if world.spawn_monster(monster, map, cell).is_ok() {
            placed += 1;
        }
    }

    logging::log_admin(&format!(
        "spawned {} of {} {} on map {}",
        placed, requested, monster_name, map
    ));
    Ok(CommandOutcome::success(format!(
        "placed {} of {} {}",
        placed, requested, monster_name
    )))
}

/// Marks every living monster on the anchor player's map dead. Zero kills is
/// a normal outcome on a quiet map.
pub fn clear_map_monsters(world: &mut WorldState, anchor: &str) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(anchor) else {
        return Err(format!("{} is not online", anchor));
    };
    let map = player.map;

    let killed = world.kill_map_monsters(map);
    logging::log_admin(&format!("cleared {} monsters on map {}", killed, map));
    Ok(CommandOutcome::success(format!(
        "killed {} monsters on map {}",
        killed, map
    )))
}

pub fn create_monster(
    world: &mut WorldState,
    name: &str,
    patch: &MonsterPatch,
) -> Result<CommandOutcome, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("monster name is empty".to_string());
    }
    let mut final_name = String::new();
    let index = world.records.monsters.create(|index| {
        let mut record = MonsterRecord::new(index, name);
        patch.apply(&mut record);
        final_name = record.name.clone();
        record
    });
    logging::log_admin(&format!("monster {} '{}' created", index, final_name));
    Ok(CommandOutcome::success(format!(
        "monster {} '{}' created",
        index, final_name
    )))
}

pub fn update_monster(
    world: &mut WorldState,
    monster: u32,
    patch: &MonsterPatch,
) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.monsters.get_mut(monster) else {
        return Err(format!("no monster with index {}", monster));
    };
    patch.apply(record);
    let name = record.name.clone();
    logging::log_admin(&format!("monster {} '{}' updated", monster, name));
    Ok(CommandOutcome::success(format!(
        "monster {} '{}' updated",
        monster, name
    )))
}
