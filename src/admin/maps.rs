use crate::admin::commands::{CommandOutcome, MapPatch, OutcomeData};
use crate::admin::query::QueryError;
use crate::telemetry::logging;
use crate::world::map::MapRecord;
use crate::world::state::WorldState;
use std::sync::Mutex;

/// Map row: the definition joined with live occupancy. A definition whose
/// grid never loaded shows as offline with zero counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapView {
    pub record: MapRecord,
    pub live: bool,
    pub players: usize,
    pub monsters: usize,
}

/// Every map definition, busiest first. Ties sort by description, then
/// index. Never paginated; realms carry dozens of maps, not thousands.
pub fn list_maps(world: &Mutex<WorldState>) -> Result<Vec<MapView>, QueryError> {
    let world = world.lock().map_err(|_| QueryError::WorldUnavailable)?;
    let mut views: Vec<MapView> = world
        .records
        .maps
        .iter()
        .map(|record| {
            let live = world.live_map(record.index);
            MapView {
                record: record.clone(),
                live: live.is_some(),
                players: live.map(|map| map.player_count()).unwrap_or(0),
                monsters: world.live_monster_count(record.index),
            }
        })
        .collect();
    drop(world);

    views.sort_by(|a, b| {
        b.players
            .cmp(&a.players)
            .then_with(|| {
                a.record
                    .description
                    .to_lowercase()
                    .cmp(&b.record.description.to_lowercase())
            })
            .then(a.record.index.cmp(&b.record.index))
    });
    Ok(views)
}

pub fn map_detail(world: &WorldState, map: u32) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.maps.get(map) else {
        return Err(format!("no map with index {}", map));
    };
    let status = if world.live_map(map).is_some() {
        "live"
    } else {
        "offline"
    };
    Ok(CommandOutcome::with_data(
        format!("map {} '{}' ({})", record.index, record.description, status),
        OutcomeData::Map(record.clone()),
    ))
}

/// Creates a map definition. The grid file is not opened here; the map goes
/// live on the next reload if the file parses then.
pub fn create_map(
    world: &mut WorldState,
    file_name: &str,
    patch: &MapPatch,
) -> Result<CommandOutcome, String> {
    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err("map file name is empty".to_string());
    }
    let mut description = String::new();
    let index = world.records.maps.create(|index| {
        let mut record = MapRecord::new(index, file_name);
        patch.apply(&mut record);
        description = record.description.clone();
        record
    });
    logging::log_admin(&format!(
        "map {} '{}' created from {}",
        index, description, file_name
    ));
    Ok(CommandOutcome::success(format!(
        "map {} '{}' created; the grid goes live on the next reload",
        index, description
    )))
}

/// Updates definition fields only. A running grid keeps serving its loaded
/// terrain; a changed file name takes effect on the next reload.
pub fn update_map(
    world: &mut WorldState,
    map: u32,
    patch: &MapPatch,
) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.maps.get_mut(map) else {
        return Err(format!("no map with index {}", map));
    };
    patch.apply(record);
    let description = record.description.clone();
    logging::log_admin(&format!("map {} '{}' updated", map, description));
    Ok(CommandOutcome::success(format!(
        "map {} '{}' updated",
        map, description
    )))
}
