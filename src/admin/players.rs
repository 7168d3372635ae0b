use crate::admin::commands::CommandOutcome;
use crate::admin::query::{keyword_matches, QueryError};
use crate::entities::character::CharacterClass;
use crate::telemetry::logging;
use crate::world::position::Point;
use crate::world::spawn;
use crate::world::state::WorldState;
use std::sync::Mutex;

/// One online player, joined with the level from the character record and
/// the email of the owning account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub name: String,
    pub class: CharacterClass,
    pub level: u16,
    pub map: u32,
    pub position: Point,
    pub account: String,
}

/// The online set, keyword-filtered and sorted by name. Never paginated;
/// the connected population is small.
pub fn list_players(
    world: &Mutex<WorldState>,
    keyword: &str,
) -> Result<Vec<PlayerView>, QueryError> {
    let world = world.lock().map_err(|_| QueryError::WorldUnavailable)?;
    let mut views = Vec::new();
    for player in world.players() {
        let record = world.records.characters.get(player.character);
        let level = record.map(|record| record.level).unwrap_or(1);
        let account = record
            .and_then(|record| world.records.accounts.get(record.account))
            .map(|account| account.email.clone())
            .unwrap_or_default();
        let view = PlayerView {
            name: player.name.clone(),
            class: player.class,
            level,
            map: player.map,
            position: player.position,
            account,
        };
        let fields = [view.name.as_str(), view.account.as_str(), view.class.name()];
        if keyword_matches(keyword, player.character, &fields) {
            views.push(view);
        }
    }
    drop(world);

    views.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(views)
}

/// Moves a player to explicit coordinates on a loaded map. Coordinates on
/// the map border or outside it divert to a random open cell; in-bounds
/// coordinates are honored as given, blocked or not.
pub fn teleport_player(
    world: &mut WorldState,
    name: &str,
    map: u32,
    x: i32,
    y: i32,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    let id = player.id;
    let player_name = player.name.clone();
    let Some(grid) = world.grid_for_map(map) else {
        return Err(format!("map {} is not loaded", map));
    };

    let out_of_bounds =
        x <= 0 || y <= 0 || x >= i32::from(grid.width()) || y >= i32::from(grid.height());
    let destination = if out_of_bounds {
        let Some(cell) = spawn::random_open_cell(&grid, world.rng_mut()) else {
            return Err(format!("map {} has no open cell", map));
        };
        cell
    } else {
        Point::new(x as u16, y as u16)
    };

    world.teleport_player(id, map, destination)?;
    logging::log_admin(&format!(
        "player {} teleported to map {} {}",
        player_name, map, destination
    ));
    Ok(CommandOutcome::success(format!(
        "{} teleported to map {} at {}",
        player_name, map, destination
    )))
}

/// Brings the target to the anchor player's cell.
pub fn summon_player(
    world: &mut WorldState,
    target: &str,
    anchor: &str,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(target) else {
        return Err(format!("{} is not online", target));
    };
    let target_id = player.id;
    let target_name = player.name.clone();
    let Some(player) = world.player_by_name(anchor) else {
        return Err(format!("{} is not online", anchor));
    };
    let anchor_name = player.name.clone();
    let map = player.map;
    let position = player.position;

    world.teleport_player(target_id, map, position)?;
    logging::log_admin(&format!(
        "player {} summoned to {} on map {} {}",
        target_name, anchor_name, map, position
    ));
    Ok(CommandOutcome::success(format!(
        "{} summoned to {}",
        target_name, anchor_name
    )))
}

pub fn kick_player(world: &mut WorldState, name: &str) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    let id = player.id;
    let player_name = player.name.clone();

    world.kick_player(id, "kicked by an administrator")?;
    logging::log_admin(&format!("player {} kicked", player_name));
    Ok(CommandOutcome::success(format!("{} kicked", player_name)))
}

/// Raises the character level by a positive count. A result above the cap
/// rejects the whole command; nothing is applied partially.
pub fn level_up(
    world: &mut WorldState,
    name: &str,
    levels: u16,
    max_level: u16,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    if levels == 0 {
        return Err("level count must be positive".to_string());
    }
    let id = player.id;
    let player_name = player.name.clone();
    let character = player.character;
    let Some(record) = world.records.characters.get(character) else {
        return Err("character record is missing".to_string());
    };

    let target = record.level.saturating_add(levels);
    if target > max_level {
        return Err(format!("level {} exceeds the maximum of {}", target, max_level));
    }

    world.apply_level(id, target)?;
    logging::log_admin(&format!("player {} leveled to {}", player_name, target));
    Ok(CommandOutcome::success(format!(
        "{} is now level {}",
        player_name, target
    )))
}

/// Queues an announcement for everyone online. Zero recipients is still a
/// success; the realm may simply be empty.
pub fn broadcast(world: &mut WorldState, message: &str) -> Result<CommandOutcome, String> {
    let delivered = world.broadcast(message);
    logging::log_admin(&format!(
        "broadcast sent to {} players: {}",
        delivered, message
    ));
    Ok(CommandOutcome::success(format!(
        "broadcast delivered to {} players",
        delivered
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::AccountRecord;
    use crate::entities::character::CharacterRecord;
    use crate::persistence::store::RecordDb;
    use crate::world::grid::CollisionGrid;
    use crate::world::map::{LiveMap, MapRecord};
    use crate::world::state::PlayerNotice;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn test_world() -> WorldState {
        let mut db = RecordDb::default();
        let account = db
            .accounts
            .create(|index| AccountRecord::new(index, "keeper@eldermoor.io"));
        db.characters.create(|index| {
            let mut record = CharacterRecord::new(index, account, "Aldric", CharacterClass::Mage);
            record.level = 10;
            record.map = 1;
            record.position = Point::new(5, 5);
            record
        });
        db.characters.create(|index| {
            let mut record =
                CharacterRecord::new(index, account, "Berrin", CharacterClass::Warrior);
            record.level = 7;
            record.map = 2;
            record.position = Point::new(2, 2);
            record
        });
        db.maps.create(|index| MapRecord::new(index, "meadow.map"));
        db.maps.create(|index| MapRecord::new(index, "crypt.map"));

        let mut grid = CollisionGrid::open(20, 15);
        grid.set_blocked(Point::new(10, 10), true);
        let mut live_maps = HashMap::new();
        live_maps.insert(1, LiveMap::new(1, Arc::new(grid)));
        live_maps.insert(2, LiveMap::new(2, Arc::new(CollisionGrid::open(10, 10))));
        WorldState::from_parts(db, live_maps)
    }

    #[test]
    fn list_sorts_by_name_and_joins_the_account() {
        let mut world = test_world();
        world.connect_player(2).expect("connect");
        world.connect_player(1).expect("connect");
        let world = Mutex::new(world);

        let views = list_players(&world, "").expect("list");
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "Aldric");
        assert_eq!(views[0].level, 10);
        assert_eq!(views[0].account, "keeper@eldermoor.io");
        assert_eq!(views[1].name, "Berrin");
        assert_eq!(views[1].map, 2);
    }

    #[test]
    fn list_keyword_reaches_name_and_class() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");
        world.connect_player(2).expect("connect");
        let world = Mutex::new(world);

        let by_class = list_players(&world, "warrior").expect("list");
        assert_eq!(by_class.len(), 1);
        assert_eq!(by_class[0].name, "Berrin");

        let by_name = list_players(&world, "ALD").expect("list");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Aldric");
    }

    #[test]
    fn explicit_coordinates_are_honored_even_onto_blocked_cells() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        let outcome = teleport_player(&mut world, "aldric", 1, 10, 10).expect("teleport");
        assert!(outcome.ok);
        assert_eq!(world.player(id).unwrap().position, Point::new(10, 10));
    }

    #[test]
    fn border_and_out_of_bounds_coordinates_divert_to_an_open_cell() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");
        let grid = world.grid_for_map(1).expect("grid");

        for (x, y) in [(0, 5), (5, 0), (20, 5), (5, 15), (-3, 4), (200, 200)] {
            teleport_player(&mut world, "Aldric", 1, x, y).expect("teleport");
            let landed = world.player(id).unwrap().position;
            assert!(landed.x < 20 && landed.y < 15);
            assert!(!grid.blocked(landed));
        }
    }

    #[test]
    fn the_last_interior_cell_counts_as_in_bounds() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        teleport_player(&mut world, "Aldric", 1, 19, 14).expect("teleport");
        assert_eq!(world.player(id).unwrap().position, Point::new(19, 14));
    }

    #[test]
    fn teleport_rejects_unloaded_maps_and_offline_players() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");

        let err = teleport_player(&mut world, "Aldric", 9, 5, 5).unwrap_err();
        assert!(err.contains("map 9 is not loaded"));

        let err = teleport_player(&mut world, "Ghost", 1, 5, 5).unwrap_err();
        assert!(err.contains("Ghost is not online"));
    }

    #[test]
    fn summon_brings_the_target_to_the_anchor() {
        let mut world = test_world();
        let aldric = world.connect_player(1).expect("connect");
        world.connect_player(2).expect("connect");

        let outcome = summon_player(&mut world, "aldric", "berrin").expect("summon");
        assert_eq!(outcome.message, "Aldric summoned to Berrin");

        let moved = world.player(aldric).unwrap();
        assert_eq!(moved.map, 2);
        assert_eq!(moved.position, Point::new(2, 2));
    }

    #[test]
    fn kick_detaches_the_player() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");

        let outcome = kick_player(&mut world, "ALDRIC").expect("kick");
        assert_eq!(outcome.message, "Aldric kicked");
        assert!(world.player_by_name("Aldric").is_none());
        assert!(world
            .take_notices()
            .iter()
            .any(|notification| matches!(&notification.notice, PlayerNotice::Disconnect { .. })));
    }

    #[test]
    fn level_up_applies_within_the_cap() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");

        let outcome = level_up(&mut world, "Aldric", 3, 60).expect("level up");
        assert_eq!(outcome.message, "Aldric is now level 13");
        assert_eq!(world.records.characters.get(1).unwrap().level, 13);
    }

    #[test]
    fn level_up_rejects_results_over_the_cap() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");

        let err = level_up(&mut world, "Aldric", 5, 13).unwrap_err();
        assert_eq!(err, "level 15 exceeds the maximum of 13");
        assert_eq!(world.records.characters.get(1).unwrap().level, 10);
    }

    #[test]
    fn level_up_rejects_a_zero_count() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");

        let err = level_up(&mut world, "Aldric", 0, 60).unwrap_err();
        assert!(err.contains("must be positive"));
    }

    #[test]
    fn broadcast_counts_recipients() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");
        world.connect_player(2).expect("connect");

        let outcome = broadcast(&mut world, "the realm sleeps in one minute").expect("broadcast");
        assert_eq!(outcome.message, "broadcast delivered to 2 players");
        assert_eq!(world.take_notices().len(), 2);

        let mut empty = test_world();
        let outcome = broadcast(&mut empty, "anyone there?").expect("broadcast");
        assert_eq!(outcome.message, "broadcast delivered to 0 players");
    }
}
