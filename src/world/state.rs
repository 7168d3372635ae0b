use crate::entities::item::ItemRecord;
use crate::entities::monster::{MonsterId, MonsterInstance};
use crate::entities::player::{PlayerId, PlayerState};
use crate::entities::spell::LearnedSpell;
use crate::persistence::store::RecordDb;
use crate::telemetry::logging;
use crate::world::grid::CollisionGrid;
use crate::world::grid_cache::GridCache;
use crate::world::map::LiveMap;
use crate::world::position::Point;
use crate::world::spawn::SpawnRng;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-player event queued on the world and drained by the session layer.
/// Delivery is best effort; nothing in here is a correctness dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerNotice {
    SpellLearned { spell: u32, level: u8 },
    SpellLeveled { spell: u32, level: u8 },
    LevelChanged { level: u16 },
    ItemGranted { item: u32, count: u32 },
    Chat { kind: ChatKind, message: String },
    Disconnect { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    System,
    Announcement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub player: PlayerId,
    pub notice: PlayerNotice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpellGrant {
    Learned,
    Leveled,
}

/// The whole live world: record collections, running maps, connected
/// players, monster instances. One instance behind one mutex; commands and
/// the simulation loop take turns on it.
pub struct WorldState {
    pub records: RecordDb,
    live_maps: HashMap<u32, LiveMap>,
    players: HashMap<PlayerId, PlayerState>,
    monsters: HashMap<MonsterId, MonsterInstance>,
    notices: Vec<Notification>,
    next_player_id: u32,
    rng: SpawnRng,
}

impl WorldState {
    /// Instantiates a live map for every map record whose grid file parses.
    /// Failures are logged and the record stays definition-only.
    pub fn load(records: RecordDb, grids: &mut GridCache) -> WorldState {
        let mut live_maps = HashMap::new();
        for record in records.maps.iter() {
            match grids.get_grid(&record.file_name) {
                Ok(grid) => {
                    live_maps.insert(record.index, LiveMap::new(record.index, grid));
                }
                Err(err) => {
                    logging::log_error(&format!(
                        "map {} '{}' stays offline: {}",
                        record.index, record.description, err
                    ));
                }
            }
        }
        WorldState::from_parts(records, live_maps)
    }

    pub fn from_parts(records: RecordDb, live_maps: HashMap<u32, LiveMap>) -> WorldState {
        WorldState {
            records,
            live_maps,
            players: HashMap::new(),
            monsters: HashMap::new(),
            notices: Vec::new(),
            next_player_id: 1,
            rng: SpawnRng::default(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&PlayerState> {
        let name = name.trim();
        self.players
            .values()
            .find(|player| player.name.eq_ignore_ascii_case(name))
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    pub fn connected_count(&self) -> usize {
        self.players.len()
    }

    pub fn live_map(&self, index: u32) -> Option<&LiveMap> {
        self.live_maps.get(&index)
    }

    pub fn grid_for_map(&self, index: u32) -> Option<Arc<CollisionGrid>> {
        self.live_maps.get(&index).map(|map| Arc::clone(&map.grid))
    }

    pub fn monster(&self, id: MonsterId) -> Option<&MonsterInstance> {
        self.monsters.get(&id)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &MonsterInstance> {
        self.monsters.values()
    }

    pub fn live_monster_count(&self, map: u32) -> usize {
        self.monsters
            .values()
            .filter(|instance| instance.map == map && !instance.dead)
            .count()
    }

    pub fn rng_mut(&mut self) -> &mut SpawnRng {
        &mut self.rng
    }

    pub fn take_notices(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notices)
    }

    /// Brings a character online. The derived spell lookup is rebuilt from
    /// the character's owned learned-spell list here.
    pub fn connect_player(&mut self, character: u32) -> Result<PlayerId, String> {
        let Some(record) = self.records.characters.get(character) else {
            return Err(format!("character {} does not exist", character));
        };
        if self
            .players
            .values()
            .any(|player| player.character == character)
        {
            return Err(format!("{} is already online", record.name));
        }
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        let mut state = PlayerState::new(
            id,
            character,
            &record.name,
            record.class,
            record.map,
            record.position,
        );
        for learned_index in &record.spells {
            if let Some(learned) = self.records.learned.get(*learned_index) {
                state.spells_by_def.insert(learned.spell, learned.index);
            }
        }
        let map = record.map;
        self.players.insert(id, state);
        if let Some(live) = self.live_maps.get_mut(&map) {
            live.players.insert(id);
        }
        Ok(id)
    }

    /// Takes the player offline, writing map and position back to the
    /// character record.
    pub fn disconnect_player(&mut self, id: PlayerId) -> Result<(), String> {
        let Some(state) = self.players.remove(&id) else {
            return Err("player is not online".to_string());
        };
        if let Some(live) = self.live_maps.get_mut(&state.map) {
            live.players.remove(&id);
        }
        if let Some(record) = self.records.characters.get_mut(state.character) {
            record.map = state.map;
            record.position = state.position;
        }
        Ok(())
    }

    pub fn kick_player(&mut self, id: PlayerId, reason: &str) -> Result<(), String> {
        if !self.players.contains_key(&id) {
            return Err("player is not online".to_string());
        }
        self.push_notice(
            id,
            PlayerNotice::Disconnect {
                reason: reason.to_string(),
            },
        );
        self.disconnect_player(id)
    }

    /// Moves a player onto a live map. Callers decide the cell; explicit
    /// coordinates are honored even onto blocked terrain.
    pub fn teleport_player(&mut self, id: PlayerId, map: u32, position: Point) -> Result<(), String> {
        if !self.live_maps.contains_key(&map) {
            return Err(format!("map {} is not loaded", map));
        }
        let Some(player) = self.players.get_mut(&id) else {
            return Err("player is not online".to_string());
        };
        let old_map = player.map;
        player.map = map;
        player.position = position;
        if old_map != map {
            if let Some(live) = self.live_maps.get_mut(&old_map) {
                live.players.remove(&id);
            }
        }
        if let Some(live) = self.live_maps.get_mut(&map) {
            live.players.insert(id);
        }
        Ok(())
    }

    /// Sets the character's level and queues the recalculation notice for
    /// the session. Range validation happens before the call.
    pub fn apply_level(&mut self, id: PlayerId, level: u16) -> Result<(), String> {
        let Some(player) = self.players.get(&id) else {
            return Err("player is not online".to_string());
        };
        let character = player.character;
        let Some(record) = self.records.characters.get_mut(character) else {
            return Err("character record is missing".to_string());
        };
        record.level = level;
        self.push_notice(id, PlayerNotice::LevelChanged { level });
        Ok(())
    }

    /// Grants item instances, topping up stacks first. The count is clamped
    /// to `1..=stack_size`; a failed capacity check grants nothing.
    pub fn give_item(
        &mut self,
        id: PlayerId,
        item: u32,
        count: u32,
        capacity: usize,
    ) -> Result<u32, String> {
        let Some(record) = self.records.items.get(item) else {
            return Err(format!("item {} does not exist", item));
        };
        let Some(player) = self.players.get_mut(&id) else {
            return Err("player is not online".to_string());
        };
        let count = count.clamp(1, record.stack_size.max(1));
        if !player.can_gain_item(record, count, capacity) {
            return Err(format!("inventory full for {}", player.name));
        }
        player.gain_item(record, count);
        self.push_notice(id, PlayerNotice::ItemGranted { item, count });
        Ok(count)
    }

    pub fn item_record(&self, item: u32) -> Option<&ItemRecord> {
        self.records.items.get(item)
    }

    /// Learns a new spell or re-levels a known one. Experience resets on
    /// every admin-set level.
    pub fn grant_spell(&mut self, id: PlayerId, spell: u32, level: u8) -> Result<SpellGrant, String> {
        if self.records.spells.get(spell).is_none() {
            return Err(format!("spell {} does not exist", spell));
        }
        let Some(player) = self.players.get(&id) else {
            return Err("player is not online".to_string());
        };
        let character = player.character;
        match player.spells_by_def.get(&spell).copied() {
            Some(learned_index) => {
                let Some(learned) = self.records.learned.get_mut(learned_index) else {
                    return Err("learned spell record is missing".to_string());
                };
                learned.level = level;
                learned.experience = 0;
                self.push_notice(id, PlayerNotice::SpellLeveled { spell, level });
                Ok(SpellGrant::Leveled)
            }
            None => {
                let learned_index = self
                    .records
                    .learned
                    .create(|index| LearnedSpell::new(index, character, spell, level));
                if let Some(record) = self.records.characters.get_mut(character) {
                    record.spells.push(learned_index);
                }
                if let Some(player) = self.players.get_mut(&id) {
                    player.spells_by_def.insert(spell, learned_index);
                }
                self.push_notice(id, PlayerNotice::SpellLearned { spell, level });
                Ok(SpellGrant::Learned)
            }
        }
    }

    /// Removes the learned record, the character's owned entry and the
    /// derived lookup entry together.
    pub fn revoke_spell(&mut self, id: PlayerId, spell: u32) -> Result<(), String> {
        let Some(player) = self.players.get_mut(&id) else {
            return Err("player is not online".to_string());
        };
        let Some(learned_index) = player.spells_by_def.remove(&spell) else {
            return Err(format!("{} does not know that spell", player.name));
        };
        let character = player.character;
        if let Some(record) = self.records.characters.get_mut(character) {
            record.spells.retain(|index| *index != learned_index);
        }
        self.records.learned.remove(learned_index);
        Ok(())
    }

    /// Places one monster instance. Rejects cells already holding a living
    /// creature; placement search treats a rejection as not-placed.
    pub fn spawn_monster(&mut self, monster: u32, map: u32, cell: Point) -> Result<MonsterId, String> {
        let Some(record) = self.records.monsters.get(monster) else {
            return Err(format!("monster {} does not exist", monster));
        };
        if !self.live_maps.contains_key(&map) {
            return Err(format!("map {} is not loaded", map));
        }
        let monster_there = self
            .monsters
            .values()
            .any(|instance| !instance.dead && instance.map == map && instance.position == cell);
        let player_there = self
            .players
            .values()
            .any(|player| player.map == map && player.position == cell);
        if monster_there || player_there {
            return Err(format!("cell {} on map {} is occupied", cell, map));
        }
        let id = MonsterId::next();
        let instance = MonsterInstance {
            id,
            monster,
            name: record.name.clone(),
            map,
            position: cell,
            health: record.max_health(),
            dead: false,
        };
        self.monsters.insert(id, instance);
        Ok(id)
    }

    /// Marks every living monster on the map dead. The simulation loop
    /// reaps the corpses on its own tick.
    pub fn kill_map_monsters(&mut self, map: u32) -> u32 {
        let mut killed = 0;
        for instance in self.monsters.values_mut() {
            if instance.map == map && !instance.dead {
                instance.die();
                killed += 1;
            }
        }
        killed
    }

    /// Queues an announcement for every connected player. Returns how many
    /// notices were queued.
    pub fn broadcast(&mut self, message: &str) -> usize {
        let ids: Vec<PlayerId> = self.players.keys().copied().collect();
        for id in &ids {
            self.notices.push(Notification {
                player: *id,
                notice: PlayerNotice::Chat {
                    kind: ChatKind::Announcement,
                    message: message.to_string(),
                },
            });
        }
        ids.len()
    }

    fn push_notice(&mut self, player: PlayerId, notice: PlayerNotice) {
        self.notices.push(Notification { player, notice });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::AccountRecord;
    use crate::entities::character::{CharacterClass, CharacterRecord};
    use crate::entities::item::ItemRecord;
    use crate::entities::monster::MonsterRecord;
    use crate::entities::spell::{SpellRecord, SpellSchool};
    use crate::entities::stats::StatKind;
    use crate::world::map::MapRecord;
    use std::collections::HashSet;

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
            let mut record = CharacterRecord::new(index, account, "Berrin", CharacterClass::Warrior);
            record.level = 7;
            record.map = 1;
            record.position = Point::new(8, 3);
            record
        });
        db.items.create(|index| {
            let mut record = ItemRecord::new(index, "healing draught");
            record.stack_size = 10;
            record
        });
        db.monsters.create(|index| {
            let mut record = MonsterRecord::new(index, "bone archer");
            record.stats.set(StatKind::Health, 40);
            record.stats_changed();
            record
        });
        db.spells.create(|index| {
            SpellRecord::new(index, "ember bolt", CharacterClass::Mage, SpellSchool::Flame)
        });
        db.maps.create(|index| MapRecord::new(index, "meadow.map"));
        db.maps.create(|index| MapRecord::new(index, "crypt.map"));

        let mut live_maps = HashMap::new();
        live_maps.insert(1, LiveMap::new(1, Arc::new(CollisionGrid::open(20, 15))));
        live_maps.insert(2, LiveMap::new(2, Arc::new(CollisionGrid::open(10, 10))));
        WorldState::from_parts(db, live_maps)
    }

    fn assert_spell_lookup_consistent(world: &WorldState, id: PlayerId) {
        let player = world.player(id).expect("player online");
        let record = world
            .records
            .characters
            .get(player.character)
            .expect("character record");
        let owned: HashSet<u32> = record.spells.iter().copied().collect();
        let derived: HashSet<u32> = player.spells_by_def.values().copied().collect();
        assert_eq!(owned, derived);
        for (spell, learned_index) in &player.spells_by_def {
            let learned = world
                .records
                .learned
                .get(*learned_index)
                .expect("learned record");
            assert_eq!(learned.spell, *spell);
            assert_eq!(learned.character, player.character);
        }
    }

    #[test]
    fn connect_registers_presence_and_rejects_double_login() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        let player = world.player(id).expect("online");
        assert_eq!(player.name, "Aldric");
        assert_eq!(player.map, 1);
        assert!(world.live_map(1).expect("live").players.contains(&id));

        let err = world.connect_player(1).unwrap_err();
        assert!(err.contains("already online"));
    }

    #[test]
    fn connect_builds_the_derived_spell_lookup() {
        let mut world = test_world();
        let learned = world
            .records
            .learned
            .create(|index| LearnedSpell::new(index, 1, 1, 2));
        world.records.characters.get_mut(1).unwrap().spells = vec![learned];

        let id = world.connect_player(1).expect("connect");
        assert_eq!(
            world.player(id).unwrap().spells_by_def.get(&1).copied(),
            Some(learned)
        );
        assert_spell_lookup_consistent(&world, id);
    }

    #[test]
    fn player_lookup_is_case_insensitive() {
        let mut world = test_world();
        world.connect_player(1).expect("connect");
        assert!(world.player_by_name("aldric").is_some());
        assert!(world.player_by_name("  ALDRIC ").is_some());
        assert!(world.player_by_name("nobody").is_none());
    }

    #[test]
    fn disconnect_writes_position_back_to_the_record() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");
        world
            .teleport_player(id, 2, Point::new(3, 4))
            .expect("teleport");

        world.disconnect_player(id).expect("disconnect");

        let record = world.records.characters.get(1).expect("record");
        assert_eq!(record.map, 2);
        assert_eq!(record.position, Point::new(3, 4));
        assert!(world.live_map(2).unwrap().players.is_empty());
        assert!(world.player_by_name("Aldric").is_none());
    }

    #[test]
    fn teleport_moves_presence_between_live_maps() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        world
            .teleport_player(id, 2, Point::new(1, 1))
            .expect("teleport");

        assert!(!world.live_map(1).unwrap().players.contains(&id));
        assert!(world.live_map(2).unwrap().players.contains(&id));
        assert_eq!(world.player(id).unwrap().position, Point::new(1, 1));

        let err = world.teleport_player(id, 9, Point::new(1, 1)).unwrap_err();
        assert!(err.contains("map 9 is not loaded"));
    }

    #[test]
    fn kick_queues_a_disconnect_notice_and_detaches() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        world.kick_player(id, "kicked by an administrator").expect("kick");

        assert!(world.player(id).is_none());
        let notices = world.take_notices();
        assert!(notices.iter().any(|notification| {
            notification.player == id
                && matches!(&notification.notice, PlayerNotice::Disconnect { reason }
                    if reason == "kicked by an administrator")
        }));
    }

    #[test]
    fn apply_level_updates_the_record_and_notifies() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        world.apply_level(id, 15).expect("level");

        assert_eq!(world.records.characters.get(1).unwrap().level, 15);
        let notices = world.take_notices();
        assert!(notices
            .iter()
            .any(|notification| notification.notice == PlayerNotice::LevelChanged { level: 15 }));
    }

    #[test]
    fn give_item_clamps_to_stack_size_and_notifies() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        let granted = world.give_item(id, 1, 25, 40).expect("give");
        assert_eq!(granted, 10);
        assert_eq!(world.player(id).unwrap().inventory.len(), 1);
        assert_eq!(world.player(id).unwrap().inventory[0].count, 10);

        let notices = world.take_notices();
        assert!(notices
            .iter()
            .any(|notification| notification.notice
                == PlayerNotice::ItemGranted { item: 1, count: 10 }));
    }

    #[test]
    fn give_item_reports_a_full_inventory() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");
        world.give_item(id, 1, 10, 1).expect("fill the only slot");

        let err = world.give_item(id, 1, 5, 1).unwrap_err();
        assert!(err.contains("inventory full"));
        assert_eq!(world.player(id).unwrap().inventory.len(), 1);
    }

    #[test]
    fn grant_then_regrant_then_revoke_keeps_the_lookup_consistent() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        let first = world.grant_spell(id, 1, 1).expect("grant");
        assert_eq!(first, SpellGrant::Learned);
        assert_spell_lookup_consistent(&world, id);
        assert_eq!(world.records.learned.len(), 1);

        let learned_index = world.player(id).unwrap().spells_by_def[&1];
        world
            .records
            .learned
            .get_mut(learned_index)
            .unwrap()
            .experience = 500;

        let second = world.grant_spell(id, 1, 3).expect("regrant");
        assert_eq!(second, SpellGrant::Leveled);
        assert_eq!(world.records.learned.len(), 1);
        let learned = world.records.learned.get(learned_index).unwrap();
        assert_eq!(learned.level, 3);
        assert_eq!(learned.experience, 0);
        assert_spell_lookup_consistent(&world, id);

        world.revoke_spell(id, 1).expect("revoke");
        assert!(world.records.learned.get(learned_index).is_none());
        assert!(world.player(id).unwrap().spells_by_def.is_empty());
        assert_spell_lookup_consistent(&world, id);

        let err = world.revoke_spell(id, 1).unwrap_err();
        assert!(err.contains("does not know"));
    }

    #[test]
    fn grant_notices_distinguish_learning_from_leveling() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");

        world.grant_spell(id, 1, 1).expect("grant");
        world.grant_spell(id, 1, 2).expect("regrant");

        let notices = world.take_notices();
        assert!(notices
            .iter()
            .any(|n| n.notice == PlayerNotice::SpellLearned { spell: 1, level: 1 }));
        assert!(notices
            .iter()
            .any(|n| n.notice == PlayerNotice::SpellLeveled { spell: 1, level: 2 }));
    }

    #[test]
    fn spawn_rejects_occupied_cells() {
        let mut world = test_world();
        let id = world.connect_player(1).expect("connect");
        let anchor = world.player(id).unwrap().position;

        let err = world.spawn_monster(1, 1, anchor).unwrap_err();
        assert!(err.contains("occupied"));

        let spawned = world.spawn_monster(1, 1, Point::new(6, 5)).expect("spawn");
        let err = world.spawn_monster(1, 1, Point::new(6, 5)).unwrap_err();
        assert!(err.contains("occupied"));

        assert_eq!(world.monster(spawned).unwrap().health, 40);
        assert_eq!(world.live_monster_count(1), 1);
    }

    #[test]
    fn kill_map_monsters_touches_only_that_map() {
        let mut world = test_world();
        world.spawn_monster(1, 1, Point::new(2, 2)).expect("spawn");
        world.spawn_monster(1, 1, Point::new(3, 2)).expect("spawn");
        world.spawn_monster(1, 2, Point::new(2, 2)).expect("spawn");

        assert_eq!(world.kill_map_monsters(1), 2);
        assert_eq!(world.live_monster_count(1), 0);
        assert_eq!(world.live_monster_count(2), 1);
        assert_eq!(world.kill_map_monsters(1), 0);
    }

    #[test]
    fn broadcast_reaches_every_connected_player() {
        let mut world = test_world();
        let first = world.connect_player(1).expect("connect");
        let second = world.connect_player(2).expect("connect");

        assert_eq!(world.broadcast("the realm sleeps in one minute"), 2);

        let notices = world.take_notices();
        for id in [first, second] {
            assert!(notices.iter().any(|notification| {
                notification.player == id
                    && matches!(&notification.notice, PlayerNotice::Chat { kind, message }
                        if *kind == ChatKind::Announcement
                            && message == "the realm sleeps in one minute")
            }));
        }
        assert!(world.take_notices().is_empty());
    }
}
