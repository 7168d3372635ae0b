use crate::entities::stats::{EffectiveStats, StatKind, StatSet};
use crate::world::position::Point;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonsterFlags {
    pub boss: bool,
    pub undead: bool,
    pub tameable: bool,
    pub pushable: bool,
}

/// Catalog entry for a monster. `stats` is the sparse authoritative set;
/// `effective` is derived and only refreshed by [`MonsterRecord::stats_changed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterRecord {
    pub index: u32,
    pub name: String,
    pub level: u16,
    pub experience: u32,
    pub view_range: u8,
    pub attack_delay: u32,
    pub move_delay: u32,
    pub flags: MonsterFlags,
    pub stats: StatSet,
    pub effective: EffectiveStats,
}

impl MonsterRecord {
    pub fn new(index: u32, name: &str) -> MonsterRecord {
        MonsterRecord {
            index,
            name: name.trim().to_string(),
            level: 1,
            experience: 0,
            view_range: 7,
            attack_delay: 2000,
            move_delay: 1000,
            flags: MonsterFlags::default(),
            stats: StatSet::new(),
            effective: EffectiveStats::default(),
        }
    }

    /// Recomputes the derived totals. Callers invoke this after every stat
    /// mutation; nothing recomputes implicitly.
    pub fn stats_changed(&mut self) {
        self.effective = EffectiveStats::from_set(&self.stats);
    }

    pub fn max_health(&self) -> i32 {
        self.effective.get(StatKind::Health).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonsterId(pub u32);

static NEXT_MONSTER_ID: AtomicU32 = AtomicU32::new(1);

impl MonsterId {
    pub fn next() -> Self {
        let id = NEXT_MONSTER_ID.fetch_add(1, Ordering::Relaxed);
        MonsterId(id)
    }
}

/// A spawned monster. The simulation loop owns movement and reaping; the
/// admin core only creates instances and marks them dead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterInstance {
    pub id: MonsterId,
    pub monster: u32,
    pub name: String,
    pub map: u32,
    pub position: Point,
    pub health: i32,
    pub dead: bool,
}

impl MonsterInstance {
    pub fn die(&mut self) {
        self.dead = true;
        self.health = 0;
    }
}
