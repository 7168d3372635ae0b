use crate::entities::player::PlayerId;
use crate::world::grid::CollisionGrid;
use crate::world::position::Point;
use std::collections::HashSet;
use std::sync::Arc;

/// Map definition. Rates are percentages with a floor/ceiling pair; level
/// bounds of 0 mean unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRecord {
    pub index: u32,
    pub file_name: String,
    pub description: String,
    pub allow_recall: bool,
    pub allow_teleport: bool,
    pub can_mine: bool,
    pub min_level: u16,
    pub max_level: u16,
    pub drop_rate: u32,
    pub max_drop_rate: u32,
    pub experience_rate: u32,
    pub max_experience_rate: u32,
    pub gold_rate: u32,
    pub max_gold_rate: u32,
}

impl MapRecord {
    pub fn new(index: u32, file_name: &str) -> MapRecord {
        let file_name = file_name.trim().to_string();
        MapRecord {
            index,
            description: file_name.clone(),
            file_name,
            allow_recall: true,
            allow_teleport: true,
            can_mine: false,
            min_level: 0,
            max_level: 0,
            drop_rate: 100,
            max_drop_rate: 100,
            experience_rate: 100,
            max_experience_rate: 100,
            gold_rate: 100,
            max_gold_rate: 100,
        }
    }
}

/// Running instance of a map definition. Exists only if the definition's
/// grid file parsed at world load; definitions without one stay data-only.
#[derive(Debug, Clone)]
pub struct LiveMap {
    pub record: u32,
    pub grid: Arc<CollisionGrid>,
    pub players: HashSet<PlayerId>,
}

impl LiveMap {
    pub fn new(record: u32, grid: Arc<CollisionGrid>) -> LiveMap {
        LiveMap {
            record,
            grid,
            players: HashSet::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }

    pub fn blocked(&self, point: Point) -> bool {
        self.grid.blocked(point)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
