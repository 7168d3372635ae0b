pub mod grid;
pub mod grid_cache;
pub mod map;
pub mod position;
pub mod spawn;
pub mod state;
