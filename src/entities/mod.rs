pub mod account;
pub mod character;
pub mod item;
pub mod monster;
pub mod player;
pub mod spell;
pub mod stats;
