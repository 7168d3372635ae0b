pub mod accounts;
pub mod commands;
pub mod dispatch;
pub mod items;
pub mod maps;
pub mod monsters;
pub mod players;
pub mod query;
pub mod roles;
pub mod spells;
