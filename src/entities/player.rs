use crate::entities::character::CharacterClass;
use crate::entities::item::{ItemRecord, ItemStack};
use crate::world::position::Point;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u32);

/// A character currently online. Exists only between connect and disconnect;
/// admin commands look players up by case-insensitive name and treat absence
/// as a normal "not online" outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub character: u32,
    pub name: String,
    pub class: CharacterClass,
    pub map: u32,
    pub position: Point,
    pub inventory: Vec<ItemStack>,
    /// Derived index: spell definition -> learned-spell record. Rebuilt at
    /// connect and maintained on every grant/revoke; the character's owned
    /// list stays authoritative.
    pub spells_by_def: HashMap<u32, u32>,
}

impl PlayerState {
    pub fn new(
        id: PlayerId,
        character: u32,
        name: &str,
        class: CharacterClass,
        map: u32,
        position: Point,
    ) -> PlayerState {
        PlayerState {
            id,
            character,
            name: name.to_string(),
            class,
            map,
            position,
            inventory: Vec::new(),
            spells_by_def: HashMap::new(),
        }
    }

    /// Room check before a grant: topping up existing stacks of the same
    /// definition counts, then free slots at full stack size.
    pub fn can_gain_item(&self, record: &ItemRecord, count: u32, capacity: usize) -> bool {
        let stack_size = record.stack_size.max(1);
        let mut room: u64 = 0;
        for stack in &self.inventory {
            if stack.item == record.index {
                room += u64::from(stack_size.saturating_sub(stack.count));
            }
        }
        let free_slots = capacity.saturating_sub(self.inventory.len()) as u64;
        room += free_slots * u64::from(stack_size);
        room >= u64::from(count)
    }

    /// Adds `count` units, topping up existing stacks first and opening new
    /// ones as needed. Callers check [`PlayerState::can_gain_item`] first.
    pub fn gain_item(&mut self, record: &ItemRecord, count: u32) {
        let stack_size = record.stack_size.max(1);
        let mut remaining = count.max(1);

        for stack in &mut self.inventory {
            if remaining == 0 {
                break;
            }
            if stack.item != record.index {
                continue;
            }
            let room = stack_size.saturating_sub(stack.count);
            let added = room.min(remaining);
            stack.count += added;
            remaining -= added;
        }

        while remaining > 0 {
            let added = remaining.min(stack_size);
            self.inventory.push(ItemStack::fresh(record, added));
            remaining -= added;
        }
    }
}
