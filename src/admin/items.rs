use crate::admin::commands::{CommandOutcome, ItemPatch, OutcomeData};
use crate::admin::query::{keyword_matches, paginate, Page, QueryError, ITEM_PAGE_SIZE};
use crate::entities::item::{ItemCategory, ItemRecord};
use crate::telemetry::logging;
use crate::world::state::WorldState;
use std::sync::Mutex;

/// Catalog search. An explicit category narrows the result before the
/// keyword does; rows sort by category, then required level, then index.
pub fn search_items(
    world: &Mutex<WorldState>,
    keyword: &str,
    category: Option<ItemCategory>,
    page: i64,
) -> Result<Page<ItemRecord>, QueryError> {
    let world = world.lock().map_err(|_| QueryError::WorldUnavailable)?;
    let mut records: Vec<ItemRecord> = world
        .records
        .items
        .iter()
        .filter(|record| category.map_or(true, |category| record.category == category))
        .filter(|record| keyword_matches(keyword, record.index, &[record.name.as_str()]))
        .cloned()
        .collect();
    drop(world);

    records.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(a.required_level.cmp(&b.required_level))
            .then(a.index.cmp(&b.index))
    });
    Ok(paginate(records, page, ITEM_PAGE_SIZE))
}

pub fn item_detail(world: &WorldState, item: u32) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.items.get(item) else {
        return Err(format!("no item with index {}", item));
    };
    Ok(CommandOutcome::with_data(
        format!("item {} '{}'", record.index, record.name),
        OutcomeData::Item(record.clone()),
    ))
}

/// Grants item instances to an online player. The world clamps the count to
/// the stack size and refuses the grant outright when the inventory is full.
pub fn give_item(
    world: &mut WorldState,
    name: &str,
    item: u32,
    count: u32,
    capacity: usize,
) -> Result<CommandOutcome, String> {
    let Some(player) = world.player_by_name(name) else {
        return Err(format!("{} is not online", name));
    };
    let id = player.id;
    let player_name = player.name.clone();

    let granted = world.give_item(id, item, count, capacity)?;
    let item_name = world
        .item_record(item)
        .map(|record| record.name.clone())
        .unwrap_or_default();
    logging::log_admin(&format!(
        "player {} granted {}x {}",
        player_name, granted, item_name
    ));
    Ok(CommandOutcome::success(format!(
        "gave {}x {} to {}",
        granted, item_name, player_name
    )))
}

pub fn create_item(
    world: &mut WorldState,
    name: &str,
    patch: &ItemPatch,
) -> Result<CommandOutcome, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("item name is empty".to_string());
    }
    let mut final_name = String::new();
    let index = world.records.items.create(|index| {
        let mut record = ItemRecord::new(index, name);
        patch.apply(&mut record);
        final_name = record.name.clone();
        record
    });
    logging::log_admin(&format!("item {} '{}' created", index, final_name));
    Ok(CommandOutcome::success(format!(
        "item {} '{}' created",
        index, final_name
    )))
}

pub fn update_item(
    world: &mut WorldState,
    item: u32,
    patch: &ItemPatch,
) -> Result<CommandOutcome, String> {
    let Some(record) = world.records.items.get_mut(item) else {
        return Err(format!("no item with index {}", item));
    };
    patch.apply(record);
    let name = record.name.clone();
    logging::log_admin(&format!("item {} '{}' updated", item, name));
    Ok(CommandOutcome::success(format!(
        "item {} '{}' updated",
        item, name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::AccountRecord;
    use crate::entities::character::{CharacterClass, CharacterRecord};
    use crate::persistence::store::RecordDb;
    use crate::world::grid::CollisionGrid;
    use crate::world::map::{LiveMap, MapRecord};
    use crate::world::position::Point;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn catalog_world() -> WorldState {
        let mut db = RecordDb::default();
        db.items.create(|index| {
            let mut record = ItemRecord::new(index, "iron sword");
            record.category = ItemCategory::Weapon;
            record.required_level = 5;
            record
        });
        db.items.create(|index| {
            let mut record = ItemRecord::new(index, "healing draught");
            record.category = ItemCategory::Potion;
            record.stack_size = 10;
            record
        });
        db.items.create(|index| {
            let mut record = ItemRecord::new(index, "training sword");
            record.category = ItemCategory::Weapon;
            record.required_level = 1;
            record
        });
        WorldState::from_parts(db, HashMap::new())
    }

    fn online_world() -> WorldState {
        let mut db = RecordDb::default();
        let account = db
            .accounts
            .create(|index| AccountRecord::new(index, "keeper@eldermoor.io"));
        db.characters.create(|index| {
            let mut record = CharacterRecord::new(index, account, "Aldric", CharacterClass::Mage);
            record.map = 1;
            record.position = Point::new(5, 5);
            record
        });
        db.items.create(|index| {
            let mut record = ItemRecord::new(index, "healing draught");
            record.stack_size = 10;
            record
        });
        db.maps.create(|index| MapRecord::new(index, "meadow.map"));

        let mut live_maps = HashMap::new();
        live_maps.insert(1, LiveMap::new(1, Arc::new(CollisionGrid::open(10, 10))));
        WorldState::from_parts(db, live_maps)
    }

    #[test]
    fn search_sorts_by_category_then_level_then_index() {
        let world = Mutex::new(catalog_world());
        let page = search_items(&world, "", None, 1).expect("search");
        let order: Vec<u32> = page.items.iter().map(|record| record.index).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn category_filter_narrows_before_the_keyword() {
        let world = Mutex::new(catalog_world());

        let potions = search_items(&world, "", Some(ItemCategory::Potion), 1).expect("search");
        assert_eq!(potions.total, 1);
        assert_eq!(potions.items[0].name, "healing draught");

        let swords = search_items(&world, "sword", Some(ItemCategory::Potion), 1).expect("search");
        assert_eq!(swords.total, 0);
    }

    #[test]
    fn keyword_matches_name_or_index() {
        let world = Mutex::new(catalog_world());

        let by_name = search_items(&world, "SWORD", None, 1).expect("search");
        assert_eq!(by_name.total, 2);

        let by_index = search_items(&world, "3", None, 1).expect("search");
        assert_eq!(by_index.total, 1);
        assert_eq!(by_index.items[0].index, 3);
    }

    #[test]
    fn item_pages_hold_fifty_rows() {
        let mut world = catalog_world();
        for n in 0..117 {
            world
                .records
                .items
                .create(|index| ItemRecord::new(index, &format!("relic {}", n)));
        }
        let world = Mutex::new(world);

        let second = search_items(&world, "", None, 2).expect("search");
        assert_eq!(second.total, 120);
        assert_eq!(second.items.len(), 50);
        assert_eq!(second.page, 2);
        assert_eq!(second.total_pages(), 3);

        let third = search_items(&world, "", None, 3).expect("search");
        assert_eq!(third.items.len(), 20);
    }

    #[test]
    fn detail_returns_the_record() {
        let world = catalog_world();
        let outcome = item_detail(&world, 2).expect("detail");
        assert!(outcome.message.contains("healing draught"));
        let Some(OutcomeData::Item(record)) = outcome.data else {
            panic!("expected item data");
        };
        assert_eq!(record.index, 2);

        let err = item_detail(&world, 99).unwrap_err();
        assert_eq!(err, "no item with index 99");
    }

    #[test]
    fn give_clamps_to_one_stack_and_reports_the_grant() {
        let mut world = online_world();
        let id = world.connect_player(1).expect("connect");

        let outcome = give_item(&mut world, "aldric", 1, 25, 40).expect("give");
        assert_eq!(outcome.message, "gave 10x healing draught to Aldric");
        assert_eq!(world.player(id).unwrap().inventory[0].count, 10);
    }

    #[test]
    fn give_fails_cleanly_when_the_inventory_is_full() {
        let mut world = online_world();
        let id = world.connect_player(1).expect("connect");
        give_item(&mut world, "Aldric", 1, 10, 1).expect("fill the only slot");

        let err = give_item(&mut world, "Aldric", 1, 5, 1).unwrap_err();
        assert!(err.contains("inventory full"));
        assert_eq!(world.player(id).unwrap().inventory.len(), 1);
    }

    #[test]
    fn give_requires_an_online_player_and_a_known_item() {
        let mut world = online_world();
        let err = give_item(&mut world, "Aldric", 1, 1, 40).unwrap_err();
        assert!(err.contains("not online"));

        world.connect_player(1).expect("connect");
        let err = give_item(&mut world, "Aldric", 99, 1, 40).unwrap_err();
        assert!(err.contains("item 99 does not exist"));
    }

    #[test]
    fn create_applies_the_patch_and_assigns_the_next_index() {
        let mut world = catalog_world();
        let mut patch = ItemPatch::default();
        patch.set("category", "weapon").expect("set");
        patch.set("price", "250").expect("set");
        patch.set("stack_size", "0").expect("set");

        let outcome = create_item(&mut world, "ember blade", &patch).expect("create");
        assert_eq!(outcome.message, "item 4 'ember blade' created");

        let record = world.records.items.get(4).expect("created");
        assert_eq!(record.category, ItemCategory::Weapon);
        assert_eq!(record.price, 250);
        assert_eq!(record.stack_size, 1);
    }

    #[test]
    fn create_rejects_a_blank_name() {
        let mut world = catalog_world();
        let err = create_item(&mut world, "   ", &ItemPatch::default()).unwrap_err();
        assert_eq!(err, "item name is empty");
        assert_eq!(world.records.items.len(), 3);
    }

    #[test]
    fn update_touches_only_patched_fields() {
        let mut world = catalog_world();
        let mut patch = ItemPatch::default();
        patch.set("price", "90").expect("set");

        update_item(&mut world, 1, &patch).expect("update");
        let record = world.records.items.get(1).expect("record");
        assert_eq!(record.price, 90);
        assert_eq!(record.name, "iron sword");
        assert_eq!(record.required_level, 5);

        let err = update_item(&mut world, 99, &patch).unwrap_err();
        assert_eq!(err, "no item with index 99");
    }
}
