use crate::entities::character::CharacterClass;
use std::sync::atomic::{AtomicU64, Ordering};

/// Instance id for items created at runtime. Definitions use stable record
/// indices instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

impl ItemId {
    pub fn next() -> Self {
        let id = NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed);
        ItemId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemCategory {
    Weapon,
    Armor,
    Helmet,
    Shield,
    Ring,
    Amulet,
    Boots,
    Potion,
    Scroll,
    Material,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 10] = [
        ItemCategory::Weapon,
        ItemCategory::Armor,
        ItemCategory::Helmet,
        ItemCategory::Shield,
        ItemCategory::Ring,
        ItemCategory::Amulet,
        ItemCategory::Boots,
        ItemCategory::Potion,
        ItemCategory::Scroll,
        ItemCategory::Material,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ItemCategory::Weapon => "weapon",
            ItemCategory::Armor => "armor",
            ItemCategory::Helmet => "helmet",
            ItemCategory::Shield => "shield",
            ItemCategory::Ring => "ring",
            ItemCategory::Amulet => "amulet",
            ItemCategory::Boots => "boots",
            ItemCategory::Potion => "potion",
            ItemCategory::Scroll => "scroll",
            ItemCategory::Material => "material",
        }
    }

    pub fn parse(value: &str) -> Option<ItemCategory> {
        ItemCategory::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Common,
    Superior,
    Elite,
}

impl Rarity {
    pub const ALL: [Rarity; 3] = [Rarity::Common, Rarity::Superior, Rarity::Elite];

    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Superior => "superior",
            Rarity::Elite => "elite",
        }
    }

    pub fn parse(value: &str) -> Option<Rarity> {
        Rarity::ALL
            .into_iter()
            .find(|rarity| rarity.name().eq_ignore_ascii_case(value.trim()))
    }
}

/// Who may use an item. `Any` is the unrestricted default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRequirement {
    Any,
    Only(CharacterClass),
}

impl ClassRequirement {
    pub fn allows(self, class: CharacterClass) -> bool {
        match self {
            ClassRequirement::Any => true,
            ClassRequirement::Only(required) => required == class,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ClassRequirement::Any => "any",
            ClassRequirement::Only(class) => class.name(),
        }
    }

    pub fn parse(value: &str) -> Option<ClassRequirement> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("any") {
            return Some(ClassRequirement::Any);
        }
        CharacterClass::parse(trimmed).map(ClassRequirement::Only)
    }
}

/// Catalog entry. Instances are [`ItemStack`]s created fresh from a record
/// when granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub index: u32,
    pub name: String,
    pub category: ItemCategory,
    pub required_class: ClassRequirement,
    pub required_level: u16,
    pub stack_size: u32,
    pub price: u32,
    pub weight: u32,
    pub durability: u32,
    pub rarity: Rarity,
}

impl ItemRecord {
    pub fn new(index: u32, name: &str) -> ItemRecord {
        ItemRecord {
            index,
            name: name.trim().to_string(),
            category: ItemCategory::Material,
            required_class: ClassRequirement::Any,
            required_level: 0,
            stack_size: 1,
            price: 0,
            weight: 0,
            durability: 0,
            rarity: Rarity::Common,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub id: ItemId,
    pub item: u32,
    pub count: u32,
}

impl ItemStack {
    /// Fresh instance of a definition. Count is clamped to at least 1; the
    /// grant path splits across stacks when it exceeds the stack size.
    pub fn fresh(record: &ItemRecord, count: u32) -> ItemStack {
        ItemStack {
            id: ItemId::next(),
            item: record.index,
            count: count.max(1),
        }
    }
}
