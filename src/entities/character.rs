use crate::world::position::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Ranger,
    Cleric,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Warrior,
        CharacterClass::Mage,
        CharacterClass::Ranger,
        CharacterClass::Cleric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CharacterClass::Warrior => "warrior",
            CharacterClass::Mage => "mage",
            CharacterClass::Ranger => "ranger",
            CharacterClass::Cleric => "cleric",
        }
    }

    pub fn parse(value: &str) -> Option<CharacterClass> {
        CharacterClass::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(value.trim()))
    }
}

/// Persisted character row. `spells` is the owned list of learned-spell
/// record indices; the per-player lookup keyed by spell definition is derived
/// from it while the character is online.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    pub index: u32,
    pub account: u32,
    pub name: String,
    pub class: CharacterClass,
    pub level: u16,
    pub map: u32,
    pub position: Point,
    pub spells: Vec<u32>,
}

impl CharacterRecord {
    pub fn new(index: u32, account: u32, name: &str, class: CharacterClass) -> CharacterRecord {
        CharacterRecord {
            index,
            account,
            name: name.trim().to_string(),
            class,
            level: 1,
            map: 0,
            position: Point::ORIGIN,
            spells: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_names_parse_back() {
        for class in CharacterClass::ALL {
            assert_eq!(CharacterClass::parse(class.name()), Some(class));
        }
        assert_eq!(CharacterClass::parse("WARRIOR"), Some(CharacterClass::Warrior));
        assert_eq!(CharacterClass::parse("bard"), None);
    }

    #[test]
    fn new_character_starts_at_level_one_with_no_spells() {
        let record = CharacterRecord::new(7, 3, " Bob ", CharacterClass::Mage);
        assert_eq!(record.name, "Bob");
        assert_eq!(record.level, 1);
        assert!(record.spells.is_empty());
    }
}
