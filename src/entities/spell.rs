use crate::entities::character::CharacterClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpellSchool {
    Flame,
    Frost,
    Storm,
    Nature,
    Holy,
    Shadow,
}

impl SpellSchool {
    pub const ALL: [SpellSchool; 6] = [
        SpellSchool::Flame,
        SpellSchool::Frost,
        SpellSchool::Storm,
        SpellSchool::Nature,
        SpellSchool::Holy,
        SpellSchool::Shadow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpellSchool::Flame => "flame",
            SpellSchool::Frost => "frost",
            SpellSchool::Storm => "storm",
            SpellSchool::Nature => "nature",
            SpellSchool::Holy => "holy",
            SpellSchool::Shadow => "shadow",
        }
    }

    pub fn parse(value: &str) -> Option<SpellSchool> {
        SpellSchool::ALL
            .into_iter()
            .find(|school| school.name().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastMode {
    Passive,
    Instant,
    Targeted,
    Ground,
}

impl CastMode {
    pub const ALL: [CastMode; 4] = [
        CastMode::Passive,
        CastMode::Instant,
        CastMode::Targeted,
        CastMode::Ground,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CastMode::Passive => "passive",
            CastMode::Instant => "instant",
            CastMode::Targeted => "targeted",
            CastMode::Ground => "ground",
        }
    }

    pub fn parse(value: &str) -> Option<CastMode> {
        CastMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(value.trim()))
    }
}

/// Number of proficiency tiers on a spell. The tier arrays carry the level a
/// character needs to reach each tier and the experience that completes it.
pub const SPELL_TIERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpellRecord {
    pub index: u32,
    pub name: String,
    pub class: CharacterClass,
    pub school: SpellSchool,
    pub mode: CastMode,
    pub min_power: u16,
    pub max_power: u16,
    pub mana_cost: u16,
    pub cost_per_level: u16,
    pub need_levels: [u16; SPELL_TIERS],
    pub tier_experience: [u32; SPELL_TIERS],
    pub delay_ms: u32,
    pub description: String,
}

impl SpellRecord {
    pub fn new(index: u32, name: &str, class: CharacterClass, school: SpellSchool) -> SpellRecord {
        SpellRecord {
            index,
            name: name.trim().to_string(),
            class,
            school,
            mode: CastMode::Targeted,
            min_power: 0,
            max_power: 0,
            mana_cost: 0,
            cost_per_level: 0,
            need_levels: [1, 1, 1],
            tier_experience: [0, 0, 0],
            delay_ms: 0,
            description: String::new(),
        }
    }
}

/// A spell a character has learned. Level is admin-settable up to the
/// configured ceiling; experience resets to zero whenever the level is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedSpell {
    pub index: u32,
    pub character: u32,
    pub spell: u32,
    pub level: u8,
    pub experience: u32,
}

impl LearnedSpell {
    pub fn new(index: u32, character: u32, spell: u32, level: u8) -> LearnedSpell {
        LearnedSpell {
            index,
            character,
            spell,
            level,
            experience: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn school_and_mode_names_parse_back() {
        for school in SpellSchool::ALL {
            assert_eq!(SpellSchool::parse(school.name()), Some(school));
        }
        for mode in CastMode::ALL {
            assert_eq!(CastMode::parse(mode.name()), Some(mode));
        }
        assert_eq!(SpellSchool::parse("void"), None);
    }

    #[test]
    fn new_learned_spell_has_zero_experience() {
        let learned = LearnedSpell::new(1, 2, 3, 2);
        assert_eq!(learned.experience, 0);
        assert_eq!(learned.level, 2);
    }
}
