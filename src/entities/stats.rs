use std::collections::BTreeMap;

/// Closed set of stat kinds a monster definition can carry. Sparse records
/// store only nonzero amounts; the dense [`EffectiveStats`] block is derived
/// from them on explicit recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatKind {
    Health,
    Mana,
    MinDefense,
    MaxDefense,
    MinResist,
    MaxResist,
    MinDamage,
    MaxDamage,
    MinSpellPower,
    MaxSpellPower,
    Accuracy,
    Agility,
}

impl StatKind {
    pub const COUNT: usize = 12;

    pub const ALL: [StatKind; StatKind::COUNT] = [
        StatKind::Health,
        StatKind::Mana,
        StatKind::MinDefense,
        StatKind::MaxDefense,
        StatKind::MinResist,
        StatKind::MaxResist,
        StatKind::MinDamage,
        StatKind::MaxDamage,
        StatKind::MinSpellPower,
        StatKind::MaxSpellPower,
        StatKind::Accuracy,
        StatKind::Agility,
    ];

    pub fn index(self) -> usize {
        match self {
            StatKind::Health => 0,
            StatKind::Mana => 1,
            StatKind::MinDefense => 2,
            StatKind::MaxDefense => 3,
            StatKind::MinResist => 4,
            StatKind::MaxResist => 5,
            StatKind::MinDamage => 6,
            StatKind::MaxDamage => 7,
            StatKind::MinSpellPower => 8,
            StatKind::MaxSpellPower => 9,
            StatKind::Accuracy => 10,
            StatKind::Agility => 11,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatKind::Health => "health",
            StatKind::Mana => "mana",
            StatKind::MinDefense => "min_defense",
            StatKind::MaxDefense => "max_defense",
            StatKind::MinResist => "min_resist",
            StatKind::MaxResist => "max_resist",
            StatKind::MinDamage => "min_damage",
            StatKind::MaxDamage => "max_damage",
            StatKind::MinSpellPower => "min_spell_power",
            StatKind::MaxSpellPower => "max_spell_power",
            StatKind::Accuracy => "accuracy",
            StatKind::Agility => "agility",
        }
    }

    pub fn parse(name: &str) -> Option<StatKind> {
        StatKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Sparse stat storage: setting an amount of 0 removes the entry instead of
/// keeping a zero row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatSet {
    amounts: BTreeMap<StatKind, i32>,
}

impl StatSet {
    pub fn new() -> StatSet {
        StatSet {
            amounts: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, kind: StatKind, amount: i32) {
        if amount == 0 {
            self.amounts.remove(&kind);
        } else {
            self.amounts.insert(kind, amount);
        }
    }

    pub fn get(&self, kind: StatKind) -> i32 {
        self.amounts.get(&kind).copied().unwrap_or(0)
    }

    pub fn contains(&self, kind: StatKind) -> bool {
        self.amounts.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKind, i32)> + '_ {
        self.amounts.iter().map(|(kind, amount)| (*kind, *amount))
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// Dense derived totals, recomputed from a [`StatSet`] whenever the sparse
/// set changes. Never updated implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveStats {
    totals: [i32; StatKind::COUNT],
}

impl EffectiveStats {
    pub fn from_set(stats: &StatSet) -> EffectiveStats {
        let mut totals = [0i32; StatKind::COUNT];
        for (kind, amount) in stats.iter() {
            totals[kind.index()] = amount;
        }
        EffectiveStats { totals }
    }

    pub fn get(&self, kind: StatKind) -> i32 {
        self.totals[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_kind_indices_cover_the_dense_array() {
        for (position, kind) in StatKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn stat_kind_names_parse_back() {
        for kind in StatKind::ALL {
            assert_eq!(StatKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(StatKind::parse("HEALTH"), Some(StatKind::Health));
        assert_eq!(StatKind::parse("luck"), None);
    }

    #[test]
    fn setting_zero_removes_the_entry() {
        let mut stats = StatSet::new();
        stats.set(StatKind::Health, 1200);
        assert!(stats.contains(StatKind::Health));

        stats.set(StatKind::Health, 0);
        assert!(!stats.contains(StatKind::Health));
        assert_eq!(stats.get(StatKind::Health), 0);
        assert!(stats.is_empty());
    }

    #[test]
    fn setting_nonzero_after_removal_recreates_the_entry() {
        let mut stats = StatSet::new();
        stats.set(StatKind::Accuracy, 20);
        stats.set(StatKind::Accuracy, 0);
        stats.set(StatKind::Accuracy, 25);
        assert_eq!(stats.get(StatKind::Accuracy), 25);
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn effective_stats_mirror_the_sparse_set_exactly() {
        let mut stats = StatSet::new();
        stats.set(StatKind::Health, 400);
        stats.set(StatKind::MinDamage, 12);
        stats.set(StatKind::MaxDamage, 30);

        let effective = EffectiveStats::from_set(&stats);
        assert_eq!(effective.get(StatKind::Health), 400);
        assert_eq!(effective.get(StatKind::MinDamage), 12);
        assert_eq!(effective.get(StatKind::MaxDamage), 30);
        assert_eq!(effective.get(StatKind::Mana), 0);

        stats.set(StatKind::Health, 0);
        let effective = EffectiveStats::from_set(&stats);
        assert_eq!(effective.get(StatKind::Health), 0);
    }
}
