//! Spell slot calculation under the 5e multiclassing rules.
//!
//! Every class contributes an *effective caster level* (full = level,
//! half = level / 2, third = level / 3). The contributions are summed and
//! looked up in the single full-caster progression table. Warlock pact magic
//! never joins the shared pool; it is computed from the warlock's own level
//! into a separate table.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::classes::{ClassInfo, ClassKind, CasterType};

/// Highest spell level that has slots.
pub const MAX_SPELL_LEVEL: u8 = 9;

/// Highest class (and caster) level.
pub const MAX_CLASS_LEVEL: u8 = 20;

/// Slots per spell level (1st..9th) for caster levels 1..=20.
const FULL_CASTER_TABLE: [[u8; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Slot counts for spell levels 1 through 9.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SpellSlots([u8; 9]);

impl SpellSlots {
    /// All-zero table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from counts where index 0 is 1st level. Extra entries are ignored.
    pub fn from_counts(counts: &[u8]) -> Self {
        let mut slots = [0u8; 9];
        for (slot, count) in slots.iter_mut().zip(counts) {
            *slot = *count;
        }
        Self(slots)
    }

    /// Slots at `spell_level` (1..=9); 0 outside that range.
    pub fn get(&self, spell_level: u8) -> u8 {
        match spell_level {
            1..=MAX_SPELL_LEVEL => self.0[(spell_level - 1) as usize],
            _ => 0,
        }
    }

    /// Iterate `(spell_level, count)` for all nine levels.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(i, &count)| ((i + 1) as u8, count))
    }

    pub fn total(&self) -> u32 {
        self.0.iter().map(|&c| c as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Highest spell level with at least one slot.
    pub fn highest_level(&self) -> Option<u8> {
        self.iter()
            .filter(|(_, count)| *count > 0)
            .map(|(level, _)| level)
            .last()
    }
}

impl Serialize for SpellSlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(9))?;
        for (level, count) in self.iter() {
            map.serialize_entry(&level, &count)?;
        }
        map.end()
    }
}

/// How the shared slot pool was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalculationMethod {
    SingleClass,
    Multiclass,
    PactOnly,
    None,
}

/// Effective caster level sums by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CasterBreakdown {
    pub full_caster_levels: u32,
    pub half_caster_levels: u32,
    pub third_caster_levels: u32,
    /// Sum of the three, clamped to 0..=20. Warlock levels are never included.
    pub total_caster_level: u8,
    /// Classes whose caster type is not `none`. Warlock entries count once.
    pub caster_class_count: usize,
    pub is_multiclass: bool,
}

/// What a single class put into the shared pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassContribution {
    pub class_name: String,
    pub kind: ClassKind,
    pub level: u8,
    pub caster_type: CasterType,
    pub effective_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub contributions: Vec<ClassContribution>,
    pub method: CalculationMethod,
}

/// Result of [`calculate_spell_slots`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellSlotResult {
    /// Shared multiclass slot pool
    pub slots: SpellSlots,
    /// Warlock pact magic, populated only at the pact slot level
    pub pact_slots: SpellSlots,
    pub caster_breakdown: CasterBreakdown,
    pub debug_info: DebugInfo,
}

impl SpellSlotResult {
    pub fn has_pact_magic(&self) -> bool {
        !self.pact_slots.is_empty()
    }
}

/// Level used to index the shared table for one class.
///
/// Artificers round up; every other half caster rounds down.
pub fn effective_caster_level(caster_type: CasterType, kind: ClassKind, level: u8) -> u8 {
    let level = level.min(MAX_CLASS_LEVEL);
    match caster_type {
        CasterType::Full => level,
        CasterType::Half if kind == ClassKind::Artificer => level.div_ceil(2),
        CasterType::Half => level / 2,
        CasterType::Third => level / 3,
        CasterType::Pact | CasterType::None => 0,
    }
}

/// Standard progression lookup. Level 0 is all zeros; levels above 20 use row 20.
pub fn full_caster_slots(caster_level: u8) -> SpellSlots {
    match caster_level {
        0 => SpellSlots::empty(),
        level => SpellSlots(FULL_CASTER_TABLE[(level.min(MAX_CLASS_LEVEL) - 1) as usize]),
    }
}

/// Warlock pact magic for a warlock level: fewer slots, all at one (higher) level.
pub fn pact_magic_slots(warlock_level: u8) -> SpellSlots {
    let (count, slot_level) = match warlock_level.min(MAX_CLASS_LEVEL) {
        1 => (1, 1),
        2 => (2, 1),
        3..=4 => (2, 2),
        5..=6 => (2, 3),
        7..=8 => (2, 4),
        9..=10 => (2, 5),
        11..=16 => (3, 5),
        17..=20 => (4, 5),
        _ => return SpellSlots::empty(),
    };

    let mut slots = [0u8; 9];
    slots[slot_level - 1] = count;
    SpellSlots(slots)
}

/// Compute the shared and pact slot pools for a set of classes.
///
/// Never fails: unknown classes and out-of-range levels contribute nothing
/// or are clamped. See [`validate_class_info`] for the matching warnings.
pub fn calculate_spell_slots(classes: &[ClassInfo]) -> SpellSlotResult {
    let mut breakdown = CasterBreakdown::default();
    let mut contributions = Vec::with_capacity(classes.len());
    let mut warlock_levels: u32 = 0;

    for class in classes {
        let level = class.clamped_level();
        let caster_type = class.caster_type();
        let effective_level = effective_caster_level(caster_type, class.kind(), level);

        match caster_type {
            CasterType::Full => breakdown.full_caster_levels += effective_level as u32,
            CasterType::Half => breakdown.half_caster_levels += effective_level as u32,
            CasterType::Third => breakdown.third_caster_levels += effective_level as u32,
            CasterType::Pact => warlock_levels += level as u32,
            CasterType::None => {}
        }

        contributions.push(ClassContribution {
            class_name: class.name().to_string(),
            kind: class.kind(),
            level,
            caster_type,
            effective_level,
        });
    }

    let total = breakdown.full_caster_levels
        + breakdown.half_caster_levels
        + breakdown.third_caster_levels;
    breakdown.total_caster_level = total.min(MAX_CLASS_LEVEL as u32) as u8;

    let slot_casters = classes
        .iter()
        .filter(|c| c.caster_type().is_caster() && c.caster_type() != CasterType::Pact)
        .count();
    let has_pact = classes.iter().any(|c| c.caster_type() == CasterType::Pact);
    breakdown.caster_class_count = slot_casters + usize::from(has_pact);
    breakdown.is_multiclass = breakdown.caster_class_count > 1;

    let method = match (slot_casters, has_pact) {
        (0, false) => CalculationMethod::None,
        (0, true) => CalculationMethod::PactOnly,
        (1, false) => CalculationMethod::SingleClass,
        _ => CalculationMethod::Multiclass,
    };

    let pact_level = warlock_levels.min(MAX_CLASS_LEVEL as u32) as u8;

    SpellSlotResult {
        slots: full_caster_slots(breakdown.total_caster_level),
        pact_slots: pact_magic_slots(pact_level),
        caster_breakdown: breakdown,
        debug_info: DebugInfo {
            contributions,
            method,
        },
    }
}

/// Slot table for a single class at a level.
///
/// Warlocks return their pact table; everything else the shared table at the
/// class's effective level.
pub fn single_class_spell_slots(class_name: &str, level: i32) -> SpellSlots {
    let class = ClassInfo::new(class_name, level);
    match class.caster_type() {
        CasterType::Pact => pact_magic_slots(class.clamped_level()),
        caster_type => full_caster_slots(effective_caster_level(
            caster_type,
            class.kind(),
            class.clamped_level(),
        )),
    }
}

/// Non-fatal problems with class input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassInfoWarning {
    #[error("Class entry {index} has no name")]
    MissingName { index: usize },

    #[error("{class} level {level} is outside 1-20 and will be clamped")]
    LevelOutOfRange { class: String, level: i32 },

    #[error("Unknown class '{class}' is treated as a non-caster")]
    UnknownClass { class: String },

    #[error("{class} level {level} has no subclass; assuming non-caster")]
    MissingSubclass { class: String, level: i32 },

    #[error("{class} uses the spellless variant and is treated as a non-caster")]
    SpelllessVariant { class: String },
}

/// Advisory checks on class input. Never blocks the calculation.
pub fn validate_class_info(classes: &[ClassInfo]) -> Vec<ClassInfoWarning> {
    let mut warnings = Vec::new();

    for (index, class) in classes.iter().enumerate() {
        let name = class.name().trim();
        if name.is_empty() {
            warnings.push(ClassInfoWarning::MissingName { index });
        } else if class.kind() == ClassKind::Other {
            warnings.push(ClassInfoWarning::UnknownClass {
                class: name.to_string(),
            });
        }

        if !(1..=MAX_CLASS_LEVEL as i32).contains(&class.level()) {
            warnings.push(ClassInfoWarning::LevelOutOfRange {
                class: name.to_string(),
                level: class.level(),
            });
        }

        // Subclass choice at 3rd level decides whether these classes cast at all
        let needs_subclass = matches!(class.kind(), ClassKind::Fighter | ClassKind::Rogue);
        if needs_subclass && class.level() >= 3 && class.subclass().is_none() {
            warnings.push(ClassInfoWarning::MissingSubclass {
                class: name.to_string(),
                level: class.level(),
            });
        }

        if class.kind() == ClassKind::Ranger && class.caster_type() == CasterType::None {
            warnings.push(ClassInfoWarning::SpelllessVariant {
                class: name.to_string(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard(level: i32) -> ClassInfo {
        ClassInfo::new("Wizard", level)
    }

    #[test]
    fn empty_input_is_all_zero() {
        let result = calculate_spell_slots(&[]);
        assert!(result.slots.is_empty());
        assert!(result.pact_slots.is_empty());
        assert_eq!(result.caster_breakdown.total_caster_level, 0);
        assert_eq!(result.caster_breakdown.caster_class_count, 0);
        assert!(!result.caster_breakdown.is_multiclass);
        assert_eq!(result.debug_info.method, CalculationMethod::None);
    }

    #[test]
    fn single_full_caster_matches_table() {
        let result = calculate_spell_slots(&[wizard(5)]);
        assert_eq!(result.slots, SpellSlots::from_counts(&[4, 3, 2]));
        assert_eq!(result.slots.get(4), 0);
        assert_eq!(result.caster_breakdown.total_caster_level, 5);
        assert!(!result.caster_breakdown.is_multiclass);
        assert_eq!(result.debug_info.method, CalculationMethod::SingleClass);

        for level in 1..=20 {
            assert_eq!(
                calculate_spell_slots(&[wizard(level)]).slots,
                full_caster_slots(level as u8)
            );
        }
    }

    #[test]
    fn level_twenty_has_full_spread() {
        let slots = full_caster_slots(20);
        assert_eq!(slots, SpellSlots::from_counts(&[4, 3, 3, 3, 3, 2, 2, 1, 1]));
        assert_eq!(slots.highest_level(), Some(9));
    }

    #[test]
    fn half_caster_uses_half_level() {
        let result = calculate_spell_slots(&[ClassInfo::new("Paladin", 6)]);
        assert_eq!(result.slots, SpellSlots::from_counts(&[4, 2]));
        assert_eq!(result.caster_breakdown.half_caster_levels, 3);

        // Level 1 paladin has no slots yet
        assert!(calculate_spell_slots(&[ClassInfo::new("Paladin", 1)])
            .slots
            .is_empty());
    }

    #[test]
    fn artificer_rounds_up() {
        assert_eq!(
            effective_caster_level(CasterType::Half, ClassKind::Artificer, 1),
            1
        );
        assert_eq!(
            effective_caster_level(CasterType::Half, ClassKind::Artificer, 5),
            3
        );
        assert_eq!(
            effective_caster_level(CasterType::Half, ClassKind::Paladin, 5),
            2
        );

        let result = calculate_spell_slots(&[ClassInfo::new("Artificer", 1)]);
        assert_eq!(result.slots, SpellSlots::from_counts(&[2]));

        let result = calculate_spell_slots(&[ClassInfo::new("Artificer", 5)]);
        assert_eq!(result.slots, full_caster_slots(3));
    }

    #[test]
    fn third_caster_threshold() {
        let ek3 = ClassInfo::new("Fighter", 3).with_subclass("Eldritch Knight");
        assert_eq!(
            calculate_spell_slots(&[ek3]).slots,
            SpellSlots::from_counts(&[2])
        );

        let ek2 = ClassInfo::new("Fighter", 2).with_subclass("Eldritch Knight");
        let result = calculate_spell_slots(&[ek2]);
        assert!(result.slots.is_empty());
        // Still a caster class even with zero contribution
        assert_eq!(result.caster_breakdown.caster_class_count, 1);
    }

    #[test]
    fn multiclass_contributions_add_up() {
        let result = calculate_spell_slots(&[wizard(3), ClassInfo::new("Cleric", 2)]);
        assert_eq!(result.slots, calculate_spell_slots(&[wizard(5)]).slots);
        assert_eq!(result.caster_breakdown.total_caster_level, 5);
        assert_eq!(result.caster_breakdown.full_caster_levels, 5);
        assert_eq!(result.caster_breakdown.caster_class_count, 2);
        assert!(result.caster_breakdown.is_multiclass);
        assert_eq!(result.debug_info.method, CalculationMethod::Multiclass);
        assert_eq!(result.debug_info.contributions.len(), 2);
    }

    #[test]
    fn mixed_caster_types_use_one_table() {
        // Paladin 4 (2) + Rogue AT 6 (2) + Sorcerer 1 (1) = 5
        let classes = [
            ClassInfo::new("Paladin", 4),
            ClassInfo::new("Rogue", 6).with_subclass("Arcane Trickster"),
            ClassInfo::new("Sorcerer", 1),
        ];
        let result = calculate_spell_slots(&classes);
        assert_eq!(result.caster_breakdown.half_caster_levels, 2);
        assert_eq!(result.caster_breakdown.third_caster_levels, 2);
        assert_eq!(result.caster_breakdown.total_caster_level, 5);
        assert_eq!(result.slots, full_caster_slots(5));
    }

    #[test]
    fn pact_magic_is_excluded_from_shared_pool() {
        let classes = [ClassInfo::new("Warlock", 5), ClassInfo::new("Sorcerer", 2)];
        let result = calculate_spell_slots(&classes);

        let sorcerer_only = calculate_spell_slots(&[ClassInfo::new("Sorcerer", 2)]);
        assert_eq!(result.slots, sorcerer_only.slots);
        assert_eq!(result.caster_breakdown.total_caster_level, 2);
        assert_eq!(result.pact_slots, SpellSlots::from_counts(&[0, 0, 2]));
        assert!(result.caster_breakdown.is_multiclass);
        assert_eq!(result.caster_breakdown.caster_class_count, 2);
        assert!(result.has_pact_magic());
    }

    #[test]
    fn pact_only_characters() {
        let result = calculate_spell_slots(&[ClassInfo::new("Warlock", 11)]);
        assert!(result.slots.is_empty());
        assert_eq!(result.pact_slots.get(5), 3);
        assert_eq!(result.pact_slots.total(), 3);
        assert!(!result.caster_breakdown.is_multiclass);
        assert_eq!(result.debug_info.method, CalculationMethod::PactOnly);
    }

    #[test]
    fn split_warlock_entries_are_one_pact_caster() {
        let result = calculate_spell_slots(&[
            ClassInfo::new("Warlock", 3),
            ClassInfo::new("Warlock", 4),
        ]);
        assert_eq!(result.caster_breakdown.caster_class_count, 1);
        assert!(!result.caster_breakdown.is_multiclass);
        assert_eq!(result.debug_info.method, CalculationMethod::PactOnly);
        // Levels are summed before the pact table lookup
        assert_eq!(result.pact_slots, pact_magic_slots(7));
    }

    #[test]
    fn pact_tiers() {
        assert_eq!(pact_magic_slots(0), SpellSlots::empty());
        assert_eq!(pact_magic_slots(1), SpellSlots::from_counts(&[1]));
        assert_eq!(pact_magic_slots(2), SpellSlots::from_counts(&[2]));
        assert_eq!(pact_magic_slots(4).get(2), 2);
        assert_eq!(pact_magic_slots(10).get(5), 2);
        assert_eq!(pact_magic_slots(16).get(5), 3);
        assert_eq!(pact_magic_slots(17).get(5), 4);
        assert_eq!(pact_magic_slots(20).get(5), 4);
        for level in 1..=20 {
            assert_eq!(pact_magic_slots(level).iter().filter(|(_, c)| *c > 0).count(), 1);
        }
    }

    #[test]
    fn levels_above_twenty_clamp() {
        assert_eq!(
            single_class_spell_slots("wizard", 25),
            single_class_spell_slots("wizard", 20)
        );
        let result = calculate_spell_slots(&[wizard(15), ClassInfo::new("Cleric", 15)]);
        assert_eq!(result.caster_breakdown.total_caster_level, 20);
        assert_eq!(result.slots, full_caster_slots(20));
    }

    #[test]
    fn zero_and_negative_levels_contribute_nothing() {
        let result = calculate_spell_slots(&[wizard(0), ClassInfo::new("Cleric", -4)]);
        assert!(result.slots.is_empty());
        assert_eq!(result.caster_breakdown.total_caster_level, 0);
    }

    #[test]
    fn non_casters_degrade_silently() {
        let classes = [
            ClassInfo::new("Ranger", 8).with_subclass("spellless"),
            ClassInfo::new("Fighter", 10).with_subclass("Champion"),
            ClassInfo::new("Mystery Class", 7),
        ];
        let result = calculate_spell_slots(&classes);
        assert!(result.slots.is_empty());
        assert_eq!(result.caster_breakdown.caster_class_count, 0);
        assert_eq!(result.debug_info.method, CalculationMethod::None);
    }

    #[test]
    fn single_class_lookup() {
        assert_eq!(
            single_class_spell_slots("Paladin", 6),
            SpellSlots::from_counts(&[4, 2])
        );
        assert_eq!(single_class_spell_slots("warlock", 5).get(3), 2);
        assert!(single_class_spell_slots("barbarian", 20).is_empty());
    }

    #[test]
    fn slot_accessors_reject_out_of_range_levels() {
        let slots = full_caster_slots(20);
        assert_eq!(slots.get(0), 0);
        assert_eq!(slots.get(10), 0);
        assert_eq!(slots.iter().count(), 9);
        assert_eq!(slots.total(), 22);
    }

    #[test]
    fn slots_serialize_as_level_map() {
        let json = serde_json::to_value(full_caster_slots(3)).unwrap();
        assert_eq!(json["1"], 4);
        assert_eq!(json["2"], 2);
        assert_eq!(json["9"], 0);
        assert_eq!(json.as_object().map(|o| o.len()), Some(9));
    }

    #[test]
    fn validation_warns_without_blocking() {
        let classes = [
            ClassInfo::new("", 3),
            ClassInfo::new("Wizard", 25),
            ClassInfo::new("Fighter", 5),
            ClassInfo::new("Ranger", 4).with_subclass("Spellless"),
            ClassInfo::new("Blood Hunter", 2),
        ];
        let warnings = validate_class_info(&classes);

        assert!(warnings.contains(&ClassInfoWarning::MissingName { index: 0 }));
        assert!(warnings.contains(&ClassInfoWarning::LevelOutOfRange {
            class: "Wizard".to_string(),
            level: 25,
        }));
        assert!(warnings.contains(&ClassInfoWarning::MissingSubclass {
            class: "Fighter".to_string(),
            level: 5,
        }));
        assert!(warnings.contains(&ClassInfoWarning::SpelllessVariant {
            class: "Ranger".to_string(),
        }));
        assert!(warnings.contains(&ClassInfoWarning::UnknownClass {
            class: "Blood Hunter".to_string(),
        }));

        // Calculation still proceeds with the same input
        let result = calculate_spell_slots(&classes);
        assert_eq!(result.slots, full_caster_slots(20));
    }

    #[test]
    fn valid_input_has_no_warnings() {
        let classes = [
            wizard(5),
            ClassInfo::new("Fighter", 3).with_subclass("Eldritch Knight"),
            ClassInfo::new("Rogue", 2),
        ];
        assert!(validate_class_info(&classes).is_empty());
    }
}
