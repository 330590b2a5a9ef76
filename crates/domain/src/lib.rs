//! Sheetport domain: character records, 5e rules and format compatibility.
//!
//! Pure and synchronous. Export adapters and orchestration live in
//! `sheetport-engine`.

pub mod compatibility;
pub mod entities;
pub mod error;
pub mod game_systems;
pub mod value_objects;

pub use entities::{
    CharacterClass, CharacterRecord, ClassDefinition, DamageDice, DefinitionRef, InventoryItem,
    ItemDefinition, ItemKind, ItemProperty, NamedDefinition, ProficiencyGrant, RaceEntry,
    RecordId, StatEntry,
};

pub use error::DomainError;

pub use game_systems::{
    calculate_spell_slots, single_class_spell_slots, validate_class_info, xp_for_next_level,
    CalculationMethod, CasterBreakdown, CasterType, ClassInfo, ClassInfoWarning, ClassKind,
    DerivedStats, Skill, SpellSlotResult, SpellSlots,
};

pub use compatibility::{
    validate_capabilities, CompatibilityAnalysis, CompatibilityEngine, Complexity, Feature,
    FeatureAnalysis, FeatureCategory, FormatCapability, Recommendation, ScoringWeights,
    SupportLevel,
};

pub use value_objects::{ability_modifier, Ability, AbilityScores, ProficiencyLevel};
