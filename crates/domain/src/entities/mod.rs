//! Domain entities - the character record and its nested definitions

mod character;

pub use character::{
    CharacterClass, CharacterRecord, ClassDefinition, DamageDice, DefinitionRef, InventoryItem,
    ItemDefinition, ItemKind, ItemProperty, NamedDefinition, ProficiencyGrant, RaceEntry,
    RecordId, StatEntry, ARMOR_TYPE_SHIELD, ATTACK_TYPE_RANGED, SAVING_THROW_MODIFIERS,
    SKILL_MODIFIERS,
};
