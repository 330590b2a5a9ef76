//! D&D 5th Edition rules used by the exporters.
//!
//! - Class taxonomy and caster classification (`classes`)
//! - Multiclass and pact magic spell slots (`spell_slots`)
//! - Derived statistics: proficiency, skills, saves, HP, AC (`dnd5e`)

mod classes;
mod dnd5e;
mod spell_slots;

pub use classes::{
    normalize_subclass, CasterType, ClassInfo, ClassKind, ARCANE_TRICKSTER, ELDRITCH_KNIGHT,
    SPELLLESS,
};

pub use spell_slots::{
    calculate_spell_slots, effective_caster_level, full_caster_slots, pact_magic_slots,
    single_class_spell_slots, validate_class_info, CalculationMethod, CasterBreakdown,
    ClassContribution, ClassInfoWarning, DebugInfo, SpellSlotResult, SpellSlots,
    MAX_CLASS_LEVEL, MAX_SPELL_LEVEL,
};

pub use dnd5e::{
    armor_class, hit_dice_max_hp, proficiency_bonus, spell_attack_bonus, spell_save_dc,
    xp_for_next_level, DerivedStats, SavingThrowValue, Skill, SkillValue, SpellcastingStats,
};
