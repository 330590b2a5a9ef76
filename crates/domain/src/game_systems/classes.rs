//! Class canonicalization for D&D 5e.
//!
//! Source records name classes with free-form strings ("Wizard", " wizard ",
//! "Eldritch Knight"). Those strings are turned into [`ClassKind`] and a
//! normalized subclass key once, when a [`ClassInfo`] is built. Everything
//! downstream matches on enums.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::Ability;

/// The published 5e classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Artificer,
    Barbarian,
    Bard,
    Cleric,
    Druid,
    Fighter,
    Monk,
    Paladin,
    Ranger,
    Rogue,
    Sorcerer,
    Warlock,
    Wizard,
    /// Unrecognized or homebrew class
    Other,
}

impl ClassKind {
    /// Canonicalize a raw class name. Unknown names map to [`ClassKind::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "artificer" => Self::Artificer,
            "barbarian" => Self::Barbarian,
            "bard" => Self::Bard,
            "cleric" => Self::Cleric,
            "druid" => Self::Druid,
            "fighter" => Self::Fighter,
            "monk" => Self::Monk,
            "paladin" => Self::Paladin,
            "ranger" => Self::Ranger,
            "rogue" => Self::Rogue,
            "sorcerer" => Self::Sorcerer,
            "warlock" => Self::Warlock,
            "wizard" => Self::Wizard,
            _ => Self::Other,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Artificer => "Artificer",
            Self::Barbarian => "Barbarian",
            Self::Bard => "Bard",
            Self::Cleric => "Cleric",
            Self::Druid => "Druid",
            Self::Fighter => "Fighter",
            Self::Monk => "Monk",
            Self::Paladin => "Paladin",
            Self::Ranger => "Ranger",
            Self::Rogue => "Rogue",
            Self::Sorcerer => "Sorcerer",
            Self::Warlock => "Warlock",
            Self::Wizard => "Wizard",
            Self::Other => "Other",
        }
    }

    /// Hit die size for the class.
    pub fn hit_die(&self) -> u8 {
        match self {
            Self::Barbarian => 12,
            Self::Fighter | Self::Paladin | Self::Ranger => 10,
            Self::Artificer
            | Self::Bard
            | Self::Cleric
            | Self::Druid
            | Self::Monk
            | Self::Rogue
            | Self::Warlock => 8,
            Self::Sorcerer | Self::Wizard => 6,
            Self::Other => 8,
        }
    }

    /// Saving throws granted by the class at 1st level.
    pub fn saving_throws(&self) -> &'static [Ability] {
        match self {
            Self::Artificer => &[Ability::Con, Ability::Int],
            Self::Barbarian | Self::Fighter => &[Ability::Str, Ability::Con],
            Self::Bard => &[Ability::Dex, Ability::Cha],
            Self::Cleric | Self::Paladin | Self::Warlock => &[Ability::Wis, Ability::Cha],
            Self::Druid | Self::Wizard => &[Ability::Int, Ability::Wis],
            Self::Monk | Self::Ranger => &[Ability::Str, Ability::Dex],
            Self::Rogue => &[Ability::Dex, Ability::Int],
            Self::Sorcerer => &[Ability::Con, Ability::Cha],
            Self::Other => &[],
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Type of spellcaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterType {
    /// Full caster (Wizard, Cleric, Druid, Sorcerer, Bard)
    Full,
    /// Half caster (Paladin, Ranger, Artificer)
    Half,
    /// Third caster (Eldritch Knight, Arcane Trickster)
    Third,
    /// Pact magic (Warlock)
    Pact,
    /// No spellcasting progression
    None,
}

/// Subclass keys that change a class's caster type.
pub const ELDRITCH_KNIGHT: &str = "eldritch_knight";
pub const ARCANE_TRICKSTER: &str = "arcane_trickster";
pub const SPELLLESS: &str = "spellless";

impl CasterType {
    /// Classify a class/subclass pair.
    ///
    /// `subclass` must already be normalized with [`normalize_subclass`].
    pub fn classify(kind: ClassKind, subclass: Option<&str>) -> Self {
        match kind {
            ClassKind::Bard
            | ClassKind::Cleric
            | ClassKind::Druid
            | ClassKind::Sorcerer
            | ClassKind::Wizard => Self::Full,
            ClassKind::Paladin | ClassKind::Artificer => Self::Half,
            ClassKind::Ranger if subclass == Some(SPELLLESS) => Self::None,
            ClassKind::Ranger => Self::Half,
            ClassKind::Fighter if subclass == Some(ELDRITCH_KNIGHT) => Self::Third,
            ClassKind::Rogue if subclass == Some(ARCANE_TRICKSTER) => Self::Third,
            ClassKind::Warlock => Self::Pact,
            _ => Self::None,
        }
    }

    /// Whether the class has any spellcasting progression (pact included).
    pub fn is_caster(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Half => "half",
            Self::Third => "third",
            Self::Pact => "pact",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize a raw subclass name to a lower/underscore key
/// ("Eldritch Knight" -> "eldritch_knight"). Empty input gives `None`.
pub fn normalize_subclass(raw: &str) -> Option<String> {
    let key = raw
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// One class entry of a character, canonicalized.
///
/// `level` keeps the raw record value; consumers clamp it to 0..=20.
/// Only built through [`ClassInfo::new`], so `caster_type` always follows
/// the kind and subclass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    name: String,
    kind: ClassKind,
    level: i32,
    subclass: Option<String>,
    caster_type: CasterType,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, level: i32) -> Self {
        let name = name.into();
        let kind = ClassKind::from_name(&name);
        Self {
            caster_type: CasterType::classify(kind, None),
            name,
            kind,
            level,
            subclass: None,
        }
    }

    /// Set the subclass (normalized) and re-derive the caster type.
    pub fn with_subclass(mut self, subclass: &str) -> Self {
        self.subclass = normalize_subclass(subclass);
        self.caster_type = CasterType::classify(self.kind, self.subclass.as_deref());
        self
    }

    /// Set the subclass when one is present.
    pub fn with_optional_subclass(self, subclass: Option<&str>) -> Self {
        match subclass {
            Some(s) => self.with_subclass(s),
            None => self,
        }
    }

    /// The class name as given by the source record.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Level clamped to the playable range 0..=20.
    pub fn clamped_level(&self) -> u8 {
        self.level.clamp(0, 20) as u8
    }

    pub fn subclass(&self) -> Option<&str> {
        self.subclass.as_deref()
    }

    pub fn caster_type(&self) -> CasterType {
        self.caster_type
    }

    /// Spellcasting ability for this class, if it casts spells.
    pub fn spellcasting_ability(&self) -> Option<Ability> {
        match (self.caster_type, self.kind) {
            (CasterType::None, _) => None,
            (_, ClassKind::Wizard | ClassKind::Artificer) => Some(Ability::Int),
            (_, ClassKind::Fighter | ClassKind::Rogue) => Some(Ability::Int),
            (_, ClassKind::Cleric | ClassKind::Druid | ClassKind::Ranger) => Some(Ability::Wis),
            (_, ClassKind::Bard | ClassKind::Sorcerer | ClassKind::Paladin | ClassKind::Warlock) => {
                Some(Ability::Cha)
            }
            _ => None,
        }
    }
}
