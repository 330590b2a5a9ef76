//! Ability value objects - the six D&D 5e ability scores and their modifiers.
//!
//! Provides type safety for ability references instead of magic strings like "STR", "DEX".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// One of the six ability scores.
///
/// The numeric source id (1 = Strength .. 6 = Charisma) matches the order
/// used by character records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ability {
    /// Strength - physical power
    Str,
    /// Dexterity - agility and reflexes
    Dex,
    /// Constitution - endurance and health
    Con,
    /// Intelligence - reasoning and memory
    Int,
    /// Wisdom - perception and insight
    Wis,
    /// Charisma - force of personality
    Cha,
}

impl Ability {
    /// All six abilities in record order.
    pub const ALL: [Ability; 6] = [
        Self::Str,
        Self::Dex,
        Self::Con,
        Self::Int,
        Self::Wis,
        Self::Cha,
    ];

    /// Returns the short uppercase string representation (e.g., "STR", "DEX").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }

    /// Lower-case three letter key used by most VTT schemas ("str", "dex", ...).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Dex => "dex",
            Self::Con => "con",
            Self::Int => "int",
            Self::Wis => "wis",
            Self::Cha => "cha",
        }
    }

    /// Returns the full name of the ability (e.g., "Strength", "Dexterity").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }

    /// Map a record stat id (1..=6) to an ability.
    pub fn from_source_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Str),
            2 => Some(Self::Dex),
            3 => Some(Self::Con),
            4 => Some(Self::Int),
            5 => Some(Self::Wis),
            6 => Some(Self::Cha),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Str => 0,
            Self::Dex => 1,
            Self::Con => 2,
            Self::Int => 3,
            Self::Wis => 4,
            Self::Cha => 5,
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STR" | "STRENGTH" => Ok(Self::Str),
            "DEX" | "DEXTERITY" => Ok(Self::Dex),
            "CON" | "CONSTITUTION" => Ok(Self::Con),
            "INT" | "INTELLIGENCE" => Ok(Self::Int),
            "WIS" | "WISDOM" => Ok(Self::Wis),
            "CHA" | "CHARISMA" => Ok(Self::Cha),
            _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
        }
    }
}

/// Ability modifier for a score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    // Integer division truncates toward zero; div_euclid floors for a positive divisor.
    score.saturating_sub(10).div_euclid(2)
}

/// The six ability scores of a character.
///
/// Scores missing from the source record are tracked as absent and read
/// back as 10 (modifier +0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    scores: [Option<i32>; 6],
}

impl AbilityScores {
    /// Score used when the record has no value for an ability.
    pub const DEFAULT_SCORE: i32 = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        self.set(ability, score);
        self
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        self.scores[ability.index()] = Some(score);
    }

    /// The recorded score, if any.
    pub fn get(&self, ability: Ability) -> Option<i32> {
        self.scores[ability.index()]
    }

    /// The score, defaulting to 10 when absent.
    pub fn score(&self, ability: Ability) -> i32 {
        self.get(ability).unwrap_or(Self::DEFAULT_SCORE)
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.score(ability))
    }

    /// Number of abilities with a recorded score.
    pub fn count_present(&self) -> usize {
        self.scores.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count_present() == 0
    }

    /// Iterate `(ability, score)` for all six abilities, absent ones as 10.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.iter().map(move |a| (*a, self.score(*a)))
    }
}

/// Proficiency level for skills and saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProficiencyLevel {
    /// Not proficient
    #[default]
    None,
    /// Half proficiency (Jack of All Trades, etc.)
    Half,
    /// Standard proficiency
    Proficient,
    /// Expertise (double proficiency)
    Expert,
}

impl ProficiencyLevel {
    /// Bonus contributed at the given proficiency bonus.
    ///
    /// Half proficiency rounds down.
    pub fn apply(&self, proficiency_bonus: i32) -> i32 {
        match self {
            Self::None => 0,
            Self::Half => proficiency_bonus / 2,
            Self::Proficient => proficiency_bonus,
            Self::Expert => proficiency_bonus * 2,
        }
    }

    /// Numeric multiplier as used by VTT schemas (0, 0.5, 1, 2).
    pub fn multiplier(&self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Half => 0.5,
            Self::Proficient => 1.0,
            Self::Expert => 2.0,
        }
    }

    /// Parse a record grant type ("proficiency", "expertise", "half-proficiency").
    pub fn from_grant_type(grant: &str) -> Option<Self> {
        match grant.trim().to_lowercase().as_str() {
            "proficiency" => Some(Self::Proficient),
            "expertise" => Some(Self::Expert),
            "half-proficiency" | "half_proficiency" => Some(Self::Half),
            _ => None,
        }
    }
}
