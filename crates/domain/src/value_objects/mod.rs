//! Value objects - Immutable objects defined by their attributes

mod ability;

pub use ability::{ability_modifier, Ability, AbilityScores, ProficiencyLevel};
