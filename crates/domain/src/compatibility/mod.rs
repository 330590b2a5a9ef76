//! Compatibility analysis between a character and an export format.
//!
//! A character is broken down into [`Feature`]s, each tagged with a category
//! and a complexity. A format declares a [`FormatCapability`] per feature.
//! [`CompatibilityEngine`] combines the two into a weighted score, a
//! data-loss estimate and human readable limitations.

mod features;
mod scoring;

pub use features::{
    analyze_features, complexity_profile, Complexity, ComplexityProfile, Feature,
    FeatureAnalysis, FeatureCategory,
};
pub use scoring::{
    validate_capabilities, CompatibilityAnalysis, CompatibilityEngine, FormatCapability,
    Recommendation, ScoringWeights, SupportLevel, HOMEBREW_ADVISORY, MULTICLASS_ADVISORY,
    PACT_MAGIC_ADVISORY,
};
