//! Weighted compatibility scoring and data-loss estimation.
//!
//! The score is weighted by feature category and complexity. Data loss is a
//! plain ratio of present features the format cannot hold at all. The two
//! measures are computed independently and need not agree.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::features::{
    analyze_features, complexity_profile, Complexity, Feature, FeatureAnalysis, FeatureCategory,
};
use crate::entities::CharacterRecord;
use crate::error::DomainError;

/// How much of a feature a format can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Full,
    Partial,
    None,
}

/// A format's declared support for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCapability {
    pub feature: Feature,
    pub support: SupportLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

impl FormatCapability {
    pub fn full(feature: Feature) -> Self {
        Self {
            feature,
            support: SupportLevel::Full,
            limitations: None,
            impact: None,
        }
    }

    pub fn partial(feature: Feature, limitations: impl Into<String>) -> Self {
        Self {
            feature,
            support: SupportLevel::Partial,
            limitations: Some(limitations.into()),
            impact: None,
        }
    }

    pub fn none(feature: Feature) -> Self {
        Self {
            feature,
            support: SupportLevel::None,
            limitations: None,
            impact: None,
        }
    }

    pub fn with_impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = Some(impact.into());
        self
    }
}

/// Reject capability lists that declare a feature twice.
pub fn validate_capabilities(capabilities: &[FormatCapability]) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for capability in capabilities {
        if !seen.insert(capability.feature) {
            return Err(DomainError::validation(format!(
                "Capability '{}' declared more than once",
                capability.feature
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Recommendation {
    /// Bands: >= 90 excellent, >= 75 good, >= 60 fair, else poor.
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            75..=89 => Self::Good,
            60..=74 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

/// Scored match of a character against one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityAnalysis {
    /// 0..=100
    pub score: u8,
    pub capabilities: Vec<FormatCapability>,
    pub recommendation: Recommendation,
    pub limitations: Vec<String>,
    /// Percentage of present features that would be dropped, 0..=100
    pub data_loss: u8,
}

impl CompatibilityAnalysis {
    /// Result substituted when an adapter cannot analyze a character.
    pub fn failed() -> Self {
        Self {
            score: 0,
            capabilities: Vec::new(),
            recommendation: Recommendation::Poor,
            limitations: vec!["Analysis failed".to_string()],
            data_loss: 100,
        }
    }

    /// Lossless result for formats that carry the whole record.
    pub fn lossless(capabilities: Vec<FormatCapability>) -> Self {
        Self {
            score: 100,
            capabilities,
            recommendation: Recommendation::Excellent,
            limitations: Vec::new(),
            data_loss: 0,
        }
    }
}

/// Category weights, complexity multipliers and the partial-support factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub basic: f64,
    pub spells: f64,
    pub equipment: f64,
    pub features: f64,
    pub custom: f64,
    pub simple: f64,
    pub moderate: f64,
    pub complex: f64,
    pub partial_support: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            basic: 10.0,
            spells: 15.0,
            equipment: 10.0,
            features: 12.0,
            custom: 8.0,
            simple: 1.0,
            moderate: 1.2,
            complex: 1.5,
            partial_support: 0.6,
        }
    }
}

impl ScoringWeights {
    pub fn base(&self, category: FeatureCategory) -> f64 {
        match category {
            FeatureCategory::Basic => self.basic,
            FeatureCategory::Spells => self.spells,
            FeatureCategory::Equipment => self.equipment,
            FeatureCategory::Features => self.features,
            FeatureCategory::Custom => self.custom,
        }
    }

    pub fn multiplier(&self, complexity: Complexity) -> f64 {
        match complexity {
            Complexity::Simple => self.simple,
            Complexity::Moderate => self.moderate,
            Complexity::Complex => self.complex,
        }
    }

    pub fn weight(&self, feature: &FeatureAnalysis) -> f64 {
        self.base(feature.category) * self.multiplier(feature.complexity)
    }
}

/// Fixed advisories appended independently of per-capability limitations.
pub const MULTICLASS_ADVISORY: &str =
    "Multiclass characters may need manual review of class-specific features";
pub const HOMEBREW_ADVISORY: &str = "Homebrew content may not convert accurately";
pub const PACT_MAGIC_ADVISORY: &str =
    "Pact magic combined with other spellcasting may not be tracked separately";

/// Matches a character's features against a format's capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompatibilityEngine {
    weights: ScoringWeights,
}

impl CompatibilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn analyze_features(&self, record: &CharacterRecord) -> Vec<FeatureAnalysis> {
        analyze_features(record)
    }

    /// Weighted score 0..=100; 100 when nothing is present.
    pub fn calculate_compatibility_score(
        &self,
        features: &[FeatureAnalysis],
        capabilities: &[FormatCapability],
    ) -> u8 {
        let mut total = 0.0;
        let mut supported = 0.0;

        for feature in features.iter().filter(|f| f.present) {
            let weight = self.weights.weight(feature);
            total += weight;
            supported += match support_for(capabilities, feature.feature) {
                Some(SupportLevel::Full) => weight,
                Some(SupportLevel::Partial) => weight * self.weights.partial_support,
                Some(SupportLevel::None) | None => 0.0,
            };
        }

        if total <= 0.0 {
            return 100;
        }
        to_percentage(supported / total)
    }

    /// Unweighted share of present features with absent or `none` support.
    pub fn calculate_data_loss(
        &self,
        features: &[FeatureAnalysis],
        capabilities: &[FormatCapability],
    ) -> u8 {
        let present: Vec<_> = features.iter().filter(|f| f.present).collect();
        if present.is_empty() {
            return 0;
        }
        let lost = present
            .iter()
            .filter(|f| {
                matches!(
                    support_for(capabilities, f.feature),
                    None | Some(SupportLevel::None)
                )
            })
            .count();
        to_percentage(lost as f64 / present.len() as f64)
    }

    pub fn generate_compatibility_analysis(
        &self,
        record: &CharacterRecord,
        capabilities: &[FormatCapability],
    ) -> CompatibilityAnalysis {
        let features = self.analyze_features(record);
        let score = self.calculate_compatibility_score(&features, capabilities);
        let data_loss = self.calculate_data_loss(&features, capabilities);

        let mut limitations = Vec::new();
        for feature in features.iter().filter(|f| f.present) {
            let Some(capability) = capabilities.iter().find(|c| c.feature == feature.feature)
            else {
                continue;
            };
            match capability.support {
                SupportLevel::None => {
                    limitations.push(format!("{} not supported", feature.feature.display_name()))
                }
                SupportLevel::Partial => {
                    if let Some(text) = &capability.limitations {
                        limitations.push(text.clone());
                    }
                }
                SupportLevel::Full => {}
            }
        }

        let profile = complexity_profile(record);
        if profile.has_multiclass {
            limitations.push(MULTICLASS_ADVISORY.to_string());
        }
        if profile.has_homebrew_content {
            limitations.push(HOMEBREW_ADVISORY.to_string());
        }
        if profile.has_pact_magic && profile.has_multiple_spellcasting_classes {
            limitations.push(PACT_MAGIC_ADVISORY.to_string());
        }

        CompatibilityAnalysis {
            score,
            capabilities: capabilities.to_vec(),
            recommendation: Recommendation::from_score(score),
            limitations,
            data_loss,
        }
    }
}

fn support_for(capabilities: &[FormatCapability], feature: Feature) -> Option<SupportLevel> {
    capabilities
        .iter()
        .find(|c| c.feature == feature)
        .map(|c| c.support)
}

fn to_percentage(ratio: f64) -> u8 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn present(feature: Feature, complexity: Complexity) -> FeatureAnalysis {
        FeatureAnalysis::new(feature, true, complexity)
    }

    fn all_full() -> Vec<FormatCapability> {
        Feature::ALL.iter().map(|f| FormatCapability::full(*f)).collect()
    }

    fn record() -> CharacterRecord {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Quill",
            "stats": [{"id": 1, "value": 12}],
            "classes": [
                {"definition": {"name": "Warlock"}, "level": 2},
                {"definition": {"name": "Bard", "isHomebrew": true}, "level": 3}
            ],
            "inventory": [{"definition": {"name": "Wand of Sparks", "filterType": "Wand", "rarity": "Rare"}}]
        }))
        .unwrap()
    }

    #[test]
    fn recommendation_bands() {
        assert_eq!(Recommendation::from_score(100), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(90), Recommendation::Excellent);
        assert_eq!(Recommendation::from_score(89), Recommendation::Good);
        assert_eq!(Recommendation::from_score(75), Recommendation::Good);
        assert_eq!(Recommendation::from_score(74), Recommendation::Fair);
        assert_eq!(Recommendation::from_score(60), Recommendation::Fair);
        assert_eq!(Recommendation::from_score(59), Recommendation::Poor);
        assert_eq!(Recommendation::from_score(0), Recommendation::Poor);
    }

    #[test]
    fn no_present_features_is_fully_compatible() {
        let engine = CompatibilityEngine::new();
        let features = [FeatureAnalysis::new(Feature::Weapons, false, Complexity::Simple)];
        assert_eq!(engine.calculate_compatibility_score(&features, &[]), 100);
        assert_eq!(engine.calculate_data_loss(&features, &[]), 0);
    }

    #[test]
    fn all_full_support_scores_100() {
        let engine = CompatibilityEngine::new();
        let features = [
            present(Feature::Abilities, Complexity::Simple),
            present(Feature::Spellcasting, Complexity::Complex),
            present(Feature::HomebrewContent, Complexity::Complex),
        ];
        assert_eq!(engine.calculate_compatibility_score(&features, &all_full()), 100);
        assert_eq!(engine.calculate_data_loss(&features, &all_full()), 0);
    }

    #[test]
    fn scoring_is_idempotent() {
        let engine = CompatibilityEngine::new();
        let features = engine.analyze_features(&record());
        let caps = vec![
            FormatCapability::full(Feature::Abilities),
            FormatCapability::partial(Feature::Spellcasting, "Slots only"),
        ];
        let first = engine.calculate_compatibility_score(&features, &caps);
        let second = engine.calculate_compatibility_score(&features, &caps);
        assert_eq!(first, second);
    }

    #[test]
    fn weighted_score_arithmetic() {
        let engine = CompatibilityEngine::new();
        // abilities: 10 * 1.0 = 10 (full)
        // spellcasting: 15 * 1.5 = 22.5 (partial -> 13.5)
        // weapons: 10 * 1.2 = 12 (none)
        let features = [
            present(Feature::Abilities, Complexity::Simple),
            present(Feature::Spellcasting, Complexity::Complex),
            present(Feature::Weapons, Complexity::Moderate),
        ];
        let caps = [
            FormatCapability::full(Feature::Abilities),
            FormatCapability::partial(Feature::Spellcasting, "Pact slots merged"),
            FormatCapability::none(Feature::Weapons),
        ];
        // (10 + 13.5) / 44.5 = 52.8%
        assert_eq!(engine.calculate_compatibility_score(&features, &caps), 53);
        // 1 of 3 present features lost
        assert_eq!(engine.calculate_data_loss(&features, &caps), 33);
    }

    #[test]
    fn data_loss_is_unweighted_and_diverges_from_score() {
        let engine = CompatibilityEngine::new();
        // One heavy feature lost, one light feature kept
        let features = [
            present(Feature::Abilities, Complexity::Simple),
            present(Feature::Spellcasting, Complexity::Complex),
        ];
        let caps = [FormatCapability::full(Feature::Abilities)];
        // weighted: 10 / 32.5 = 31%, unweighted loss: 50%
        assert_eq!(engine.calculate_compatibility_score(&features, &caps), 31);
        assert_eq!(engine.calculate_data_loss(&features, &caps), 50);
        assert_ne!(
            100 - engine.calculate_compatibility_score(&features, &caps),
            engine.calculate_data_loss(&features, &caps)
        );
    }

    #[test]
    fn partial_support_counts_sixty_percent() {
        let engine = CompatibilityEngine::new();
        let features = [present(Feature::Feats, Complexity::Simple)];
        let caps = [FormatCapability::partial(Feature::Feats, "Names only")];
        assert_eq!(engine.calculate_compatibility_score(&features, &caps), 60);
        assert_eq!(engine.calculate_data_loss(&features, &caps), 0);
    }

    #[test]
    fn custom_weights_change_the_score() {
        let engine = CompatibilityEngine::with_weights(ScoringWeights {
            partial_support: 0.5,
            ..ScoringWeights::default()
        });
        let features = [present(Feature::Feats, Complexity::Simple)];
        let caps = [FormatCapability::partial(Feature::Feats, "Names only")];
        assert_eq!(engine.calculate_compatibility_score(&features, &caps), 50);
    }

    #[test]
    fn analysis_collects_limitations_and_advisories() {
        let engine = CompatibilityEngine::new();
        let caps = [
            FormatCapability::full(Feature::Abilities),
            FormatCapability::partial(Feature::Spellcasting, "Pact slots are merged"),
            FormatCapability::none(Feature::MagicItems),
            FormatCapability::none(Feature::Feats),
        ];
        let analysis = engine.generate_compatibility_analysis(&record(), &caps);

        assert!(analysis
            .limitations
            .contains(&"Pact slots are merged".to_string()));
        assert!(analysis
            .limitations
            .contains(&"Magic items not supported".to_string()));
        // Feats are not present, so no line for them
        assert!(!analysis.limitations.iter().any(|l| l.starts_with("Feats")));
        assert!(analysis
            .limitations
            .contains(&MULTICLASS_ADVISORY.to_string()));
        assert!(analysis.limitations.contains(&HOMEBREW_ADVISORY.to_string()));
        assert!(analysis
            .limitations
            .contains(&PACT_MAGIC_ADVISORY.to_string()));
        assert!(analysis.score <= 100);
        assert!(analysis.data_loss <= 100);
        assert_eq!(analysis.recommendation, Recommendation::from_score(analysis.score));
        assert_eq!(analysis.capabilities.len(), 4);
    }

    #[test]
    fn failed_analysis_shape() {
        let failed = CompatibilityAnalysis::failed();
        assert_eq!(failed.score, 0);
        assert_eq!(failed.recommendation, Recommendation::Poor);
        assert_eq!(failed.limitations, vec!["Analysis failed".to_string()]);
        assert_eq!(failed.data_loss, 100);
    }

    #[test]
    fn duplicate_capabilities_are_rejected() {
        let caps = [
            FormatCapability::full(Feature::Armor),
            FormatCapability::none(Feature::Armor),
        ];
        assert!(validate_capabilities(&caps).is_err());
        assert!(validate_capabilities(&all_full()).is_ok());
    }

    #[test]
    fn capability_json_shape() {
        let cap = FormatCapability::partial(Feature::MagicItems, "Charges are dropped")
            .with_impact("minor");
        let value = serde_json::to_value(&cap).unwrap();
        assert_eq!(value["feature"], "magic_items");
        assert_eq!(value["support"], "partial");
        assert_eq!(value["limitations"], "Charges are dropped");
        assert_eq!(value["impact"], "minor");
    }
}
