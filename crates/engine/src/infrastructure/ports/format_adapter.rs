//! Export format port.

use async_trait::async_trait;
use sheetport_domain::{
    validate_capabilities, CharacterRecord, CompatibilityAnalysis, CompatibilityEngine,
    FormatCapability, ScoringWeights,
};

use super::error::AdapterError;
use super::types::{AdapterMetadata, ConversionResult};

/// One target schema a character can be exported to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormatAdapter: Send + Sync {
    fn metadata(&self) -> &AdapterMetadata;

    /// Declared support per feature. At most one entry per feature.
    fn supported_features(&self) -> Vec<FormatCapability>;

    /// Weights used by the default compatibility analysis.
    fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::default()
    }

    /// A capability list that declares a feature twice is an analysis failure.
    async fn analyze_compatibility(
        &self,
        character: &CharacterRecord,
    ) -> Result<CompatibilityAnalysis, AdapterError> {
        let capabilities = self.supported_features();
        validate_capabilities(&capabilities)
            .map_err(|err| AdapterError::analysis(&self.metadata().id, err))?;
        Ok(CompatibilityEngine::with_weights(self.scoring_weights())
            .generate_compatibility_analysis(character, &capabilities))
    }

    /// Id, name and at least one ability score are required.
    fn can_convert(&self, character: &CharacterRecord) -> bool {
        character.validate().is_ok()
    }

    /// Never panics; a failed precondition is reported in the result.
    async fn convert(&self, character: &CharacterRecord) -> ConversionResult;
}
