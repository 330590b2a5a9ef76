//! Lossless JSON export: the source record plus every derived value.

use async_trait::async_trait;
use serde_json::{json, Value};
use sheetport_domain::{
    CharacterRecord, CompatibilityAnalysis, DerivedStats, Feature, FormatCapability,
};

use super::document::{rejected, render_json};
use crate::infrastructure::config::ExportOptions;
use crate::infrastructure::ports::{AdapterError, AdapterMetadata, ConversionResult, FormatAdapter};

const FORMAT_TAG: &str = "sheetport-generic";
const FORMAT_VERSION: u8 = 1;

pub struct GenericJsonAdapter {
    metadata: AdapterMetadata,
    options: ExportOptions,
}

impl GenericJsonAdapter {
    pub const ID: &'static str = "generic_json";

    pub fn new(options: ExportOptions) -> Self {
        Self {
            metadata: AdapterMetadata::new(
                Self::ID,
                "Generic JSON",
                "Complete character record with derived statistics",
                "1.0.0",
                "json",
                "application/json",
            ),
            options,
        }
    }

    pub fn build_document(&self, character: &CharacterRecord) -> Result<Value, AdapterError> {
        Ok(json!({
            "format": FORMAT_TAG,
            "version": FORMAT_VERSION,
            "character": serde_json::to_value(character)?,
            "derived": serde_json::to_value(DerivedStats::from_record(character))?,
        }))
    }
}

#[async_trait]
impl FormatAdapter for GenericJsonAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    fn supported_features(&self) -> Vec<FormatCapability> {
        Feature::ALL.iter().copied().map(FormatCapability::full).collect()
    }

    /// The record is carried verbatim, so nothing is ever lost.
    async fn analyze_compatibility(
        &self,
        _character: &CharacterRecord,
    ) -> Result<CompatibilityAnalysis, AdapterError> {
        Ok(CompatibilityAnalysis::lossless(self.supported_features()))
    }

    async fn convert(&self, character: &CharacterRecord) -> ConversionResult {
        if !self.can_convert(character) {
            return rejected(Self::ID, character);
        }
        self.build_document(character)
            .and_then(|doc| render_json(&doc, &self.options))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::characters;
    use sheetport_domain::Recommendation;

    fn adapter() -> GenericJsonAdapter {
        GenericJsonAdapter::new(ExportOptions::default())
    }

    #[tokio::test]
    async fn always_lossless() {
        for character in characters::all() {
            let analysis = adapter().analyze_compatibility(&character).await.unwrap();
            assert_eq!(analysis.score, 100);
            assert_eq!(analysis.data_loss, 0);
            assert_eq!(analysis.recommendation, Recommendation::Excellent);
            assert!(analysis.limitations.is_empty());
        }
    }

    #[tokio::test]
    async fn document_round_trips_the_record() {
        let character = characters::fighter_wizard();
        let result = adapter().convert(&character).await;
        assert!(result.success);

        let doc: Value = serde_json::from_str(result.data.as_deref().unwrap()).unwrap();
        assert_eq!(doc["format"], FORMAT_TAG);
        let back: CharacterRecord = serde_json::from_value(doc["character"].clone()).unwrap();
        assert_eq!(back, character);
        assert_eq!(doc["derived"]["spellSlots"]["slots"]["1"], 4);
    }

    #[tokio::test]
    async fn still_requires_a_valid_record() {
        let result = adapter().convert(&characters::nameless()).await;
        assert!(!result.success);
    }
}
