//! Conversion use case - rank formats for a character and export it.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use sheetport_domain::{validate_class_info, CharacterRecord, CompatibilityAnalysis};

use crate::infrastructure::export::{FormatAdapterRegistry, RankedAdapter};
use crate::infrastructure::ports::{
    AdapterMetadata, ClassifiedConversionError, ConversionFailure, ConversionResult, ErrorCode,
    FormatAdapter, PerformanceMetrics, Severity,
};

/// A finished conversion and the analysis it was chosen with.
#[derive(Debug, Clone)]
pub struct Export {
    pub adapter: AdapterMetadata,
    pub compatibility: CompatibilityAnalysis,
    pub result: ConversionResult,
}

impl Export {
    /// `<character>.<ext>`, with the name reduced to a safe file stem.
    pub fn file_name(&self, character: &CharacterRecord) -> String {
        format!(
            "{}.{}",
            file_stem(character.display_name()),
            self.adapter.file_extension
        )
    }

    /// Write the document into `dir`. Returns the written path.
    pub fn write_to(&self, dir: &Path, character: &CharacterRecord) -> std::io::Result<PathBuf> {
        let data = self.result.data.as_deref().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "conversion produced no document",
            )
        })?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(character));
        std::fs::write(&path, data)?;
        Ok(path)
    }
}

/// Orchestrates ranking and conversion over a registry.
pub struct ConversionService {
    registry: Arc<FormatAdapterRegistry>,
}

impl ConversionService {
    pub fn new(registry: Arc<FormatAdapterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatAdapterRegistry {
        &self.registry
    }

    pub async fn rank(&self, character: &CharacterRecord) -> Vec<RankedAdapter> {
        self.registry.get_adapters_by_compatibility(character).await
    }

    /// Convert with a specific adapter.
    ///
    /// An unknown id is an `UnsupportedFormat` error; adapter failures are
    /// reported in the returned [`Export`].
    pub async fn convert_with(
        &self,
        adapter_id: &str,
        character: &CharacterRecord,
    ) -> Result<Export, ClassifiedConversionError> {
        let adapter = self
            .registry
            .get_adapter(adapter_id)
            .ok_or_else(|| ClassifiedConversionError::unsupported_format(adapter_id))?;

        let compatibility = match adapter.analyze_compatibility(character).await {
            Ok(analysis) => analysis,
            Err(err) => {
                tracing::warn!(
                    adapter_id = %adapter_id,
                    error = %err,
                    "Compatibility analysis failed"
                );
                CompatibilityAnalysis::failed()
            }
        };

        Ok(self.run(adapter, compatibility, character).await)
    }

    /// Convert with the best ranked adapter scoring at least `min_score`.
    pub async fn convert_best(
        &self,
        character: &CharacterRecord,
        min_score: u8,
    ) -> Result<Export, ClassifiedConversionError> {
        let best = self
            .rank(character)
            .await
            .into_iter()
            .find(|r| r.compatibility.score >= min_score)
            .ok_or_else(|| {
                ClassifiedConversionError::new(
                    ErrorCode::UnsupportedFormat,
                    Severity::Warning,
                    format!("No export format scores at least {}", min_score),
                )
            })?;

        tracing::debug!(
            adapter_id = %best.id(),
            score = best.compatibility.score,
            "Selected export format"
        );
        Ok(self.run(best.adapter, best.compatibility, character).await)
    }

    async fn run(
        &self,
        adapter: Arc<dyn FormatAdapter>,
        compatibility: CompatibilityAnalysis,
        character: &CharacterRecord,
    ) -> Export {
        let metadata = adapter.metadata().clone();
        let started = Instant::now();

        let result = AssertUnwindSafe(async { adapter.convert(character).await })
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                ConversionResult::failure(ConversionFailure::raw(format!(
                    "{} adapter panicked during conversion",
                    metadata.id
                )))
            });

        let mut result = result.with_warnings(warnings_for(character, &compatibility));
        result.error = result
            .error
            .take()
            .map(|err| ConversionFailure::Classified(err.classify()));

        let conversion_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let data_size = result.data_size();
        let result = result.with_performance(PerformanceMetrics {
            conversion_time_ms,
            data_size,
        });

        match &result.error {
            None => tracing::info!(
                adapter_id = %metadata.id,
                character = %character.display_name(),
                conversion_time_ms,
                data_size,
                "Conversion complete"
            ),
            Some(err) => tracing::warn!(
                adapter_id = %metadata.id,
                character = %character.display_name(),
                error = %err,
                "Conversion failed"
            ),
        }

        Export {
            adapter: metadata,
            compatibility,
            result,
        }
    }
}

/// Class-info warnings first, then the format's limitations.
fn warnings_for(character: &CharacterRecord, compatibility: &CompatibilityAnalysis) -> Vec<String> {
    let mut warnings: Vec<String> = validate_class_info(&character.class_infos())
        .into_iter()
        .map(|w| {
            tracing::warn!(warning = %w, "Class info warning");
            w.to_string()
        })
        .collect();
    for limitation in &compatibility.limitations {
        if !warnings.contains(limitation) {
            warnings.push(limitation.clone());
        }
    }
    warnings
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "character".to_string()
    } else {
        stem.to_string()
    }
}
