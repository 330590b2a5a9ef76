//! Registry of export formats.
//!
//! Adapters are kept in registration order. Ranking clones the adapter
//! list before awaiting anything, so the lock is never held across an
//! `.await`.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures_util::future::join_all;
use futures_util::FutureExt;
use sheetport_domain::{CharacterRecord, CompatibilityAnalysis};

use crate::infrastructure::ports::FormatAdapter;

/// An adapter together with its analysis for one character.
#[derive(Clone)]
pub struct RankedAdapter {
    pub adapter: Arc<dyn FormatAdapter>,
    pub compatibility: CompatibilityAnalysis,
}

impl RankedAdapter {
    pub fn id(&self) -> &str {
        &self.adapter.metadata().id
    }
}

impl fmt::Debug for RankedAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankedAdapter")
            .field("adapter", &self.id())
            .field("compatibility", &self.compatibility)
            .finish()
    }
}

#[derive(Default)]
pub struct FormatAdapterRegistry {
    adapters: RwLock<Vec<Arc<dyn FormatAdapter>>>,
}

impl FormatAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<dyn FormatAdapter>>> {
        self.adapters.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<dyn FormatAdapter>>> {
        self.adapters.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an adapter. An adapter with the same id is replaced in place
    /// and returned.
    pub fn register(&self, adapter: Arc<dyn FormatAdapter>) -> Option<Arc<dyn FormatAdapter>> {
        let id = adapter.metadata().id.clone();
        let mut adapters = self.write();
        match adapters.iter().position(|a| a.metadata().id == id) {
            Some(index) => {
                tracing::info!(adapter_id = %id, "Replacing export adapter");
                Some(std::mem::replace(&mut adapters[index], adapter))
            }
            None => {
                tracing::info!(adapter_id = %id, "Registered export adapter");
                adapters.push(adapter);
                None
            }
        }
    }

    pub fn get_adapter(&self, id: &str) -> Option<Arc<dyn FormatAdapter>> {
        self.read()
            .iter()
            .find(|a| a.metadata().id == id)
            .cloned()
    }

    /// All adapters in registration order.
    pub fn get_all_adapters(&self) -> Vec<Arc<dyn FormatAdapter>> {
        self.read().clone()
    }

    pub fn adapter_ids(&self) -> Vec<String> {
        self.read().iter().map(|a| a.metadata().id.clone()).collect()
    }

    /// Returns whether an adapter was removed.
    pub fn unregister(&self, id: &str) -> bool {
        let mut adapters = self.write();
        let before = adapters.len();
        adapters.retain(|a| a.metadata().id != id);
        let removed = adapters.len() != before;
        if removed {
            tracing::info!(adapter_id = %id, "Unregistered export adapter");
        }
        removed
    }

    pub fn clear(&self) {
        self.write().clear();
        tracing::info!("Cleared export adapters");
    }

    pub fn size(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Analyze every adapter concurrently and sort by score, best first.
    ///
    /// An adapter whose analysis errors or panics is ranked with
    /// [`CompatibilityAnalysis::failed`]. Equal scores keep registration
    /// order.
    pub async fn get_adapters_by_compatibility(
        &self,
        character: &CharacterRecord,
    ) -> Vec<RankedAdapter> {
        let adapters = self.get_all_adapters();

        let analyses = join_all(adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            AssertUnwindSafe(async move { adapter.analyze_compatibility(character).await })
                .catch_unwind()
        }))
        .await;

        let mut ranked: Vec<RankedAdapter> = analyses
            .into_iter()
            .zip(adapters)
            .map(|(outcome, adapter)| {
                let compatibility = match outcome {
                    Ok(Ok(analysis)) => analysis,
                    Ok(Err(err)) => {
                        tracing::warn!(
                            adapter_id = %adapter.metadata().id,
                            error = %err,
                            "Compatibility analysis failed"
                        );
                        CompatibilityAnalysis::failed()
                    }
                    Err(_) => {
                        tracing::warn!(
                            adapter_id = %adapter.metadata().id,
                            "Compatibility analysis panicked"
                        );
                        CompatibilityAnalysis::failed()
                    }
                };
                RankedAdapter {
                    adapter,
                    compatibility,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.compatibility.score.cmp(&a.compatibility.score));
        let order: Vec<(&str, u8)> = ranked
            .iter()
            .map(|r| (r.id(), r.compatibility.score))
            .collect();
        tracing::debug!(
            character = %character.display_name(),
            ranking = ?order,
            "Ranked export adapters"
        );
        ranked
    }
}
