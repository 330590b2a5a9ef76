//! Export formats.
//!
//! One [`FormatAdapter`](crate::infrastructure::ports::FormatAdapter) per
//! target schema plus the registry that ranks them for a character.

mod document;
mod fantasy_grounds;
mod foundry;
mod generic_json;
mod registry;
mod roll20;

use std::sync::Arc;

pub use fantasy_grounds::FantasyGroundsAdapter;
pub use foundry::FoundryAdapter;
pub use generic_json::GenericJsonAdapter;
pub use registry::{FormatAdapterRegistry, RankedAdapter};
pub use roll20::Roll20Adapter;

use crate::infrastructure::config::ExportOptions;

/// Registry holding every built-in adapter.
pub fn default_registry(options: ExportOptions) -> FormatAdapterRegistry {
    let registry = FormatAdapterRegistry::new();
    registry.register(Arc::new(FoundryAdapter::new(options)));
    registry.register(Arc::new(FantasyGroundsAdapter::new(options)));
    registry.register(Arc::new(Roll20Adapter::new(options)));
    registry.register(Arc::new(GenericJsonAdapter::new(options)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::characters;
    use serde_json::json;
    use sheetport_domain::CharacterRecord;

    #[test]
    fn default_registry_includes_all_formats() {
        let registry = default_registry(ExportOptions::default());
        assert_eq!(
            registry.adapter_ids(),
            vec![
                FoundryAdapter::ID.to_string(),
                FantasyGroundsAdapter::ID.to_string(),
                Roll20Adapter::ID.to_string(),
                GenericJsonAdapter::ID.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn generic_json_shares_the_top_score() {
        let registry = default_registry(ExportOptions::default());
        for character in characters::all() {
            let ranked = registry.get_adapters_by_compatibility(&character).await;
            assert_eq!(ranked.len(), 4);
            assert_eq!(ranked[0].compatibility.score, 100);
            let generic = ranked
                .iter()
                .find(|r| r.id() == GenericJsonAdapter::ID)
                .unwrap();
            assert_eq!(generic.compatibility.score, 100);
            assert!(ranked
                .windows(2)
                .all(|w| w[0].compatibility.score >= w[1].compatibility.score));
            assert!(ranked
                .iter()
                .all(|r| r.compatibility.score <= 100 && r.compatibility.data_loss <= 100));
        }
    }

    #[tokio::test]
    async fn every_adapter_converts_every_fixture() {
        let registry = default_registry(ExportOptions::compact());
        for character in characters::all() {
            for adapter in registry.get_all_adapters() {
                let result = adapter.convert(&character).await;
                assert!(
                    result.success,
                    "{} failed on {}: {:?}",
                    adapter.metadata().id,
                    character.display_name(),
                    result.error
                );
                assert!(result.data_size() > 0);
            }
        }
    }

    #[tokio::test]
    async fn out_of_range_levels_still_convert() {
        let character: CharacterRecord = serde_json::from_value(json!({
            "id": 9,
            "name": "Ageless",
            "stats": [{"id": 1, "value": 10}, {"id": 3, "value": 14}],
            "classes": [
                {"definition": {"name": "Wizard"}, "level": 2000000000},
                {"definition": {"name": "Cleric"}, "level": 2000000000}
            ]
        }))
        .unwrap();

        let registry = default_registry(ExportOptions::compact());
        for adapter in registry.get_all_adapters() {
            let result = adapter.convert(&character).await;
            assert!(result.success, "{}: {:?}", adapter.metadata().id, result.error);
        }

        let actor = FoundryAdapter::new(ExportOptions::default()).build_actor(&character);
        assert_eq!(actor["system"]["details"]["level"], 20);
        assert_eq!(actor["system"]["spells"]["spell9"]["max"], 1);
    }
}
