//! Sheetport - export a character record to a virtual tabletop format.
//!
//! Usage: `sheetport <character.json>` (or set `SHEETPORT_INPUT`).

use std::sync::Arc;

use anyhow::Context;
use sheetport_domain::CharacterRecord;
use sheetport_engine::{default_registry, AppConfig, ConversionService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetport_engine=info,sheetport=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load(std::env::args().nth(1))?;
    tracing::info!(input = %config.input.display(), "Starting Sheetport");

    let json = std::fs::read_to_string(&config.input)
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let character = CharacterRecord::from_json(&json)
        .with_context(|| format!("Invalid character record in {}", config.input.display()))?;

    let service = ConversionService::new(Arc::new(default_registry(config.export)));

    println!("Compatibility for {}:", character.display_name());
    for ranked in service.rank(&character).await {
        let analysis = &ranked.compatibility;
        let recommendation = format!("{:?}", analysis.recommendation).to_lowercase();
        println!(
            "  {:>3}%  {:<16} {:<10} data loss {}%",
            analysis.score,
            ranked.adapter.metadata().name,
            recommendation,
            analysis.data_loss
        );
    }

    let export = match &config.format {
        Some(adapter_id) => service.convert_with(adapter_id, &character).await?,
        None => service.convert_best(&character, config.min_score).await?,
    };

    for warning in &export.result.warnings {
        println!("  warning: {}", warning);
    }

    if let Some(err) = &export.result.error {
        anyhow::bail!("{} conversion failed: {}", export.adapter.name, err);
    }

    let path = export
        .write_to(&config.output_dir, &character)
        .with_context(|| format!("Failed to write into {}", config.output_dir.display()))?;

    let performance = export.result.performance.unwrap_or_default();
    println!(
        "Wrote {} ({} bytes, {} ms)",
        path.display(),
        performance.data_size,
        performance.conversion_time_ms
    );

    Ok(())
}
