//! Sheetport Engine library.
//!
//! Exports character records to virtual tabletop formats.
//!
//! ## Structure
//!
//! - `infrastructure/` - Export adapters behind the format port, the
//!   adapter registry and runtime configuration
//! - `use_cases/` - Ranking and conversion orchestration

pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for unit testing.
#[cfg(test)]
pub mod test_fixtures;

pub use infrastructure::config::{AppConfig, ConfigError, ExportOptions};
pub use infrastructure::export::{default_registry, FormatAdapterRegistry, RankedAdapter};
pub use infrastructure::ports::{
    AdapterError, AdapterMetadata, ConversionFailure, ConversionResult, FormatAdapter,
};
pub use use_cases::{ConversionService, Export};
