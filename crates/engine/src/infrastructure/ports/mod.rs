//! Port traits for infrastructure boundaries.
//!
//! The only abstraction here is the export format. Everything else is
//! concrete types.

mod error;
mod format_adapter;
mod types;

pub use error::AdapterError;
pub use format_adapter::FormatAdapter;
pub use types::{
    AdapterMetadata, ClassifiedConversionError, ConversionFailure, ConversionResult, ErrorCode,
    PerformanceMetrics, Severity,
};

#[cfg(test)]
pub use format_adapter::MockFormatAdapter;
