//! Use cases - orchestration on top of the export adapters.

pub mod conversion;

pub use conversion::{ConversionService, Export};
