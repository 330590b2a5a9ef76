//! Infrastructure implementations.
//!
//! Contains the export adapters behind the format port and runtime
//! configuration.

pub mod config;
pub mod export;
pub mod ports;
