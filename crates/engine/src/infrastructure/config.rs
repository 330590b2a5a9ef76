//! Runtime configuration for the `sheetport` binary.
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file via `dotenvy`) and the first command line argument.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sheetport_domain::ScoringWeights;

pub const ENV_INPUT: &str = "SHEETPORT_INPUT";
pub const ENV_FORMAT: &str = "SHEETPORT_FORMAT";
pub const ENV_OUTPUT_DIR: &str = "SHEETPORT_OUTPUT_DIR";
pub const ENV_PRETTY: &str = "SHEETPORT_PRETTY";
pub const ENV_MIN_SCORE: &str = "SHEETPORT_MIN_SCORE";
pub const ENV_WEIGHTS: &str = "SHEETPORT_WEIGHTS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No character file given (pass a path or set SHEETPORT_INPUT)")]
    MissingInput,
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scoring weights in {path}: {source}")]
    Weights {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Options handed to the built-in adapters at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Pretty-print documents.
    pub pretty: bool,
    /// Weights used when adapters score themselves.
    pub weights: ScoringWeights,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            weights: ScoringWeights::default(),
        }
    }
}

impl ExportOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input: PathBuf,
    /// Adapter id; `None` picks the best ranked adapter.
    pub format: Option<String>,
    pub output_dir: PathBuf,
    pub export: ExportOptions,
    /// Adapters scoring below this are listed but never auto-selected.
    pub min_score: u8,
}

impl AppConfig {
    /// Load `.env.local` / `.env` from the working directory, then read the
    /// environment.
    pub fn load(cli_input: Option<String>) -> Result<Self, ConfigError> {
        for filename in [".env.local", ".env"] {
            let path = std::path::Path::new(filename);
            if path.exists() {
                let _ = dotenvy::from_path(path);
            }
        }
        Self::from_lookup(cli_input, |key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. The CLI argument wins over
    /// `SHEETPORT_INPUT`.
    pub fn from_lookup<F>(cli_input: Option<String>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let input = cli_input
            .filter(|s| !s.trim().is_empty())
            .or_else(|| get(ENV_INPUT))
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingInput)?;

        let pretty = match get(ENV_PRETTY) {
            None => true,
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_PRETTY,
                value,
            })?,
        };

        let min_score = match get(ENV_MIN_SCORE) {
            None => 0,
            Some(value) => value
                .parse::<u8>()
                .ok()
                .filter(|score| *score <= 100)
                .ok_or(ConfigError::InvalidValue {
                    key: ENV_MIN_SCORE,
                    value,
                })?,
        };

        let weights = match get(ENV_WEIGHTS) {
            None => ScoringWeights::default(),
            Some(path) => load_weights(PathBuf::from(path))?,
        };

        Ok(Self {
            input,
            format: get(ENV_FORMAT).map(|f| f.to_lowercase()),
            output_dir: get(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            export: ExportOptions { pretty, weights },
            min_score,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Missing keys fall back to the default weights.
fn load_weights(path: PathBuf) -> Result<ScoringWeights, ConfigError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Weights { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(Some("vex.json".into()), lookup(&[])).unwrap();
        assert_eq!(config.input, PathBuf::from("vex.json"));
        assert_eq!(config.format, None);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.export.pretty);
        assert_eq!(config.min_score, 0);
        assert_eq!(config.export.weights, ScoringWeights::default());
    }

    #[test]
    fn cli_argument_beats_environment() {
        let config = AppConfig::from_lookup(
            Some("cli.json".into()),
            lookup(&[(ENV_INPUT, "env.json")]),
        )
        .unwrap();
        assert_eq!(config.input, PathBuf::from("cli.json"));

        let config = AppConfig::from_lookup(None, lookup(&[(ENV_INPUT, "env.json")])).unwrap();
        assert_eq!(config.input, PathBuf::from("env.json"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let err = AppConfig::from_lookup(None, lookup(&[(ENV_INPUT, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInput));
    }

    #[test]
    fn parses_overrides() {
        let config = AppConfig::from_lookup(
            Some("a.json".into()),
            lookup(&[
                (ENV_FORMAT, "Roll20"),
                (ENV_OUTPUT_DIR, "out"),
                (ENV_PRETTY, "no"),
                (ENV_MIN_SCORE, "75"),
            ]),
        )
        .unwrap();
        assert_eq!(config.format.as_deref(), Some("roll20"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(!config.export.pretty);
        assert_eq!(config.min_score, 75);
    }

    #[test]
    fn rejects_bad_values() {
        let err = AppConfig::from_lookup(Some("a.json".into()), lookup(&[(ENV_MIN_SCORE, "101")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_MIN_SCORE, .. }));

        let err = AppConfig::from_lookup(Some("a.json".into()), lookup(&[(ENV_PRETTY, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_PRETTY, .. }));
    }

    #[test]
    fn loads_partial_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        std::fs::write(&path, r#"{"spells": 30.0, "partial_support": 0.5}"#).unwrap();

        let config = AppConfig::from_lookup(
            Some("a.json".into()),
            lookup(&[(ENV_WEIGHTS, path.to_str().unwrap())]),
        )
        .unwrap();
        assert_eq!(config.export.weights.spells, 30.0);
        assert_eq!(config.export.weights.partial_support, 0.5);
        assert_eq!(config.export.weights.basic, 10.0);
    }
}
