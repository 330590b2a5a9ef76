//! Types crossing the adapter boundary: conversion results and their
//! failure classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::AdapterError;

/// Descriptive metadata for an export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub file_extension: String,
    pub mime_type: String,
}

impl AdapterMetadata {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        file_extension: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            version: version.into(),
            file_extension: file_extension.into(),
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    UnsupportedFormat,
    Serialization,
    AdapterFailure,
    Unknown,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "VALIDATION",
            Self::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            Self::Serialization => "SERIALIZATION",
            Self::AdapterFailure => "ADAPTER_FAILURE",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

/// A failure with a machine readable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ClassifiedConversionError {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
}

impl ClassifiedConversionError {
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
        }
    }

    pub fn unsupported_format(adapter_id: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedFormat,
            Severity::Error,
            format!("Unknown export format: {}", adapter_id),
        )
    }
}

/// Why a conversion failed: a bare message or a classified error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum ConversionFailure {
    Raw(String),
    Classified(ClassifiedConversionError),
}

impl ConversionFailure {
    pub fn raw(message: impl Into<String>) -> Self {
        Self::Raw(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Raw(message) => message,
            Self::Classified(err) => &err.message,
        }
    }

    /// Normalize to the classified form. Raw messages become `UNKNOWN`.
    pub fn classify(self) -> ClassifiedConversionError {
        match self {
            Self::Raw(message) => {
                ClassifiedConversionError::new(ErrorCode::Unknown, Severity::Error, message)
            }
            Self::Classified(err) => err,
        }
    }
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(message) => write!(f, "{}", message),
            Self::Classified(err) => write!(f, "{}", err),
        }
    }
}

impl From<ClassifiedConversionError> for ConversionFailure {
    fn from(err: ClassifiedConversionError) -> Self {
        Self::Classified(err)
    }
}

impl From<AdapterError> for ConversionFailure {
    fn from(err: AdapterError) -> Self {
        let code = match &err {
            AdapterError::Unsupported(_) => ErrorCode::Validation,
            AdapterError::Serialization(_) | AdapterError::Xml(_) => ErrorCode::Serialization,
            AdapterError::Analysis { .. } => ErrorCode::AdapterFailure,
        };
        Self::Classified(ClassifiedConversionError::new(
            code,
            Severity::Error,
            err.to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub conversion_time_ms: u64,
    /// Bytes of the produced document.
    pub data_size: usize,
}

/// Outcome of converting one character into one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    /// Rendered document, ready to be written to disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ConversionFailure>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceMetrics>,
}

impl ConversionResult {
    pub fn success(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            warnings: Vec::new(),
            performance: None,
        }
    }

    pub fn failure(error: impl Into<ConversionFailure>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            warnings: Vec::new(),
            performance: None,
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_performance(mut self, performance: PerformanceMetrics) -> Self {
        self.performance = Some(performance);
        self
    }

    pub fn data_size(&self) -> usize {
        self.data.as_ref().map_or(0, String::len)
    }
}

impl From<Result<String, AdapterError>> for ConversionResult {
    fn from(result: Result<String, AdapterError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_failures_classify_as_unknown() {
        let classified = ConversionFailure::raw("disk on fire").classify();
        assert_eq!(classified.code, ErrorCode::Unknown);
        assert_eq!(classified.severity, Severity::Error);
        assert_eq!(classified.message, "disk on fire");
    }

    #[test]
    fn classified_failures_keep_their_code() {
        let failure: ConversionFailure = ClassifiedConversionError::new(
            ErrorCode::Validation,
            Severity::Error,
            "Character has no name",
        )
        .into();
        let classified = failure.classify();
        assert_eq!(classified.code, ErrorCode::Validation);
        assert_eq!(classified.to_string(), "[VALIDATION] Character has no name");
    }

    #[test]
    fn adapter_errors_map_by_variant() {
        let failure: ConversionFailure = AdapterError::xml("unbalanced tag").into();
        assert_eq!(failure.clone().classify().code, ErrorCode::Serialization);

        let failure: ConversionFailure = AdapterError::unsupported("no stats").into();
        assert_eq!(failure.classify().code, ErrorCode::Validation);
    }

    #[test]
    fn failure_json_is_tagged() {
        let value = serde_json::to_value(ConversionFailure::raw("oops")).unwrap();
        assert_eq!(value["kind"], "raw");
        assert_eq!(value["error"], "oops");

        let value = serde_json::to_value(ConversionFailure::from(
            ClassifiedConversionError::unsupported_format("pdf"),
        ))
        .unwrap();
        assert_eq!(value["kind"], "classified");
        assert_eq!(value["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn result_builders() {
        let ok = ConversionResult::success("{}".to_string())
            .with_warnings(vec!["heads up".to_string()]);
        assert!(ok.success);
        assert_eq!(ok.data_size(), 2);
        assert_eq!(ok.warnings, vec!["heads up".to_string()]);

        let failed = ConversionResult::from(Err(AdapterError::xml("bad")));
        assert!(!failed.success);
        assert!(failed.data.is_none());
        assert_eq!(failed.data_size(), 0);
    }
}
