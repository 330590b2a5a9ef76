//! Error types for adapter operations.

/// Failures inside an export adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Character does not meet the adapter's preconditions.
    #[error("Character cannot be converted: {0}")]
    Unsupported(String),

    /// JSON document could not be produced.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// XML document could not be written.
    #[error("XML write error: {0}")]
    Xml(String),

    /// Compatibility analysis failed.
    #[error("Analysis failed in {adapter_id}: {message}")]
    Analysis {
        adapter_id: String,
        message: String,
    },
}

impl AdapterError {
    pub fn unsupported(message: impl ToString) -> Self {
        Self::Unsupported(message.to_string())
    }

    pub fn xml(message: impl ToString) -> Self {
        Self::Xml(message.to_string())
    }

    pub fn analysis(adapter_id: impl ToString, message: impl ToString) -> Self {
        Self::Analysis {
            adapter_id: adapter_id.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_errors_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let adapter_err: AdapterError = err.into();
        assert!(matches!(adapter_err, AdapterError::Serialization(_)));
        assert!(adapter_err.to_string().starts_with("Serialization error"));
    }

    #[test]
    fn analysis_error_names_the_adapter() {
        let err = AdapterError::analysis("roll20", "bad table");
        assert_eq!(err.to_string(), "Analysis failed in roll20: bad table");
    }
}
