use thiserror::Error;

/// Errors surfaced by generator construction and artifact persistence.
///
/// Numeric degeneracy in the metrics engine is never an error: metric
/// functions return documented default values instead, so an optimization
/// driver can keep ranking trials.
#[derive(Debug, Error)]
pub enum Error {
    /// A config field is structurally wrong for the selected model.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// The `type` key named a model this crate does not provide.
    #[error("unknown data generator type `{0}`")]
    UnknownGenerator(String),

    /// A strategy was handed fewer bars than its longest indicator needs.
    #[error("insufficient data: need {needed} bars, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_offending_field() {
        let err = Error::config("length", "must be at least 1");
        assert!(err.to_string().contains("length"));
        assert!(err.to_string().contains("must be at least 1"));
    }

    #[test]
    fn test_unknown_generator_message() {
        let err = Error::UnknownGenerator("quantum".to_string());
        assert!(err.to_string().contains("quantum"));
    }
}
