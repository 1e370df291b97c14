//! Domain error types.

/// Top-level error type for quantcore.
#[derive(Debug, thiserror::Error)]
pub enum QuantError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("unsupported strategy type: {0}")]
    UnknownStrategy(String),

    #[error("invalid parameter {param} for {strategy}: {reason}")]
    InvalidParameter {
        strategy: String,
        param: String,
        reason: String,
    },

    #[error("price series is not strictly increasing at bar {index}")]
    UnorderedSeries { index: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantError {
    pub(crate) fn invalid_param(strategy: &str, param: &str, reason: impl Into<String>) -> Self {
        QuantError::InvalidParameter {
            strategy: strategy.to_string(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantError> for std::process::ExitCode {
    fn from(err: &QuantError) -> Self {
        let code: u8 = match err {
            QuantError::Io(_) | QuantError::Serialization(_) => 1,
            QuantError::ConfigParse { .. }
            | QuantError::ConfigMissing { .. }
            | QuantError::ConfigInvalid { .. } => 2,
            QuantError::UnknownStrategy(_) | QuantError::InvalidParameter { .. } => 4,
            QuantError::InsufficientData { .. }
            | QuantError::UnorderedSeries { .. }
            | QuantError::Data { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
