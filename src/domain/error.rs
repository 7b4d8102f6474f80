//! Domain error types.
//!
//! Setup-time failures (bad parameters, bad config, missing data) abort the
//! run before the bar loop. Per-bar order rejections are values on the
//! portfolio ([`crate::domain::portfolio::Rejection`]), never errors.

/// Top-level error type for flintsteel.
#[derive(Debug, thiserror::Error)]
pub enum FlintsteelError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("price series is empty")]
    EmptySeries,

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

    #[error("no data for {code} in the requested window")]
    NoData { code: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FlintsteelError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        FlintsteelError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&FlintsteelError> for std::process::ExitCode {
    fn from(err: &FlintsteelError) -> Self {
        let code: u8 = match err {
            FlintsteelError::Io(_) => 1,
            FlintsteelError::ConfigParse { .. }
            | FlintsteelError::ConfigMissing { .. }
            | FlintsteelError::ConfigInvalid { .. } => 2,
            FlintsteelError::InvalidParameter { .. } => 4,
            FlintsteelError::EmptySeries
            | FlintsteelError::NoData { .. }
            | FlintsteelError::Data { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
