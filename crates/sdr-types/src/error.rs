use thiserror::Error;

/// Errors from email delivery providers.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("no sender address configured (set from_email or SDR_FROM_EMAIL)")]
    MissingSender,

    #[error("no recipient address configured (set to_email or SDR_TO_EMAIL)")]
    MissingRecipient,

    #[error("email provider API key '{0}' is not set")]
    MissingApiKey(String),

    #[error("email rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("email transport error: {0}")]
    Transport(String),
}

/// Errors from reading or appending the usage log.
#[derive(Debug, Error)]
pub enum UsageLogError {
    #[error("usage log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage log format error: {0}")]
    Format(String),
}

/// Errors from loading `sdr.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}
