use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("SSH key staging error: {0}")]
    KeyStaging(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Incomplete run: {0}")]
    Incomplete(String),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
