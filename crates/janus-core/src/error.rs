use std::path::PathBuf;

/// Errors that can occur across the Janus platform.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// [`JanusError::MissingData`] is the precondition signal: it means a compute
/// entry point was called before its inputs were loaded, as opposed to a
/// computation that was attempted and failed.
///
/// # Examples
///
/// ```
/// use janus_core::JanusError;
///
/// let err = JanusError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
///
/// let err = JanusError::MissingData("planning data not loaded".into());
/// assert!(err.to_string().starts_with("missing data"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum JanusError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Repo-data service request failure.
    #[error("repo-data service error: {0}")]
    Fetch(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required data file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A compute entry point was called before its inputs were loaded.
    #[error("missing data: {0}")]
    MissingData(String),
}
