//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading workflow documents and settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The workflow document (or an explicitly requested settings file) does not exist.
    #[error("config file '{path}' not found")]
    ConfigNotFound { path: String },

    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// The document was read but is not valid structured data, or does not
    /// have the shape of a workflow document.
    #[error("failed to parse '{path}': {message}")]
    ConfigParse { path: String, message: String },

    /// Failed to parse TOML settings.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ConfigError {
    pub(crate) fn parse(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConfigError::ConfigParse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
