use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(despacho::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(despacho::config))]
    Config(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(despacho::storage))]
    Storage(String),

    #[error("No row with id {id} in {table}")]
    #[diagnostic(code(despacho::not_found))]
    NotFound { table: &'static str, id: String },

    #[error("{0}")]
    #[diagnostic(code(despacho::validation))]
    Validation(String),

    #[error("Forbidden: {0}")]
    #[diagnostic(code(despacho::forbidden))]
    Forbidden(String),

    #[error(transparent)]
    #[diagnostic(code(despacho::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(despacho::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(despacho::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// TOML deserialization errors come from config/despacho.toml
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Storage(format!("Redis error: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type DespachoResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create storage errors
pub fn storage_error(message: &str) -> Error {
    Error::Storage(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
