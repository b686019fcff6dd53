//! Variable source port
//!
//! Defines where the raw variables of one environment come from.

use async_trait::async_trait;

use envshield_domain::environment::VariableMap;

/// Errors that can occur while loading raw variables.
#[derive(Debug, thiserror::Error)]
pub enum VariableSourceError {
    /// The source does not exist.
    #[error("Variable source not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The payload was readable but not a valid variable map.
    #[error("Invalid variables: {0}")]
    Invalid(String),
}

/// Supplies the raw (decrypted, unresolved) variables of one environment.
///
/// Implementations never receive resolved values back; only raw values are
/// durable.
#[async_trait]
pub trait VariableSource: Send + Sync {
    /// Loads the raw variable map.
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or parsed.
    async fn load(&self) -> Result<VariableMap, VariableSourceError>;

    /// Short description of the source, used in log lines.
    fn describe(&self) -> String;
}
