//! # Keel Core Kernel Errors
//!
//! Defines [`Error`], the error type shared by the whole environment: it wraps
//! the typed errors of the config, registry, chain, schema and handle
//! subsystems and adds the failures that belong to environment construction
//! and lifecycle execution.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::kernel::chain::ChainError;
use crate::kernel::handle::HandleError;
use crate::registry::error::RegistryError;
use crate::schema::error::SchemaError;

/// Error type for environment construction and lifecycle execution
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration could not be located, read, parsed or interpolated
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Component discovery or registration failed
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A phase chain could not be computed
    #[error("Dependency chain error: {0}")]
    Chain(#[from] ChainError),

    /// Schema metadata could not be merged or validated
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The global environment handle was used while unusable
    #[error("Environment handle error: {0}")]
    Handle(#[from] HandleError),

    /// A component identity is already taken by a name of the environment itself.
    #[error("Component identity '{identity}' collides with a name already used by the environment")]
    IdentityCollision { identity: String },

    #[error("Component '{identity}' exposes schema metadata but anchor '{anchor}' provides no store to bind it to")]
    StoreUnavailable { identity: String, anchor: String },

    #[error("Environment has already been initialized")]
    AlreadyInitialized,

    /// A component rejected one of its settings.
    #[error("Invalid setting '{key}' for component '{identity}': {message}")]
    ComponentSetting {
        identity: String,
        key: String,
        message: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Helper for components reporting a bad setting value.
    pub fn setting(
        identity: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::ComponentSetting {
            identity: identity.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}
