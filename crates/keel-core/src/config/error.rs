//! # Keel Core Configuration Errors
//!
//! Defines [`ConfigError`], covering every way loading a configuration can
//! fail: locating the file, reading it, parsing one of the supported formats,
//! interpolating environment variables, and converting a setting value.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable '{0}' naming the configuration file is not set")]
    PathVariableMissing(String),

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {format} configuration at line {line}: {message}")]
    Parse {
        format: String,
        line: usize,
        message: String,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Section [{section}] key '{key}' references undefined environment variable '{variable}'")]
    UndefinedVariable {
        section: String,
        key: String,
        variable: String,
    },

    #[error("Section [{section}] key '{key}' has a malformed '%' sequence at offset {offset}")]
    MalformedInterpolation {
        section: String,
        key: String,
        offset: usize,
    },

    #[error("Invalid value '{value}' for setting '{key}': {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub(crate) fn parse(format: &str, line: usize, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            format: format.to_string(),
            line,
            message: message.into(),
        }
    }
}
