//! Error types for layout-generator.
//!
//! Each stage has its own error type; [`LayoutError`] collects the pipeline
//! ones so the binary can report any failure with its full cause chain.
//! [`ConfigError`] is reported on its own, before logging is set up.

use std::path::PathBuf;

use thiserror::Error;

use crate::edb::EdbError;
use crate::stackup::StackupError;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Any failure of a layout generation run.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The stackup table could not be read.
    #[error(transparent)]
    Stackup(#[from] StackupError),

    /// The design database rejected an operation.
    #[error(transparent)]
    Edb(#[from] EdbError),
}
