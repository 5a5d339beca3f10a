//! Error types for design-database operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for design-database operations.
pub type EdbResult<T> = Result<T, EdbError>;

/// Errors that can occur while opening, mutating or persisting a design database.
#[derive(Debug, Error)]
pub enum EdbError {
    /// The requested backend is not available in this build.
    #[error("Design database backend '{name}' is not available (available: {available})")]
    BackendUnavailable {
        /// Backend name that was requested.
        name: String,
        /// Comma-separated list of backends that are available.
        available: String,
    },

    /// Failed to read a database file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write a database file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The stored database could not be decoded.
    #[error("Corrupt design database: {path}")]
    Corrupt {
        /// Path to the database file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Unsupported tool version.
    #[error("Unsupported tool version: {version}")]
    UnsupportedVersion {
        /// Version string that was requested.
        version: String,
    },

    /// Layer type string not understood by the database.
    #[error("Invalid layer type '{layer_type}' for layer '{layer}'")]
    InvalidLayerType {
        /// Layer being added.
        layer: String,
        /// Offending type string.
        layer_type: String,
    },

    /// Length value could not be parsed.
    #[error("Invalid length '{value}': {message}")]
    InvalidLength {
        /// Offending length string.
        value: String,
        /// Description of what's wrong.
        message: String,
    },

    /// A material with this name is already registered.
    #[error("Material already exists: {name}")]
    DuplicateMaterial {
        /// Material name.
        name: String,
    },

    /// A layer with this name is already in the stackup.
    #[error("Layer already exists: {name}")]
    DuplicateLayer {
        /// Layer name.
        name: String,
    },

    /// A layer references a material that was never registered.
    #[error("Material not found: {name}")]
    MaterialNotFound {
        /// Material name.
        name: String,
    },

    /// Geometry the database refuses to instantiate.
    #[error("Invalid geometry for net '{net}': {message}")]
    InvalidGeometry {
        /// Net the geometry belongs to.
        net: String,
        /// Description of what's wrong.
        message: String,
    },

    /// Operation attempted on a closed database.
    #[error("Design database is closed")]
    Closed,
}

impl EdbError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid length error.
    pub fn invalid_length(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidLength {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid geometry error.
    pub fn invalid_geometry(net: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            net: net.into(),
            message: message.into(),
        }
    }
}
