//! Design database access.
//!
//! The generator never talks to a particular CAD tool directly. It depends on
//! the [`DesignDatabase`] capability interface:
//!
//! - material registry query/add
//! - stackup append
//! - trace creation
//! - save/close
//!
//! A [`DatabaseBackend`] opens (creating if necessary) a database at a path.
//! Backends are looked up by name with [`resolve_backend`]; asking for one
//! that is not built in is an availability error raised before anything is
//! opened.
//!
//! An open database is held by an [`EdbSession`], which closes it on every
//! exit path that runs destructors: normal returns, `?` early returns and
//! unwinding panics. The release profile aborts on panic, so there the
//! database is simply abandoned unsaved.

pub mod error;
pub mod file;
pub mod types;

pub use error::{EdbError, EdbResult};
pub use file::{FileBackend, FileDatabase};
pub use types::{LayerType, Length, Material, Point, StackupLayer, Trace};

use std::path::Path;

/// Capabilities the generator needs from an open design database.
pub trait DesignDatabase {
    /// Returns `true` if a material with this name is registered.
    fn has_material(&self, name: &str) -> bool;

    /// Registers a new material.
    ///
    /// # Errors
    ///
    /// Returns an error if the database rejects the material.
    fn add_material(&mut self, material: Material) -> EdbResult<()>;

    /// Appends a layer to the top of the stackup list.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer type, thickness or material is rejected.
    fn add_layer(&mut self, layer: StackupLayer) -> EdbResult<()>;

    /// Creates a copper trace.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry cannot be instantiated.
    fn create_trace(&mut self, trace: Trace) -> EdbResult<()>;

    /// Persists the database to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be written.
    fn save(&mut self) -> EdbResult<()>;

    /// Releases the database. Calling it more than once is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if resources could not be released cleanly.
    fn close(&mut self) -> EdbResult<()>;
}

/// Opens design databases of one kind.
pub trait DatabaseBackend {
    /// Backend name as used in configuration.
    fn name(&self) -> &'static str;

    /// Opens the database at `path`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created, or if
    /// `version` is not supported.
    fn open(&self, path: &Path, version: Option<&str>) -> EdbResult<Box<dyn DesignDatabase>>;
}

/// Names of the backends built into this binary.
pub const AVAILABLE_BACKENDS: &[&str] = &[file::BACKEND_NAME];

/// Looks up a backend by name.
///
/// # Errors
///
/// Returns [`EdbError::BackendUnavailable`] if no backend has that name.
pub fn resolve_backend(name: &str) -> EdbResult<Box<dyn DatabaseBackend>> {
    match name {
        file::BACKEND_NAME => Ok(Box::new(FileBackend)),
        _ => Err(EdbError::BackendUnavailable {
            name: name.to_string(),
            available: AVAILABLE_BACKENDS.join(", "),
        }),
    }
}

/// Scoped ownership of an open design database.
///
/// Call [`EdbSession::finish`] on the success path to close the database and
/// observe the close result. If the session is dropped without `finish`, the
/// database is closed in `Drop` and any close failure is logged.
pub struct EdbSession {
    db: Option<Box<dyn DesignDatabase>>,
}

impl EdbSession {
    /// Opens a database through `backend` and wraps it in a session.
    ///
    /// # Errors
    ///
    /// Returns the backend's open error.
    pub fn open(
        backend: &dyn DatabaseBackend,
        path: &Path,
        version: Option<&str>,
    ) -> EdbResult<Self> {
        let db = backend.open(path, version)?;
        tracing::info!(
            backend = backend.name(),
            path = %path.display(),
            version = version.unwrap_or("default"),
            "Opened design database"
        );
        Ok(Self::new(db))
    }

    /// Wraps an already open database.
    #[must_use]
    pub fn new(db: Box<dyn DesignDatabase>) -> Self {
        Self { db: Some(db) }
    }

    /// Mutable access to the open database.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::Closed`] if the session has already been finished.
    pub fn db(&mut self) -> EdbResult<&mut (dyn DesignDatabase + 'static)> {
        match self.db.as_deref_mut() {
            Some(db) => Ok(db),
            None => Err(EdbError::Closed),
        }
    }

    /// Closes the database, returning the close result.
    ///
    /// # Errors
    ///
    /// Returns the database's close error.
    pub fn finish(mut self) -> EdbResult<()> {
        match self.db.take() {
            Some(mut db) => db.close(),
            None => Ok(()),
        }
    }
}

impl Drop for EdbSession {
    fn drop(&mut self) {
        if let Some(mut db) = self.db.take() {
            tracing::debug!("Closing design database after early exit");
            if let Err(e) = db.close() {
                tracing::warn!(error = %e, "Failed to close design database");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Database that only counts `close` calls.
    struct CloseCounter {
        closes: Rc<Cell<u32>>,
    }

    impl DesignDatabase for CloseCounter {
        fn has_material(&self, _name: &str) -> bool {
            false
        }
        fn add_material(&mut self, _material: Material) -> EdbResult<()> {
            Ok(())
        }
        fn add_layer(&mut self, _layer: StackupLayer) -> EdbResult<()> {
            Ok(())
        }
        fn create_trace(&mut self, trace: Trace) -> EdbResult<()> {
            Err(EdbError::invalid_geometry(trace.net, "rejected"))
        }
        fn save(&mut self) -> EdbResult<()> {
            Ok(())
        }
        fn close(&mut self) -> EdbResult<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    fn session(closes: &Rc<Cell<u32>>) -> EdbSession {
        EdbSession::new(Box::new(CloseCounter {
            closes: Rc::clone(closes),
        }))
    }

    #[test]
    fn finish_closes_once() {
        let closes = Rc::new(Cell::new(0));
        let session = session(&closes);
        session.finish().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn drop_closes_after_error() {
        let closes = Rc::new(Cell::new(0));
        let result = (|| -> EdbResult<()> {
            let mut session = session(&closes);
            session
                .db()?
                .create_trace(Trace::new(Vec::new(), "L1", 0.1, "n"))?;
            session.finish()
        })();
        assert!(result.is_err());
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn resolve_known_backend() {
        let backend = resolve_backend("file").unwrap();
        assert_eq!(backend.name(), "file");
    }

    #[test]
    fn resolve_unknown_backend_fails() {
        let err = resolve_backend("ansys").err().unwrap();
        assert!(matches!(err, EdbError::BackendUnavailable { .. }));
        assert!(err.to_string().contains("file"));
    }
}
