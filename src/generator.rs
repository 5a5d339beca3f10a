//! End-to-end layout generation.
//!
//! [`generate_layout`] runs the whole pipeline:
//!
//! 1. Parse the stackup CSV
//! 2. Resolve the database backend (fails if it is not available)
//! 3. Open or create the output database
//! 4. Build the stackup
//! 5. Add the differential pair
//! 6. Save, then close
//!
//! The database is closed on every exit path. A failure after step 3 closes
//! it without saving.

use std::path::PathBuf;

use crate::edb::{self, DatabaseBackend, EdbSession};
use crate::error::LayoutError;
use crate::layout::{add_differential_pair, TraceGeometry};
use crate::stackup::{build_stackup, parse_stackup, LayerRecord};

/// Inputs of one generation run.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    /// Stackup CSV file.
    pub csv: PathBuf,
    /// Output design database.
    pub output: PathBuf,
    /// Differential-pair geometry.
    pub geometry: TraceGeometry,
    /// Tool version to open the database with.
    pub edb_version: Option<String>,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Layers appended to the stackup.
    pub layers: usize,
    /// Materials newly registered.
    pub materials_added: usize,
    /// Traces created.
    pub traces: usize,
}

/// Runs the full pipeline against the named backend.
///
/// # Errors
///
/// Returns the first failure of any stage, unmodified.
pub fn generate_layout(
    request: &LayoutRequest,
    backend: &str,
) -> Result<LayoutSummary, LayoutError> {
    let layers = parse_stackup(&request.csv)?;
    let backend = edb::resolve_backend(backend)?;
    replay(request, &layers, backend.as_ref())
}

/// Runs the full pipeline against an explicit backend.
///
/// # Errors
///
/// Returns the first failure of any stage, unmodified.
pub fn generate_layout_with(
    request: &LayoutRequest,
    backend: &dyn DatabaseBackend,
) -> Result<LayoutSummary, LayoutError> {
    let layers = parse_stackup(&request.csv)?;
    replay(request, &layers, backend)
}

fn replay(
    request: &LayoutRequest,
    layers: &[LayerRecord],
    backend: &dyn DatabaseBackend,
) -> Result<LayoutSummary, LayoutError> {
    let mut session = EdbSession::open(backend, &request.output, request.edb_version.as_deref())?;

    let report = build_stackup(session.db()?, layers)?;
    add_differential_pair(session.db()?, &request.geometry)?;
    session.db()?.save()?;
    session.finish()?;

    let summary = LayoutSummary {
        layers: report.layers_added.len(),
        materials_added: report.materials_added.len(),
        traces: 2,
    };

    tracing::info!(
        output = %request.output.display(),
        layers = summary.layers,
        materials = summary.materials_added,
        traces = summary.traces,
        "Layout generated"
    );

    Ok(summary)
}
