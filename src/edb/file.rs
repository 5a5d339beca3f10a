//! JSON-on-disk design database.
//!
//! # Directory Layout
//!
//! ```text
//! <output>/
//!   design.json    # Materials, stackup, nets and traces (pretty JSON)
//! ```
//!
//! `design.json` is written by [`DesignDatabase::save`] through a temporary
//! file and a rename, so a crash mid-save leaves the previous contents intact.
//! Opening a directory that already holds a `design.json` loads it, so
//! materials registered by an earlier run count as present.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{EdbError, EdbResult};
use super::types::{LayerType, Length, Material, StackupLayer, Trace};
use super::{DatabaseBackend, DesignDatabase};

/// Configuration name of this backend.
pub const BACKEND_NAME: &str = "file";

/// Name of the database file inside the output directory.
pub const DESIGN_FILE: &str = "design.json";

/// On-disk format revision written to `design.json`.
const FORMAT_VERSION: u32 = 1;

/// Returns the tool version pattern, e.g. `2024.1` or `24.1`.
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2,4}\.\d$").expect("static regex is valid"))
}

/// Returns `true` if `version` is a tool version string this crate accepts.
#[must_use]
pub fn is_valid_version(version: &str) -> bool {
    version_pattern().is_match(version)
}

/// A stackup layer as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLayer {
    /// Layer name.
    pub name: String,
    /// Parsed layer kind.
    pub layer_type: LayerType,
    /// Material name.
    pub material: String,
    /// Thickness in mm.
    pub thickness_mm: f64,
}

/// Serialised contents of `design.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Design {
    /// On-disk format revision.
    #[serde(default)]
    pub format_version: u32,
    /// Tool version the design targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    /// Materials keyed by name, in registration order.
    #[serde(default)]
    pub materials: IndexMap<String, Material>,
    /// Stackup layers in append order.
    #[serde(default)]
    pub layers: Vec<StoredLayer>,
    /// Net names in creation order.
    #[serde(default)]
    pub nets: IndexSet<String>,
    /// Traces in creation order.
    #[serde(default)]
    pub traces: Vec<Trace>,
    /// RFC 3339 timestamp of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

impl Design {
    /// Reads a design from a `design.json` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn read(path: &Path) -> EdbResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| EdbError::file_read(path, e))?;
        serde_json::from_str(&contents).map_err(|e| EdbError::Corrupt {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Looks up a layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&StoredLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Opens [`FileDatabase`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBackend;

impl DatabaseBackend for FileBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn open(&self, path: &Path, version: Option<&str>) -> EdbResult<Box<dyn DesignDatabase>> {
        Ok(Box::new(FileDatabase::open(path, version)?))
    }
}

/// A design database stored as a directory holding `design.json`.
#[derive(Debug)]
pub struct FileDatabase {
    dir: PathBuf,
    design: Design,
    open: bool,
}

impl FileDatabase {
    /// Opens the database at `dir`, creating the directory if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the version is not supported or an existing
    /// `design.json` cannot be read.
    pub fn open(dir: impl AsRef<Path>, version: Option<&str>) -> EdbResult<Self> {
        let dir = dir.as_ref().to_path_buf();

        if let Some(v) = version {
            if !is_valid_version(v) {
                return Err(EdbError::UnsupportedVersion {
                    version: v.to_string(),
                });
            }
        }

        fs::create_dir_all(&dir).map_err(|e| EdbError::file_write(&dir, e))?;

        let design_path = dir.join(DESIGN_FILE);
        let mut design = if design_path.exists() {
            Design::read(&design_path)?
        } else {
            Design {
                format_version: FORMAT_VERSION,
                ..Design::default()
            }
        };

        if let Some(v) = version {
            design.tool_version = Some(v.to_string());
        }

        tracing::debug!(
            path = %dir.display(),
            materials = design.materials.len(),
            layers = design.layers.len(),
            "Loaded design"
        );

        Ok(Self {
            dir,
            design,
            open: true,
        })
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Returns the in-memory design.
    #[must_use]
    pub const fn design(&self) -> &Design {
        &self.design
    }

    fn ensure_open(&self) -> EdbResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(EdbError::Closed)
        }
    }
}

impl DesignDatabase for FileDatabase {
    fn has_material(&self, name: &str) -> bool {
        self.design.materials.contains_key(name)
    }

    fn add_material(&mut self, material: Material) -> EdbResult<()> {
        self.ensure_open()?;
        if self.design.materials.contains_key(&material.name) {
            return Err(EdbError::DuplicateMaterial {
                name: material.name,
            });
        }
        self.design
            .materials
            .insert(material.name.clone(), material);
        Ok(())
    }

    fn add_layer(&mut self, layer: StackupLayer) -> EdbResult<()> {
        self.ensure_open()?;

        let layer_type =
            LayerType::parse(&layer.layer_type).ok_or_else(|| EdbError::InvalidLayerType {
                layer: layer.name.clone(),
                layer_type: layer.layer_type.clone(),
            })?;
        let thickness: Length = layer.thickness.parse()?;
        if !thickness.mm().is_finite() || thickness.mm() < 0.0 {
            return Err(EdbError::invalid_length(
                &layer.thickness,
                "thickness must be a non-negative finite value",
            ));
        }
        if self.design.layer(&layer.name).is_some() {
            return Err(EdbError::DuplicateLayer { name: layer.name });
        }
        if !self.design.materials.contains_key(&layer.material) {
            return Err(EdbError::MaterialNotFound {
                name: layer.material,
            });
        }

        self.design.layers.push(StoredLayer {
            name: layer.name,
            layer_type,
            material: layer.material,
            thickness_mm: thickness.mm(),
        });
        Ok(())
    }

    fn create_trace(&mut self, trace: Trace) -> EdbResult<()> {
        self.ensure_open()?;

        match self.design.layer(&trace.layer) {
            Some(layer) if !layer.layer_type.is_conductor() => {
                return Err(EdbError::invalid_geometry(
                    &trace.net,
                    format!("layer '{}' is not a conductor layer", trace.layer),
                ));
            }
            Some(_) => {}
            None => tracing::warn!(
                layer = %trace.layer,
                net = %trace.net,
                "Trace layer is not in the stackup"
            ),
        }
        if !trace.width.is_finite() || trace.width <= 0.0 {
            return Err(EdbError::invalid_geometry(
                &trace.net,
                format!("trace width must be positive, got {}", trace.width),
            ));
        }
        if trace.points.len() < 2 {
            return Err(EdbError::invalid_geometry(
                &trace.net,
                format!(
                    "a trace needs at least two points, got {}",
                    trace.points.len()
                ),
            ));
        }

        self.design.nets.insert(trace.net.clone());
        self.design.traces.push(trace);
        Ok(())
    }

    fn save(&mut self) -> EdbResult<()> {
        self.ensure_open()?;

        self.design.saved_at = Some(chrono::Local::now().to_rfc3339());

        let path = self.dir.join(DESIGN_FILE);
        let tmp_path = self.dir.join(format!("{DESIGN_FILE}.tmp"));
        let json = serde_json::to_string_pretty(&self.design).map_err(|e| EdbError::Corrupt {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&tmp_path, json).map_err(|e| EdbError::file_write(&tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| EdbError::file_write(&path, e))?;

        tracing::info!(
            path = %path.display(),
            materials = self.design.materials.len(),
            layers = self.design.layers.len(),
            traces = self.design.traces.len(),
            "Saved design database"
        );
        Ok(())
    }

    fn close(&mut self) -> EdbResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        tracing::debug!(path = %self.dir.display(), "Closed design database");
        Ok(())
    }
}
