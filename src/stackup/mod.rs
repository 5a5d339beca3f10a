//! PCB stackup tables.
//!
//! A stackup table is a CSV file with one row per layer, top to bottom, as
//! exported by most board tools. [`parse_stackup`] turns it into
//! [`LayerRecord`]s and [`build_stackup`] replays those records into a
//! [`DesignDatabase`](crate::edb::DesignDatabase).
//!
//! # Required Columns
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `Design Layer Name` | Layer name; rows where it is empty are skipped |
//! | `Type` | Layer type (signal, dielectric, ...) |
//! | `Material` | Material name |
//! | `Thickness (um)` | Thickness in micrometres |
//! | `Relative Permittivity` | Dielectric constant |
//! | `Relative Permeability` | Relative permeability |
//! | `Bulk Conductivity` | S/m |
//! | `Dielectric Loss Tangent` | Dielectric loss tangent |
//! | `Magnetic Loss Tangent` | Magnetic loss tangent |
//!
//! Any other columns are ignored.

mod builder;
mod parser;

pub use builder::{build_stackup, BuildReport};
pub use parser::{parse_stackup, read_stackup, StackupError, REQUIRED_COLUMNS};

use crate::edb::{Length, Material};

/// Micrometres to millimetres.
pub const UM_TO_MM: f64 = 0.001;

/// One retained row of a stackup table.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
    /// Design layer name (never empty).
    pub name: String,
    /// Layer type as written in the table.
    pub layer_type: String,
    /// Material name.
    pub material: String,
    /// Relative permittivity.
    pub permittivity: f64,
    /// Relative permeability.
    pub permeability: f64,
    /// Bulk conductivity in S/m.
    pub conductivity: f64,
    /// Dielectric loss tangent.
    pub dielectric_loss_tangent: f64,
    /// Magnetic loss tangent.
    pub magnetic_loss_tangent: f64,
    /// Thickness in micrometres, as given.
    pub thickness_um: f64,
    /// Thickness in millimetres (`thickness_um * 0.001`).
    pub thickness_mm: f64,
}

impl LayerRecord {
    /// The material this layer is made of, with its physical properties.
    #[must_use]
    pub fn material(&self) -> Material {
        Material {
            name: self.material.clone(),
            permittivity: self.permittivity,
            permeability: self.permeability,
            conductivity: self.conductivity,
            dielectric_loss_tangent: self.dielectric_loss_tangent,
            magnetic_loss_tangent: self.magnetic_loss_tangent,
        }
    }

    /// Thickness as a length value.
    #[must_use]
    pub const fn thickness(&self) -> Length {
        Length::from_mm(self.thickness_mm)
    }
}
