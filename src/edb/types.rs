//! Value types exchanged with a design database.
//!
//! These are the requests the stackup builder and the differential-pair
//! generator hand to a [`DesignDatabase`](super::DesignDatabase): materials,
//! stackup layers and traces. Layer type and thickness travel as strings,
//! exactly as they appear in the stackup table; the database decides
//! whether it accepts them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::EdbError;

/// A dielectric or conductor material with its electromagnetic properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Material name, unique within a database.
    pub name: String,
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
}

/// A request to append a layer to the stackup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackupLayer {
    /// Layer name (e.g., "L03_SIG1").
    pub name: String,
    /// Layer type as written in the source table (e.g., "signal").
    pub layer_type: String,
    /// Name of a registered material.
    pub material: String,
    /// Thickness with an explicit unit suffix (e.g., "0.035mm").
    pub thickness: String,
}

/// Layer kinds a design database understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    /// Routable copper layer.
    Signal,
    /// Insulating layer between conductors.
    Dielectric,
    /// Plane or other non-routed conductor.
    Conducting,
    /// Solder mask.
    SolderMask,
    /// Silkscreen overlay.
    Silkscreen,
    /// Solder paste.
    SolderPaste,
    /// Board outline.
    Outline,
}

impl LayerType {
    /// Parses a layer type name.
    ///
    /// Matching is case-insensitive and treats spaces, dashes and
    /// underscores alike, so `"Solder Mask"` and `"solder_mask"` are the same.
    /// Common stackup-export names (`Copper`, `Core`, `Prepreg`, `Overlay`)
    /// are accepted as aliases.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalised: String = value
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalised.as_str() {
            "signal" | "copper" => Some(Self::Signal),
            "dielectric" | "core" | "prepreg" | "substrate" => Some(Self::Dielectric),
            "conducting" | "plane" => Some(Self::Conducting),
            "solder_mask" | "soldermask" => Some(Self::SolderMask),
            "silkscreen" | "overlay" => Some(Self::Silkscreen),
            "solder_paste" | "paste" => Some(Self::SolderPaste),
            "outline" => Some(Self::Outline),
            _ => None,
        }
    }

    /// Returns `true` for layers that carry copper.
    #[must_use]
    pub const fn is_conductor(self) -> bool {
        matches!(self, Self::Signal | Self::Conducting)
    }
}

/// A physical length, stored in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Length {
    mm: f64,
}

impl Length {
    /// Creates a length from a value in millimetres.
    #[must_use]
    pub const fn from_mm(mm: f64) -> Self {
        Self { mm }
    }

    /// Returns the length in millimetres.
    #[must_use]
    pub const fn mm(self) -> f64 {
        self.mm
    }

    /// Millimetres per unit for the supported unit suffixes.
    fn unit_scale(unit: &str) -> Option<f64> {
        match unit {
            "mm" => Some(1.0),
            "um" => Some(1e-3),
            "mil" => Some(0.0254),
            "in" => Some(25.4),
            "m" => Some(1000.0),
            _ => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", self.mm)
    }
}

impl FromStr for Length {
    type Err = EdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_alphabetic())
            .last()
            .map_or(trimmed.len(), |(i, _)| i);
        let (number, unit) = trimmed.split_at(split);

        if unit.is_empty() {
            return Err(EdbError::invalid_length(s, "missing unit suffix"));
        }
        let scale = Self::unit_scale(&unit.to_ascii_lowercase())
            .ok_or_else(|| EdbError::invalid_length(s, format!("unknown unit '{unit}'")))?;
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| EdbError::invalid_length(s, "not a number"))?;

        Ok(Self::from_mm(value * scale))
    }
}

/// A point in board coordinates (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in mm.
    pub x: f64,
    /// Y coordinate in mm.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A copper trace: a centreline polyline with a width, on one layer and net.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Net the trace belongs to.
    pub net: String,
    /// Layer the trace is drawn on.
    pub layer: String,
    /// Trace width in mm.
    pub width: f64,
    /// Centreline vertices in order.
    pub points: Vec<Point>,
}

impl Trace {
    /// Creates a new trace.
    #[must_use]
    pub fn new(
        points: Vec<Point>,
        layer: impl Into<String>,
        width: f64,
        net: impl Into<String>,
    ) -> Self {
        Self {
            net: net.into(),
            layer: layer.into(),
            width,
            points,
        }
    }
}
