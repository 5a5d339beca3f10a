//! layout-generator: PCB stackup replay and differential-pair generation
//!
//! This library reads a PCB stackup table from CSV, replays it into a design
//! database (materials and layer stack), and generates a meandered
//! differential pair on a signal layer.
//!
//! # Architecture
//!
//! All database access goes through the [`edb::DesignDatabase`] capability
//! interface. The stackup parser and the pair generator are pure and can be
//! tested without any CAD backend.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`edb`] — Design database interface, session guard and file backend
//! - [`error`] — Error types
//! - [`generator`] — End-to-end pipeline
//! - [`layout`] — Differential-pair meander generation
//! - [`stackup`] — Stackup CSV parsing and replay

pub mod config;
pub mod edb;
pub mod error;
pub mod generator;
pub mod layout;
pub mod stackup;

pub use generator::{generate_layout, generate_layout_with, LayoutRequest, LayoutSummary};
