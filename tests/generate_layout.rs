//! End-to-end tests for layout generation with the file backend.
//!
//! These tests write a stackup CSV, run the full pipeline and inspect the
//! resulting `design.json`.

use std::path::{Path, PathBuf};

use layout_generator::edb::file::{Design, DESIGN_FILE};
use layout_generator::edb::{EdbError, LayerType};
use layout_generator::error::LayoutError;
use layout_generator::layout::TraceGeometry;
use layout_generator::stackup::StackupError;
use layout_generator::{generate_layout, LayoutRequest};
use tempfile::TempDir;

const HEADER: &str = "Design Layer Name,Type,Material,Thickness (um),Relative Permittivity,\
Relative Permeability,Bulk Conductivity,Dielectric Loss Tangent,Magnetic Loss Tangent";

const FOUR_LAYER: &str = "\
L01_TOP,signal,Copper,35,1,0.999991,58000000,0,0
D01,dielectric,FR4,100,4.4,1,0,0.02,0
L02_GND,signal,Copper,35,1,0.999991,58000000,0,0
D02,dielectric,FR4,200,4.4,1,0,0.02,0
,,,,,,,,
L03_SIG1,signal,Copper,17.5,1,0.999991,58000000,0,0
";

/// Helper to compare floats with tolerance.
fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn write_csv(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("stackup.csv");
    std::fs::write(&path, format!("{HEADER}\n{body}")).expect("Failed to write CSV");
    path
}

fn request(csv: PathBuf, output: PathBuf, geometry: TraceGeometry) -> LayoutRequest {
    LayoutRequest {
        csv,
        output,
        geometry,
        edb_version: None,
    }
}

fn read_design(output: &Path) -> Design {
    Design::read(&output.join(DESIGN_FILE)).expect("Failed to read design")
}

#[test]
fn minimal_stackup_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, "L1,signal,Copper,10,1,1,58000000,0,0\n");
    let output = dir.path().join("board.aedb");

    let summary = generate_layout(
        &request(csv, output.clone(), TraceGeometry::new(0.2, 0.1)),
        "file",
    )
    .unwrap();

    assert_eq!(summary.layers, 1);
    assert_eq!(summary.materials_added, 1);
    assert_eq!(summary.traces, 2);

    let design = read_design(&output);
    assert_eq!(design.materials.len(), 1);
    assert!(design.materials.contains_key("Copper"));
    assert_eq!(design.layers.len(), 1);
    assert_eq!(design.layers[0].name, "L1");
    assert_eq!(design.layers[0].material, "Copper");
    assert!(approx_eq(design.layers[0].thickness_mm, 0.01));
    let nets: Vec<_> = design.traces.iter().map(|t| t.net.as_str()).collect();
    assert_eq!(nets, ["diff_p", "diff_n"]);
    assert!(design.traces.iter().all(|t| t.layer == "L03_SIG1"));
    assert_eq!(design.traces[0].points.len(), 5);
}

#[test]
fn stackup_order_and_material_dedup() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");

    generate_layout(
        &request(csv, output.clone(), TraceGeometry::new(0.2, 0.1)),
        "file",
    )
    .unwrap();

    let design = read_design(&output);
    let names: Vec<_> = design.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["L01_TOP", "D01", "L02_GND", "D02", "L03_SIG1"]);
    let materials: Vec<_> = design.materials.keys().map(String::as_str).collect();
    assert_eq!(materials, ["Copper", "FR4"]);
    assert_eq!(design.layers[1].layer_type, LayerType::Dielectric);
    assert!(approx_eq(design.layers[4].thickness_mm, 0.0175));
}

#[test]
fn traces_follow_meander_and_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");
    let geometry = TraceGeometry {
        intra_height: 0.5,
        intra_count: 2,
        ..TraceGeometry::new(0.2, 0.1)
    };

    generate_layout(&request(csv, output.clone(), geometry), "file").unwrap();

    let design = read_design(&output);
    let positive = &design.traces[0];
    let negative = &design.traces[1];
    assert_eq!(positive.points.len(), 9);
    assert_eq!(negative.points.len(), 9);
    assert!(approx_eq(positive.points[0].x, 0.0));
    assert!(approx_eq(positive.points[0].y, 0.15));
    assert!(approx_eq(negative.points[0].y, -0.15));
    for (p, n) in positive.points.iter().zip(&negative.points) {
        assert!(approx_eq(p.x, n.x));
        assert!(approx_eq(p.y - n.y, 0.3));
    }
    assert!(approx_eq(positive.width, 0.2));
    assert_eq!(positive.layer, "L03_SIG1");
}

#[test]
fn version_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");
    let mut req = request(csv, output.clone(), TraceGeometry::new(0.2, 0.1));
    req.edb_version = Some("2024.1".to_string());

    generate_layout(&req, "file").unwrap();

    assert_eq!(read_design(&output).tool_version.as_deref(), Some("2024.1"));
}

#[test]
fn failed_run_leaves_no_saved_design() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, "L01_TOP,signal,Copper,35,1,1,58000000,0,0\n");
    let output = dir.path().join("board.aedb");
    let geometry = TraceGeometry::new(-0.2, 0.1);

    let err = generate_layout(&request(csv, output.clone(), geometry), "file").unwrap_err();

    assert!(matches!(err, LayoutError::Edb(EdbError::InvalidGeometry { .. })));
    assert!(!output.join(DESIGN_FILE).exists());
}

#[test]
fn rerun_after_failed_run_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");
    let bad = TraceGeometry::new(0.0, 0.1);
    assert!(generate_layout(&request(csv.clone(), output.clone(), bad), "file").is_err());

    generate_layout(&request(csv, output.clone(), TraceGeometry::new(0.2, 0.1)), "file")
        .unwrap();

    assert_eq!(read_design(&output).traces.len(), 2);
}

#[test]
fn invalid_layer_type_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, "L03_SIG1,wormhole,Copper,35,1,1,58000000,0,0\n");
    let output = dir.path().join("board.aedb");

    let err = generate_layout(
        &request(csv, output.clone(), TraceGeometry::new(0.2, 0.1)),
        "file",
    )
    .unwrap_err();

    assert!(matches!(err, LayoutError::Edb(EdbError::InvalidLayerType { .. })));
    assert!(!output.join(DESIGN_FILE).exists());
}

#[test]
fn zero_meanders_rejected_by_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");
    let geometry = TraceGeometry {
        intra_count: 0,
        ..TraceGeometry::new(0.2, 0.1)
    };

    let err = generate_layout(&request(csv, output.clone(), geometry), "file").unwrap_err();

    assert!(matches!(err, LayoutError::Edb(EdbError::InvalidGeometry { .. })));
    assert!(!output.join(DESIGN_FILE).exists());
}

#[test]
fn unavailable_backend_fails_before_opening() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");

    let err = generate_layout(
        &request(csv, output.clone(), TraceGeometry::new(0.2, 0.1)),
        "ansys",
    )
    .unwrap_err();

    assert!(matches!(err, LayoutError::Edb(EdbError::BackendUnavailable { .. })));
    assert!(!output.exists());
}

#[test]
fn missing_csv_fails_before_opening() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("board.aedb");

    let err = generate_layout(
        &request(
            dir.path().join("missing.csv"),
            output.clone(),
            TraceGeometry::new(0.2, 0.1),
        ),
        "file",
    )
    .unwrap_err();

    assert!(matches!(err, LayoutError::Stackup(StackupError::FileRead { .. })));
    assert!(!output.exists());
}

#[test]
fn rerun_on_existing_database_reuses_materials() {
    let dir = tempfile::tempdir().unwrap();
    let first_csv = write_csv(&dir, FOUR_LAYER);
    let output = dir.path().join("board.aedb");
    generate_layout(
        &request(first_csv, output.clone(), TraceGeometry::new(0.2, 0.1)),
        "file",
    )
    .unwrap();

    // A second run appending a differently named layer of a known material.
    let second_dir = tempfile::tempdir().unwrap();
    let second_csv = write_csv(&second_dir, "L04_BOT,signal,Copper,35,1,1,58000000,0,0\n");
    let summary = generate_layout(
        &request(second_csv, output.clone(), TraceGeometry::new(0.2, 0.1)),
        "file",
    )
    .unwrap();

    assert_eq!(summary.materials_added, 0);
    let design = read_design(&output);
    assert_eq!(design.layers.len(), 6);
    assert_eq!(design.traces.len(), 4);
}
