//! Stackup CSV parsing.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::{LayerRecord, UM_TO_MM};

const COL_NAME: &str = "Design Layer Name";
const COL_TYPE: &str = "Type";
const COL_MATERIAL: &str = "Material";
const COL_THICKNESS: &str = "Thickness (um)";
const COL_PERMITTIVITY: &str = "Relative Permittivity";
const COL_PERMEABILITY: &str = "Relative Permeability";
const COL_CONDUCTIVITY: &str = "Bulk Conductivity";
const COL_DIELECTRIC_LOSS: &str = "Dielectric Loss Tangent";
const COL_MAGNETIC_LOSS: &str = "Magnetic Loss Tangent";

/// Columns a stackup table must have in its header row.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_NAME,
    COL_THICKNESS,
    COL_MATERIAL,
    COL_PERMITTIVITY,
    COL_PERMEABILITY,
    COL_CONDUCTIVITY,
    COL_DIELECTRIC_LOSS,
    COL_MAGNETIC_LOSS,
    COL_TYPE,
];

/// Errors that can occur while reading a stackup table.
#[derive(Debug, Error)]
pub enum StackupError {
    /// The file could not be opened.
    #[error("failed to open stackup file: {path}")]
    FileRead {
        /// Path to the stackup file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The CSV data is malformed.
    #[error("malformed stackup CSV at line {line}")]
    Csv {
        /// 1-based line number of the offending record (0 for the header).
        line: u64,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// The header row lacks a required column.
    #[error("stackup CSV is missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },

    /// A numeric field could not be converted.
    #[error("line {line}: column '{column}' is not a number: '{value}'")]
    InvalidNumber {
        /// 1-based line number of the row.
        line: u64,
        /// Column holding the bad value.
        column: &'static str,
        /// The raw field contents.
        value: String,
    },
}

/// A CSV row before validation. Every field is optional so that rows without
/// a layer name can be skipped whatever else they contain.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Design Layer Name", default)]
    name: Option<String>,
    #[serde(rename = "Type", default)]
    layer_type: Option<String>,
    #[serde(rename = "Material", default)]
    material: Option<String>,
    #[serde(rename = "Thickness (um)", default)]
    thickness_um: Option<String>,
    #[serde(rename = "Relative Permittivity", default)]
    permittivity: Option<String>,
    #[serde(rename = "Relative Permeability", default)]
    permeability: Option<String>,
    #[serde(rename = "Bulk Conductivity", default)]
    conductivity: Option<String>,
    #[serde(rename = "Dielectric Loss Tangent", default)]
    dielectric_loss_tangent: Option<String>,
    #[serde(rename = "Magnetic Loss Tangent", default)]
    magnetic_loss_tangent: Option<String>,
}

impl RawRow {
    fn into_record(self, line: u64, name: String) -> Result<LayerRecord, StackupError> {
        let number = |column: &'static str, value: Option<String>| {
            let value = value.unwrap_or_default();
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| StackupError::InvalidNumber {
                    line,
                    column,
                    value: value.clone(),
                })
        };

        let thickness_um = number(COL_THICKNESS, self.thickness_um)?;

        Ok(LayerRecord {
            name,
            layer_type: self.layer_type.unwrap_or_default(),
            material: self.material.unwrap_or_default(),
            permittivity: number(COL_PERMITTIVITY, self.permittivity)?,
            permeability: number(COL_PERMEABILITY, self.permeability)?,
            conductivity: number(COL_CONDUCTIVITY, self.conductivity)?,
            dielectric_loss_tangent: number(COL_DIELECTRIC_LOSS, self.dielectric_loss_tangent)?,
            magnetic_loss_tangent: number(COL_MAGNETIC_LOSS, self.magnetic_loss_tangent)?,
            thickness_um,
            thickness_mm: thickness_um * UM_TO_MM,
        })
    }
}

/// Reads a stackup table from a CSV file.
///
/// Rows whose `Design Layer Name` is empty or absent are skipped; the
/// remaining rows are returned in file order.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The header lacks a required column
/// - A CSV record is malformed
/// - A numeric field of a retained row is not a number
pub fn parse_stackup(path: impl AsRef<Path>) -> Result<Vec<LayerRecord>, StackupError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| StackupError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let layers = read_stackup(file)?;

    tracing::info!(
        path = %path.display(),
        count = layers.len(),
        "Parsed stackup"
    );

    Ok(layers)
}

/// Reads a stackup table from any reader. See [`parse_stackup`].
///
/// # Errors
///
/// Same as [`parse_stackup`], minus the file-open failure.
pub fn read_stackup(reader: impl io::Read) -> Result<Vec<LayerRecord>, StackupError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| StackupError::Csv { line: 0, source: e })?
        .clone();
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(StackupError::MissingColumn { column: *column });
    }

    let mut layers = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| StackupError::Csv {
            line: e.position().map_or(0, csv::Position::line),
            source: e,
        })?;
        let line = record.position().map_or(0, csv::Position::line);

        let row: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|e| StackupError::Csv { line, source: e })?;

        let name = match row.name.clone() {
            Some(name) if !name.is_empty() => name,
            _ => {
                tracing::debug!(line, "Skipping row without a design layer name");
                continue;
            }
        };

        layers.push(row.into_record(line, name)?);
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Design Layer Name,Type,Material,Thickness (um),Relative Permittivity,\
Relative Permeability,Bulk Conductivity,Dielectric Loss Tangent,Magnetic Loss Tangent";

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn parse(body: &str) -> Result<Vec<LayerRecord>, StackupError> {
        read_stackup(format!("{HEADER}\n{body}").as_bytes())
    }

    #[test]
    fn parses_rows_in_order() {
        let layers = parse(
            "L01_TOP,signal,Copper,35,1,0.999991,58000000,0,0\n\
             D01,dielectric,FR4,100,4.4,1,0,0.02,0\n\
             L03_SIG1,signal,Copper,17.5,1,0.999991,58000000,0,0\n",
        )
        .unwrap();

        let names: Vec<_> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["L01_TOP", "D01", "L03_SIG1"]);
        assert_eq!(layers[1].material, "FR4");
        assert_eq!(layers[1].layer_type, "dielectric");
        assert!(approx_eq(layers[1].permittivity, 4.4));
        assert!(approx_eq(layers[1].dielectric_loss_tangent, 0.02));
        assert!(approx_eq(layers[0].conductivity, 5.8e7));
    }

    #[test]
    fn derives_thickness_in_mm() {
        let layers = parse("L1,signal,Copper,35,1,1,5.8e7,0,0\n").unwrap();
        assert!(approx_eq(layers[0].thickness_um, 35.0));
        assert!(approx_eq(layers[0].thickness_mm, 0.035));
        assert_eq!(layers[0].thickness().to_string(), "0.035mm");
    }

    #[test]
    fn skips_rows_without_name() {
        let layers = parse(
            ",,,,,,,,\n\
             L1,signal,Copper,35,1,1,5.8e7,0,0\n\
             ,dielectric,FR4,not-a-number,4.4,1,0,0.02,0\n\
             L2,signal,Copper,35,1,1,5.8e7,0,0\n\
             ,\n",
        )
        .unwrap();
        let names: Vec<_> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["L1", "L2"]);
    }

    #[test]
    fn ignores_extra_columns() {
        let csv = "Layer #,Design Layer Name,Type,Material,Thickness (um),Relative Permittivity,\
Relative Permeability,Bulk Conductivity,Dielectric Loss Tangent,Magnetic Loss Tangent,Comment\n\
1,L1,signal,Copper,12,1,1,5.8e7,0,0,top\n";
        let layers = read_stackup(csv.as_bytes()).unwrap();
        assert_eq!(layers.len(), 1);
        assert!(approx_eq(layers[0].thickness_mm, 0.012));
    }

    #[test]
    fn tolerates_whitespace_around_numbers() {
        let layers = parse("L1,signal,Copper, 35 ,1,1,5.8e7,0,0\n").unwrap();
        assert!(approx_eq(layers[0].thickness_mm, 0.035));
    }

    #[test]
    fn rejects_non_numeric_field() {
        let err = parse("L1,signal,Copper,thick,1,1,5.8e7,0,0\n").unwrap_err();
        match err {
            StackupError::InvalidNumber {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, "Thickness (um)");
                assert_eq!(value, "thick");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_missing_numeric_field() {
        let err = parse("L1,signal,Copper,35,1,1,5.8e7,0\n").unwrap_err();
        assert!(matches!(
            err,
            StackupError::InvalidNumber {
                column: "Magnetic Loss Tangent",
                ..
            }
        ));
    }

    #[test]
    fn rejects_missing_column() {
        let err = read_stackup("Design Layer Name,Type\nL1,signal\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StackupError::MissingColumn { .. }));
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let err = parse_stackup("/definitely/not/here/stackup.csv").unwrap_err();
        assert!(matches!(err, StackupError::FileRead { .. }));
        assert!(err.to_string().contains("stackup.csv"));
    }

    #[test]
    fn empty_table_yields_no_layers() {
        assert!(parse("").unwrap().is_empty());
    }
}
