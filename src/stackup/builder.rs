//! Replays parsed stackup records into a design database.

use crate::edb::{DesignDatabase, EdbResult, StackupLayer};

use super::LayerRecord;

/// What [`build_stackup`] did to the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Materials registered, in registration order.
    pub materials_added: Vec<String>,
    /// Layers appended, in stackup order.
    pub layers_added: Vec<String>,
}

/// Registers missing materials and appends one layer per record, in record order.
///
/// A material is registered only if the database does not already know its
/// name, so records sharing a material produce a single registration. The
/// properties of the first record naming a material win.
///
/// # Errors
///
/// Returns the first error the database reports. Nothing is retried.
pub fn build_stackup(
    db: &mut dyn DesignDatabase,
    layers: &[LayerRecord],
) -> EdbResult<BuildReport> {
    let mut report = BuildReport::default();

    for layer in layers {
        if !db.has_material(&layer.material) {
            db.add_material(layer.material())?;
            tracing::debug!(material = %layer.material, "Registered material");
            report.materials_added.push(layer.material.clone());
        }

        let thickness = layer.thickness().to_string();
        db.add_layer(StackupLayer {
            name: layer.name.clone(),
            layer_type: layer.layer_type.clone(),
            material: layer.material.clone(),
            thickness: thickness.clone(),
        })?;
        tracing::debug!(
            layer = %layer.name,
            layer_type = %layer.layer_type,
            material = %layer.material,
            thickness = %thickness,
            "Appended layer"
        );
        report.layers_added.push(layer.name.clone());
    }

    tracing::info!(
        layers = report.layers_added.len(),
        materials = report.materials_added.len(),
        "Built stackup"
    );

    Ok(report)
}
