//! Layer table - ordered soil column with a water table
//!
//! Layers are stacked top to bottom starting at the ground surface.
//! Depths are positive downward; the mesh works with signed elevations
//! (`z = -depth`) and converts at the boundary.

use serde::{Deserialize, Serialize};

use super::SoilLayer;
use crate::error::{PileError, PileResult};

/// Unit weight of water (kN/m³)
pub const GAMMA_WATER: f64 = 9.81;

/// Tolerance used when comparing depths against layer boundaries (m)
const DEPTH_TOL: f64 = 1e-9;

/// Ordered stack of soil layers plus the groundwater depth
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerTable {
    layers: Vec<SoilLayer>,
    gwt_depth: f64,
}

impl LayerTable {
    /// Create an empty table with the water table at the surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from layers and a water-table depth, fully validated
    pub fn with_layers(layers: Vec<SoilLayer>, gwt_depth: f64) -> PileResult<Self> {
        let mut table = Self::new();
        table.update_soil(layers)?;
        table.update_gw_table(gwt_depth)?;
        table.validate()?;
        Ok(table)
    }

    /// Replace the layer stack
    ///
    /// Individual layers are checked here; an empty stack is accepted and
    /// rejected later by [`LayerTable::validate`] when a build is attempted.
    pub fn update_soil(&mut self, layers: Vec<SoilLayer>) -> PileResult<()> {
        for (i, layer) in layers.iter().enumerate() {
            if layer.thickness <= 0.0 || !layer.thickness.is_finite() {
                return Err(PileError::InvalidLayering(format!(
                    "layer {} ('{}') has non-positive thickness {}",
                    i, layer.name, layer.thickness
                )));
            }
            if layer.gamma < 0.0 || layer.gamma_sat < 0.0 {
                return Err(PileError::InvalidLayering(format!(
                    "layer {} ('{}') has a negative unit weight",
                    i, layer.name
                )));
            }
            if layer.gamma_sat < GAMMA_WATER {
                return Err(PileError::InvalidLayering(format!(
                    "layer {} ('{}') saturated unit weight {} is below that of water",
                    i, layer.name, layer.gamma_sat
                )));
            }
        }
        self.layers = layers;
        Ok(())
    }

    /// Set the depth of the groundwater table below the surface
    pub fn update_gw_table(&mut self, depth: f64) -> PileResult<()> {
        if !depth.is_finite() || depth < 0.0 {
            return Err(PileError::InvalidLayering(format!(
                "water table depth {} must be a non-negative number",
                depth
            )));
        }
        self.gwt_depth = depth;
        Ok(())
    }

    /// Check the table is usable for a mesh build
    pub fn validate(&self) -> PileResult<()> {
        if self.layers.is_empty() {
            return Err(PileError::InvalidLayering("no soil layers defined".to_string()));
        }
        let total = self.total_depth();
        if self.gwt_depth > total + DEPTH_TOL {
            return Err(PileError::InvalidLayering(format!(
                "water table depth {} is below the soil column ({} m)",
                self.gwt_depth, total
            )));
        }
        Ok(())
    }

    /// Layers, top to bottom
    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    /// Layer by index
    pub fn layer(&self, index: usize) -> Option<&SoilLayer> {
        self.layers.get(index)
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Depth of the water table
    pub fn gwt_depth(&self) -> f64 {
        self.gwt_depth
    }

    /// Total thickness of the soil column
    pub fn total_depth(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness).sum()
    }

    /// Cumulative depths of the layer bottoms, top to bottom
    pub fn interface_depths(&self) -> Vec<f64> {
        let mut depth = 0.0;
        self.layers
            .iter()
            .map(|l| {
                depth += l.thickness;
                depth
            })
            .collect()
    }

    /// Whether a depth lies below the water table
    pub fn is_below_water_table(&self, depth: f64) -> bool {
        depth > self.gwt_depth + DEPTH_TOL
    }

    /// Index of the layer containing `depth`
    ///
    /// A depth on an interface belongs to the layer above it.
    pub fn layer_index_at(&self, depth: f64) -> PileResult<usize> {
        self.check_depth(depth)?;
        let mut bottom = 0.0;
        for (i, layer) in self.layers.iter().enumerate() {
            bottom += layer.thickness;
            if depth <= bottom + DEPTH_TOL {
                return Ok(i);
            }
        }
        Ok(self.layers.len() - 1)
    }

    /// Vertical effective stress at `depth` (kPa)
    ///
    /// Integrates unit weight from the surface, using the buoyant weight
    /// below the water table.
    pub fn effective_stress(&self, depth: f64) -> PileResult<f64> {
        self.check_depth(depth)?;
        let depth = depth.max(0.0);

        let mut sigma = 0.0;
        let mut top = 0.0;
        for layer in &self.layers {
            if top >= depth {
                break;
            }
            let bottom = (top + layer.thickness).min(depth);

            // dry part of this slice
            let dry_bottom = bottom.min(self.gwt_depth);
            if dry_bottom > top {
                sigma += layer.gamma * (dry_bottom - top);
            }
            // submerged part
            let wet_top = top.max(self.gwt_depth);
            if bottom > wet_top {
                sigma += (layer.gamma_sat - GAMMA_WATER) * (bottom - wet_top);
            }

            top += layer.thickness;
        }
        Ok(sigma)
    }

    fn check_depth(&self, depth: f64) -> PileResult<()> {
        if self.layers.is_empty() {
            return Err(PileError::InvalidLayering("no soil layers defined".to_string()));
        }
        if !depth.is_finite() || depth < -DEPTH_TOL {
            return Err(PileError::InvalidInput(format!(
                "depth {} must be at or below the ground surface",
                depth
            )));
        }
        let total = self.total_depth();
        if depth > total + DEPTH_TOL {
            return Err(PileError::InvalidLayering(format!(
                "depth {} exceeds the soil column ({} m)",
                depth, total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_layers() -> Vec<SoilLayer> {
        vec![
            SoilLayer::sand("Top", 2.0, 30.0),
            SoilLayer::clay("Middle", 3.0, 40.0),
            SoilLayer::sand("Bottom", 5.0, 35.0),
        ]
    }

    #[test]
    fn test_effective_stress_zero_at_surface() {
        let table = LayerTable::with_layers(three_layers(), 4.0).unwrap();
        assert_eq!(table.effective_stress(0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_effective_stress_across_water_table() {
        let table = LayerTable::with_layers(three_layers(), 4.0).unwrap();
        // 2 m sand at 18 + 2 m clay at 17 dry, 1 m clay submerged
        let expected = 2.0 * 18.0 + 2.0 * 17.0 + 1.0 * (19.0 - GAMMA_WATER);
        assert_relative_eq!(table.effective_stress(5.0).unwrap(), expected, epsilon = 1e-10);
    }

    #[test]
    fn test_effective_stress_monotonic() {
        let table = LayerTable::with_layers(three_layers(), 4.0).unwrap();
        let mut last = 0.0;
        for i in 0..=100 {
            let sigma = table.effective_stress(i as f64 * 0.1).unwrap();
            assert!(sigma >= last, "stress decreased at {}", i);
            last = sigma;
        }
    }

    #[test]
    fn test_depth_below_column_rejected() {
        let table = LayerTable::with_layers(three_layers(), 4.0).unwrap();
        assert!(matches!(
            table.effective_stress(10.5),
            Err(PileError::InvalidLayering(_))
        ));
    }

    #[test]
    fn test_empty_table_rejected() {
        let table = LayerTable::new();
        assert!(table.validate().is_err());
        assert!(table.effective_stress(1.0).is_err());
    }

    #[test]
    fn test_water_table_outside_column() {
        assert!(LayerTable::with_layers(three_layers(), 12.0).is_err());
        let mut table = LayerTable::new();
        assert!(table.update_gw_table(-1.0).is_err());
    }

    #[test]
    fn test_zero_thickness_rejected() {
        let mut table = LayerTable::new();
        let layers = vec![SoilLayer::sand("Thin", 0.0, 30.0)];
        assert!(table.update_soil(layers).is_err());
    }

    #[test]
    fn test_layer_lookup_on_interface() {
        let table = LayerTable::with_layers(three_layers(), 4.0).unwrap();
        assert_eq!(table.layer_index_at(0.0).unwrap(), 0);
        assert_eq!(table.layer_index_at(2.0).unwrap(), 0);
        assert_eq!(table.layer_index_at(2.5).unwrap(), 1);
        assert_eq!(table.layer_index_at(10.0).unwrap(), 2);
        assert_eq!(table.interface_depths(), vec![2.0, 5.0, 10.0]);
    }
}
