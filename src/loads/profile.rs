//! Free-field soil displacement profile

use serde::{Deserialize, Serialize};

use crate::soil::LayerTable;

/// Soil displacement over depth, given as percentages of the surface value
///
/// Percentages are defined at the ground surface (always 100), the first
/// and second layer interfaces and the base of the soil column, and are
/// interpolated linearly in between.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DispProfile {
    /// Horizontal soil displacement at the surface (m)
    pub surface_disp: f64,
    /// Percentage of the surface value at the layer 1-2 interface
    pub percentage_12: f64,
    /// Percentage of the surface value at the layer 2-3 interface
    pub percentage_23: f64,
    /// Percentage of the surface value at the base of the soil column
    pub percentage_base: f64,
}

impl DispProfile {
    pub fn new(
        surface_disp: f64,
        percentage_12: f64,
        percentage_23: f64,
        percentage_base: f64,
    ) -> Self {
        Self {
            surface_disp,
            percentage_12,
            percentage_23,
            percentage_base,
        }
    }

    /// Build from the list form `[surface, p12, p23, pbase]`; missing
    /// trailing entries are zero
    pub fn from_values(values: &[f64]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2), at(3))
    }

    /// (depth, percentage) markers for a layering
    ///
    /// Interfaces that do not exist in the layering have no marker.
    pub fn markers(&self, layers: &LayerTable) -> Vec<(f64, f64)> {
        let interfaces = layers.interface_depths();
        let mut markers = vec![(0.0, 100.0)];
        if interfaces.len() > 1 {
            markers.push((interfaces[0], self.percentage_12));
        }
        if interfaces.len() > 2 {
            markers.push((interfaces[1], self.percentage_23));
        }
        markers.push((layers.total_depth(), self.percentage_base));
        markers
    }

    /// Percentage of the surface displacement at a depth
    pub fn percentage_at(&self, depth: f64, layers: &LayerTable) -> f64 {
        let markers = self.markers(layers);
        if depth <= 0.0 {
            return 100.0;
        }
        for pair in markers.windows(2) {
            let ((d0, p0), (d1, p1)) = (pair[0], pair[1]);
            if depth <= d1 {
                let span = d1 - d0;
                if span <= 0.0 {
                    return p1;
                }
                return p0 + (p1 - p0) * (depth - d0) / span;
            }
        }
        self.percentage_base
    }

    /// Soil displacement at a depth
    pub fn displacement_at(&self, depth: f64, layers: &LayerTable) -> f64 {
        self.surface_disp * self.percentage_at(depth, layers) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::SoilLayer;
    use approx::assert_relative_eq;

    fn three_layers() -> LayerTable {
        LayerTable::with_layers(
            vec![
                SoilLayer::sand("A", 2.0, 30.0),
                SoilLayer::clay("B", 3.0, 40.0),
                SoilLayer::sand("C", 5.0, 35.0),
            ],
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_interpolates_between_markers() {
        let profile = DispProfile::new(0.1, 50.0, 20.0, 0.0);
        let layers = three_layers();

        assert_relative_eq!(profile.percentage_at(0.0, &layers), 100.0);
        assert_relative_eq!(profile.percentage_at(1.0, &layers), 75.0);
        assert_relative_eq!(profile.percentage_at(2.0, &layers), 50.0);
        assert_relative_eq!(profile.percentage_at(3.5, &layers), 35.0);
        assert_relative_eq!(profile.percentage_at(7.5, &layers), 10.0);
        assert_relative_eq!(profile.displacement_at(2.0, &layers), 0.05);
    }

    #[test]
    fn test_missing_interfaces_are_skipped() {
        let profile = DispProfile::new(0.1, 50.0, 20.0, 0.0);
        let single =
            LayerTable::with_layers(vec![SoilLayer::sand("Only", 10.0, 30.0)], 0.0).unwrap();

        assert_eq!(profile.markers(&single), vec![(0.0, 100.0), (10.0, 0.0)]);
        assert_relative_eq!(profile.percentage_at(5.0, &single), 50.0);
    }

    #[test]
    fn test_from_values_pads_with_zero() {
        let profile = DispProfile::from_values(&[0.2, 40.0]);
        assert_eq!(profile, DispProfile::new(0.2, 40.0, 0.0, 0.0));
    }
}
