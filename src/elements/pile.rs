//! Pile definition - geometry and material of one pile

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{PileError, PileResult};

/// Fixity of a pile head against the cap
///
/// Factors scale the head-link stiffness; 1.0 is a fully fixed head.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadFixity {
    /// Rotational fixity factor in (0, 1]
    pub rotational: f64,
    /// Translational fixity factor in (0, 1]
    pub translational: f64,
}

impl Default for HeadFixity {
    fn default() -> Self {
        Self {
            rotational: 1.0,
            translational: 1.0,
        }
    }
}

/// A single vertical pile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileSpec {
    /// Free length above the ground surface (m); shared by all piles of a group
    pub above_ground_length: f64,
    /// Embedded length below the ground surface (m)
    pub embedded_length: f64,
    /// Outer diameter (m)
    pub diameter: f64,
    /// Young's modulus (kPa)
    pub elastic_modulus: f64,
    /// Second moment of area (m⁴)
    pub moment_of_inertia: f64,
    /// Cross-sectional area (m²); solid circle when not given
    #[serde(default)]
    pub area: Option<f64>,
    /// Horizontal offset of the pile axis (m)
    #[serde(default)]
    pub x_offset: f64,
    /// Head connection to the cap
    #[serde(default)]
    pub head: HeadFixity,
}

impl PileSpec {
    /// Create a pile with a solid circular cross section
    pub fn circular(
        above_ground_length: f64,
        embedded_length: f64,
        diameter: f64,
        elastic_modulus: f64,
    ) -> Self {
        Self {
            above_ground_length,
            embedded_length,
            diameter,
            elastic_modulus,
            moment_of_inertia: PI * diameter.powi(4) / 64.0,
            area: None,
            x_offset: 0.0,
            head: HeadFixity::default(),
        }
    }

    /// Set the horizontal offset
    pub fn with_offset(mut self, x_offset: f64) -> Self {
        self.x_offset = x_offset;
        self
    }

    /// Set the head fixity factors
    pub fn with_head_fixity(mut self, rotational: f64, translational: f64) -> Self {
        self.head = HeadFixity {
            rotational,
            translational,
        };
        self
    }

    /// Cross-sectional area
    pub fn area(&self) -> f64 {
        self.area.unwrap_or(PI * self.diameter.powi(2) / 4.0)
    }

    /// Axial rigidity E·A
    pub fn ea(&self) -> f64 {
        self.elastic_modulus * self.area()
    }

    /// Flexural rigidity E·I
    pub fn ei(&self) -> f64 {
        self.elastic_modulus * self.moment_of_inertia
    }

    /// Torsional rigidity G·J with ν = 0.3 and J = 2I
    pub fn gj(&self) -> f64 {
        self.elastic_modulus / 2.6 * 2.0 * self.moment_of_inertia
    }

    /// Tip elevation (negative below ground)
    pub fn tip_z(&self) -> f64 {
        -self.embedded_length
    }

    /// Check geometry and material are physically meaningful
    pub fn validate(&self, index: usize) -> PileResult<()> {
        let positive = [
            ("embedded length", self.embedded_length),
            ("diameter", self.diameter),
            ("elastic modulus", self.elastic_modulus),
            ("moment of inertia", self.moment_of_inertia),
            ("area", self.area()),
        ];
        for (what, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PileError::InvalidGeometry(format!(
                    "pile {}: {} must be positive, got {}",
                    index, what, value
                )));
            }
        }
        if !(self.above_ground_length.is_finite() && self.above_ground_length >= 0.0) {
            return Err(PileError::InvalidGeometry(format!(
                "pile {}: above-ground length must be non-negative, got {}",
                index, self.above_ground_length
            )));
        }
        if !self.x_offset.is_finite() {
            return Err(PileError::InvalidGeometry(format!(
                "pile {}: x offset is not a number",
                index
            )));
        }
        for (what, value) in [
            ("rotational", self.head.rotational),
            ("translational", self.head.translational),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PileError::InvalidGeometry(format!(
                    "pile {}: {} head fixity must be in (0, 1], got {}",
                    index, what, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for PileSpec {
    fn default() -> Self {
        Self::circular(1.0, 20.0, 1.0, 25.0e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circular_section() {
        let pile = PileSpec::circular(1.0, 10.0, 0.6, 30.0e6);
        assert_relative_eq!(pile.area(), PI * 0.09, epsilon = 1e-12);
        assert_relative_eq!(pile.moment_of_inertia, PI * 0.6_f64.powi(4) / 64.0, epsilon = 1e-12);
        assert_eq!(pile.tip_z(), -10.0);
    }

    #[test]
    fn test_invalid_geometry() {
        let mut pile = PileSpec::default();
        pile.embedded_length = 0.0;
        assert!(matches!(pile.validate(0), Err(PileError::InvalidGeometry(_))));

        let pile = PileSpec::circular(1.0, 10.0, -0.5, 30.0e6);
        assert!(pile.validate(1).is_err());

        let pile = PileSpec::circular(1.0, 10.0, 0.5, 0.0);
        assert!(pile.validate(2).is_err());

        let pile = PileSpec::default().with_head_fixity(0.0, 1.0);
        assert!(pile.validate(3).is_err());
    }
}
