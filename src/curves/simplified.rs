//! Simplified closed-form backbone parameters
//!
//! Lateral capacity follows Broms (sand: 3·Kp·σv'·D) or Matlock (clay:
//! min(3 + σv'/c + J·z/D, 9)·c·D). Shaft friction uses the beta method in
//! sand and the API alpha method in clay; toe bearing uses Nq·σv' or 9·c.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{BackboneCurves, PuMethod, SpringInput, SubgradeProfile, WaterTableEffect};
use crate::elements::SpringParams;
use crate::soil::SoilKind;

/// atanh(0.5), relates y50 to the initial tangent of the spring law
const HALF_CAPACITY: f64 = 0.549_306_144_334_054_9;

/// Closed-form backbone strategy shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedCurves {
    /// Subgrade modulus multiplier for submerged soil
    pub submerged_k_factor: f64,
    /// Matlock's empirical J coefficient
    pub matlock_j: f64,
    /// Shaft z50 as a fraction of the diameter
    pub shaft_z50_ratio: f64,
    /// Toe z50 as a fraction of the diameter
    pub toe_z50_ratio: f64,
}

impl Default for SimplifiedCurves {
    fn default() -> Self {
        Self {
            submerged_k_factor: 0.6,
            matlock_j: 0.5,
            shaft_z50_ratio: 0.0025,
            toe_z50_ratio: 0.0125,
        }
    }
}

impl SimplifiedCurves {
    /// Ultimate lateral resistance per unit length (kN/m)
    pub fn lateral_capacity(&self, input: &SpringInput<'_>) -> f64 {
        let layer = input.layer;
        let d = input.diameter;
        match layer.kind {
            SoilKind::Sand => {
                let kp = passive_coefficient(layer.phi_rad());
                let factor = match input.switches.pu {
                    PuMethod::Broms => 3.0,
                    PuMethod::Rankine => 1.0,
                };
                factor * kp * input.sigma_v * d
            }
            SoilKind::Clay => {
                let c = layer.cohesion;
                match input.switches.pu {
                    PuMethod::Broms => {
                        if c <= 0.0 {
                            return 0.0;
                        }
                        let np = 3.0 + input.sigma_v / c + self.matlock_j * input.depth / d;
                        np.min(9.0) * c * d
                    }
                    PuMethod::Rankine => (input.sigma_v + 2.0 * c) * d,
                }
            }
        }
    }

    /// Initial p-y stiffness per unit length (kN/m²)
    pub fn lateral_stiffness(&self, input: &SpringInput<'_>) -> f64 {
        let mut k = input.layer.subgrade_modulus;
        if input.below_water_table && input.switches.gwt == WaterTableEffect::Reduce {
            k *= self.submerged_k_factor;
        }
        match input.switches.k {
            SubgradeProfile::LinearWithDepth => k * input.depth,
            SubgradeProfile::Constant => k * input.diameter,
        }
    }

    /// Ultimate shaft friction per unit area (kPa)
    pub fn unit_shaft_friction(&self, input: &SpringInput<'_>) -> f64 {
        let layer = input.layer;
        match layer.kind {
            SoilKind::Sand => {
                let phi = layer.phi_rad();
                let k0 = 1.0 - phi.sin();
                let delta = 0.8 * phi;
                k0 * input.sigma_v * delta.tan()
            }
            SoilKind::Clay => {
                let c = layer.cohesion;
                let alpha = if input.sigma_v <= 0.0 || c <= 0.0 {
                    1.0
                } else {
                    let psi = c / input.sigma_v;
                    let a = if psi <= 1.0 {
                        0.5 * psi.powf(-0.5)
                    } else {
                        0.5 * psi.powf(-0.25)
                    };
                    a.min(1.0)
                };
                alpha * c
            }
        }
    }

    /// Ultimate toe bearing pressure (kPa)
    pub fn unit_toe_bearing(&self, input: &SpringInput<'_>) -> f64 {
        let layer = input.layer;
        match layer.kind {
            SoilKind::Sand => {
                let phi = layer.phi_rad();
                let nq = (PI * phi.tan()).exp() * passive_coefficient(phi);
                nq * input.sigma_v
            }
            SoilKind::Clay => 9.0 * layer.cohesion,
        }
    }
}

impl BackboneCurves for SimplifiedCurves {
    fn lateral(&self, input: &SpringInput<'_>) -> SpringParams {
        let pu = self.lateral_capacity(input);
        let layer = input.layer;

        let y50 = if layer.kind == SoilKind::Clay && layer.eps50 > 0.0 {
            2.5 * layer.eps50 * input.diameter
        } else {
            let k_init = self.lateral_stiffness(input);
            if k_init > 0.0 {
                HALF_CAPACITY * pu / k_init
            } else {
                0.0
            }
        };

        SpringParams::new(pu * input.tributary_length, y50)
    }

    fn shaft(&self, input: &SpringInput<'_>) -> SpringParams {
        let perimeter = PI * input.diameter;
        let tult = self.unit_shaft_friction(input) * perimeter * input.tributary_length;
        SpringParams::new(tult, self.shaft_z50_ratio * input.diameter)
    }

    fn toe(&self, input: &SpringInput<'_>) -> SpringParams {
        let area = PI * input.diameter.powi(2) / 4.0;
        let qult = self.unit_toe_bearing(input) * area;
        SpringParams::new(qult, self.toe_z50_ratio * input.diameter)
    }
}

/// Rankine passive earth pressure coefficient tan²(45° + φ/2)
fn passive_coefficient(phi: f64) -> f64 {
    (PI / 4.0 + phi / 2.0).tan().powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::CurveSwitches;
    use crate::soil::SoilLayer;
    use approx::assert_relative_eq;

    fn input<'a>(layer: &'a SoilLayer, depth: f64, sigma_v: f64) -> SpringInput<'a> {
        SpringInput {
            depth,
            diameter: 0.5,
            sigma_v,
            layer,
            tributary_length: 0.5,
            below_water_table: false,
            switches: CurveSwitches::default(),
        }
    }

    #[test]
    fn test_sand_lateral_capacity() {
        let layer = SoilLayer::sand("Sand", 10.0, 30.0);
        let curves = SimplifiedCurves::default();
        let params = curves.lateral(&input(&layer, 2.0, 36.0));
        // Kp = 3 for phi = 30
        assert_relative_eq!(params.ultimate, 3.0 * 3.0 * 36.0 * 0.5 * 0.5, epsilon = 1e-9);
        assert!(params.y50 > 0.0);
    }

    #[test]
    fn test_clay_capacity_capped() {
        let layer = SoilLayer::clay("Clay", 30.0, 50.0);
        let curves = SimplifiedCurves::default();
        let deep = curves.lateral_capacity(&input(&layer, 25.0, 200.0));
        assert_relative_eq!(deep, 9.0 * 50.0 * 0.5, epsilon = 1e-9);
        let params = curves.lateral(&input(&layer, 25.0, 200.0));
        assert_relative_eq!(params.y50, 2.5 * 0.01 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_submerged_stiffness_reduced() {
        let layer = SoilLayer::sand("Sand", 10.0, 30.0);
        let curves = SimplifiedCurves::default();
        let dry = input(&layer, 5.0, 80.0);
        let wet = SpringInput {
            below_water_table: true,
            ..dry
        };
        assert_relative_eq!(
            curves.lateral_stiffness(&wet),
            0.6 * curves.lateral_stiffness(&dry),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_shaft_and_toe_grow_with_stress() {
        let layer = SoilLayer::sand("Sand", 10.0, 35.0);
        let curves = SimplifiedCurves::default();
        let shallow = input(&layer, 1.0, 18.0);
        let deep = input(&layer, 8.0, 100.0);
        assert!(curves.shaft(&deep).ultimate > curves.shaft(&shallow).ultimate);
        assert!(curves.toe(&deep).ultimate > curves.toe(&shallow).ultimate);
    }
}
