//! Soil springs - zero-length nonlinear soil reaction elements

use serde::{Deserialize, Serialize};

/// Which soil reaction a spring represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpringKind {
    /// Lateral p-y spring (acts on the horizontal DOF)
    Lateral,
    /// Shaft friction t-z spring (acts on the vertical DOF)
    Shaft,
    /// Toe bearing q-z spring (vertical DOF, compression only)
    Toe,
}

impl SpringKind {
    /// Local DOF the spring acts on: 0 = horizontal, 1 = vertical
    pub fn dof(&self) -> usize {
        match self {
            Self::Lateral => 0,
            Self::Shaft | Self::Toe => 1,
        }
    }
}

/// Backbone-defining parameters of a soil spring
///
/// `ultimate` is the capacity of the spring (force, already multiplied by
/// the tributary length) and `y50` the deformation at half capacity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpringParams {
    pub ultimate: f64,
    pub y50: f64,
}

impl SpringParams {
    pub fn new(ultimate: f64, y50: f64) -> Self {
        Self { ultimate, y50 }
    }
}

/// atanh(0.5): scales the tanh backbone so that f(y50) = ultimate / 2
const HALF_CAPACITY: f64 = 0.549_306_144_334_054_9;

/// Tangent floor relative to the initial stiffness
const MIN_TANGENT_RATIO: f64 = 1e-6;

/// Force-deformation law of a zero-length spring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpringLaw {
    /// Smooth hyperbolic-tangent backbone `f = ult * tanh(c * y / y50)`
    Backbone {
        params: SpringParams,
        compression_only: bool,
    },
    /// Linear elastic spring
    Elastic { stiffness: f64 },
}

impl SpringLaw {
    /// Symmetric backbone law (p-y, t-z)
    pub fn backbone(params: SpringParams) -> Self {
        Self::Backbone {
            params,
            compression_only: false,
        }
    }

    /// Backbone that only resists negative (compressive) deformation (q-z)
    pub fn compression_backbone(params: SpringParams) -> Self {
        Self::Backbone {
            params,
            compression_only: true,
        }
    }

    /// Initial tangent stiffness
    pub fn initial_stiffness(&self) -> f64 {
        match *self {
            Self::Backbone { params, .. } => {
                if params.ultimate <= 0.0 || params.y50 <= 0.0 {
                    0.0
                } else {
                    params.ultimate * HALF_CAPACITY / params.y50
                }
            }
            Self::Elastic { stiffness } => stiffness,
        }
    }

    /// Force and tangent stiffness at deformation `y`
    pub fn response(&self, y: f64) -> (f64, f64) {
        match *self {
            Self::Backbone {
                params,
                compression_only,
            } => {
                let k0 = self.initial_stiffness();
                if k0 == 0.0 {
                    return (0.0, 0.0);
                }
                if compression_only && y > 0.0 {
                    return (0.0, k0 * MIN_TANGENT_RATIO);
                }
                let arg = HALF_CAPACITY * y / params.y50;
                let t = arg.tanh();
                let force = params.ultimate * t;
                let tangent = (k0 * (1.0 - t * t)).max(k0 * MIN_TANGENT_RATIO);
                (force, tangent)
            }
            Self::Elastic { stiffness } => (stiffness * y, stiffness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_half_capacity_at_y50() {
        let law = SpringLaw::backbone(SpringParams::new(100.0, 0.01));
        let (force, _) = law.response(0.01);
        assert_relative_eq!(force, 50.0, epsilon = 1e-9);
        let (force, _) = law.response(-0.01);
        assert_relative_eq!(force, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_capacity_bounded() {
        let law = SpringLaw::backbone(SpringParams::new(100.0, 0.01));
        let (force, tangent) = law.response(10.0);
        assert!(force <= 100.0);
        assert!(tangent > 0.0);
    }

    #[test]
    fn test_toe_ignores_uplift() {
        let law = SpringLaw::compression_backbone(SpringParams::new(500.0, 0.02));
        let (force, _) = law.response(0.05);
        assert_eq!(force, 0.0);
        let (force, _) = law.response(-0.02);
        assert_relative_eq!(force, -250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_capacity_spring_is_inert() {
        let law = SpringLaw::backbone(SpringParams::new(0.0, 0.01));
        assert_eq!(law.response(0.3), (0.0, 0.0));
    }
}
