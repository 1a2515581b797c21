//! Soil layer - one stratum of the soil column

use serde::{Deserialize, Serialize};

/// Soil behaviour class used to pick the backbone formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoilKind {
    /// Cohesionless soil (friction angle governs)
    Sand,
    /// Cohesive soil (undrained strength governs)
    Clay,
}

impl Default for SoilKind {
    fn default() -> Self {
        Self::Sand
    }
}

/// A horizontal soil layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Layer name (for reports)
    pub name: String,
    /// Soil behaviour class
    pub kind: SoilKind,
    /// Layer thickness (m)
    pub thickness: f64,
    /// Moist unit weight above the water table (kN/m³)
    pub gamma: f64,
    /// Saturated unit weight below the water table (kN/m³)
    pub gamma_sat: f64,
    /// Friction angle (degrees)
    pub phi: f64,
    /// Cohesion / undrained shear strength (kPa)
    pub cohesion: f64,
    /// Modulus of subgrade reaction (kN/m³)
    pub subgrade_modulus: f64,
    /// Strain at half the maximum deviator stress (clays)
    pub eps50: f64,
}

impl SoilLayer {
    /// Create a new layer with explicit parameters
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        kind: SoilKind,
        thickness: f64,
        gamma: f64,
        gamma_sat: f64,
        phi: f64,
        cohesion: f64,
        subgrade_modulus: f64,
        eps50: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            thickness,
            gamma,
            gamma_sat,
            phi,
            cohesion,
            subgrade_modulus,
            eps50,
        }
    }

    /// Medium dense sand
    pub fn sand(name: &str, thickness: f64, phi: f64) -> Self {
        Self::new(name, SoilKind::Sand, thickness, 18.0, 20.0, phi, 0.0, 24_000.0, 0.0)
    }

    /// Soft to stiff clay
    pub fn clay(name: &str, thickness: f64, cohesion: f64) -> Self {
        Self::new(name, SoilKind::Clay, thickness, 17.0, 19.0, 0.0, cohesion, 27_000.0, 0.01)
    }

    /// Set unit weights
    pub fn with_unit_weights(mut self, gamma: f64, gamma_sat: f64) -> Self {
        self.gamma = gamma;
        self.gamma_sat = gamma_sat;
        self
    }

    /// Set subgrade modulus
    pub fn with_subgrade_modulus(mut self, k: f64) -> Self {
        self.subgrade_modulus = k;
        self
    }

    /// Friction angle in radians
    pub fn phi_rad(&self) -> f64 {
        self.phi.to_radians()
    }
}

impl Default for SoilLayer {
    fn default() -> Self {
        Self::sand("Layer", 10.0, 30.0)
    }
}
