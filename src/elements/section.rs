//! Beam-column section properties

use serde::{Deserialize, Serialize};

/// Stiffness of a 2D beam-column segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamSection {
    /// Axial rigidity E·A (kN)
    pub ea: f64,
    /// Flexural rigidity E·I (kN·m²)
    pub ei: f64,
    /// Torsional rigidity G·J (kN·m²); carried for reports, unused in plane analysis
    pub gj: f64,
}

impl BeamSection {
    /// Create a new section
    pub fn new(ea: f64, ei: f64, gj: f64) -> Self {
        Self { ea, ei, gj }
    }
}

/// Stiffness summary of the pile cap and the pile-head connections
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadStiffness {
    /// Flexural rigidity of the cap (kN·m²)
    pub ei: f64,
    /// Axial rigidity of the cap (kN)
    pub ea: f64,
    /// Torsional rigidity of the cap (kN·m²)
    pub gj: f64,
}

impl HeadStiffness {
    /// Cap beam section
    pub fn section(&self) -> BeamSection {
        BeamSection::new(self.ea, self.ei, self.gj)
    }
}

impl Default for HeadStiffness {
    fn default() -> Self {
        Self {
            ei: 1.0e9,
            ea: 1.0e9,
            gj: 1.0e12,
        }
    }
}
