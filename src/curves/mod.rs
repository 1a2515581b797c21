//! Soil spring backbone strategies
//!
//! The mesher decides *where* springs go and *what* local state they see;
//! a [`BackboneCurves`] implementation turns that state into the
//! curve-defining scalars. Closed-form p-y / t-z / q-z relations are
//! swapped by supplying a different strategy to the modeler.

mod simplified;

use serde::{Deserialize, Serialize};

use crate::elements::SpringParams;
use crate::soil::SoilLayer;

pub use simplified::SimplifiedCurves;

/// Formulation of the ultimate lateral resistance (`puSwitch`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuMethod {
    /// Broms-type capacity (three times the passive pressure)
    Broms,
    /// Plain Rankine passive pressure
    Rankine,
}

/// Variation of the initial p-y stiffness with depth (`kSwitch`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubgradeProfile {
    /// Stiffness grows linearly with depth (k·z)
    LinearWithDepth,
    /// Constant stiffness over depth (k·D)
    Constant,
}

/// Treatment of the water table in spring stiffness (`gwtSwitch`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterTableEffect {
    /// Reduce subgrade modulus of submerged soil
    Reduce,
    /// Same stiffness above and below the water table
    Ignore,
}

/// Curve-selection switches applied to every layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveSwitches {
    pub pu: PuMethod,
    pub k: SubgradeProfile,
    pub gwt: WaterTableEffect,
}

impl Default for CurveSwitches {
    fn default() -> Self {
        Self {
            pu: PuMethod::Broms,
            k: SubgradeProfile::LinearWithDepth,
            gwt: WaterTableEffect::Reduce,
        }
    }
}

/// Local state handed to a backbone strategy for one spring
#[derive(Debug, Clone, Copy)]
pub struct SpringInput<'a> {
    /// Depth below the surface (m, positive)
    pub depth: f64,
    /// Pile diameter (m)
    pub diameter: f64,
    /// Vertical effective stress at the spring (kPa)
    pub sigma_v: f64,
    /// Layer the spring sits in
    pub layer: &'a SoilLayer,
    /// Pile length represented by the spring (m)
    pub tributary_length: f64,
    /// Whether the spring lies below the water table
    pub below_water_table: bool,
    /// Active curve switches
    pub switches: CurveSwitches,
}

/// Strategy producing backbone parameters for the three spring kinds
///
/// All returned capacities are spring forces, i.e. already integrated over
/// `tributary_length` (the toe spring ignores it).
pub trait BackboneCurves: std::fmt::Debug + Send + Sync {
    /// Lateral p-y spring: (pult, y50)
    fn lateral(&self, input: &SpringInput<'_>) -> SpringParams;

    /// Shaft t-z spring: (tult, z50)
    fn shaft(&self, input: &SpringInput<'_>) -> SpringParams;

    /// Toe q-z spring: (qult, z50q)
    fn toe(&self, input: &SpringInput<'_>) -> SpringParams;
}
