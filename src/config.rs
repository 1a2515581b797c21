//! Modeler settings - meshing policy, flags and solver options

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisOptions;
use crate::curves::CurveSwitches;
use crate::elements::{HeadStiffness, PileSpec};
use crate::error::{PileError, PileResult};
use crate::loads::LoadCase;
use crate::soil::SoilLayer;

pub const MIN_ELEMENTS_PER_LAYER: usize = 2;
pub const MAX_ELEMENTS_PER_LAYER: usize = 20;
pub const NUM_ELEMENTS_IN_AIR: usize = 4;
pub const NUM_PILE_ELEMENTS: usize = 20;
pub const MAX_PILES: usize = 3;

/// Discretization policy for the pile mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshPolicy {
    /// Lower bound on elements in any layer segment
    pub min_elements_per_layer: usize,
    /// Upper bound on elements in any layer segment
    pub max_elements_per_layer: usize,
    /// Equal elements over the free length above ground
    pub num_elements_in_air: usize,
    /// Nominal element count over the embedded length
    pub num_pile_elements: usize,
}

impl Default for MeshPolicy {
    fn default() -> Self {
        Self {
            min_elements_per_layer: MIN_ELEMENTS_PER_LAYER,
            max_elements_per_layer: MAX_ELEMENTS_PER_LAYER,
            num_elements_in_air: NUM_ELEMENTS_IN_AIR,
            num_pile_elements: NUM_PILE_ELEMENTS,
        }
    }
}

impl MeshPolicy {
    pub fn validate(&self) -> PileResult<()> {
        if self.min_elements_per_layer == 0 {
            return Err(PileError::InvalidInput(
                "at least one element per layer is required".to_string(),
            ));
        }
        if self.max_elements_per_layer < self.min_elements_per_layer {
            return Err(PileError::InvalidInput(format!(
                "max elements per layer ({}) is below the minimum ({})",
                self.max_elements_per_layer, self.min_elements_per_layer
            )));
        }
        if self.num_elements_in_air == 0 {
            return Err(PileError::InvalidInput(
                "at least one element above ground is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// All tunables of a [`crate::modeler::PileModeler`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelerSettings {
    pub mesh: MeshPolicy,
    /// Add a q-z spring at every pile tip
    pub use_toe_resistance: bool,
    /// Tie all pile heads to one rigid cap node
    pub assume_rigid_head: bool,
    pub switches: CurveSwitches,
    pub head_stiffness: HeadStiffness,
    /// Largest pile group accepted
    pub max_piles: usize,
    pub analysis: AnalysisOptions,
}

impl Default for ModelerSettings {
    fn default() -> Self {
        Self {
            mesh: MeshPolicy::default(),
            use_toe_resistance: false,
            assume_rigid_head: false,
            switches: CurveSwitches::default(),
            head_stiffness: HeadStiffness::default(),
            max_piles: MAX_PILES,
            analysis: AnalysisOptions::default(),
        }
    }
}

impl ModelerSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> PileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PileResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// A complete pile problem as exchanged with files and the HTTP service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileProblem {
    pub layers: Vec<SoilLayer>,
    pub piles: Vec<PileSpec>,
    #[serde(default)]
    pub gwt_depth: f64,
    pub load: LoadCase,
    #[serde(default)]
    pub settings: ModelerSettings,
}

impl PileProblem {
    pub fn from_json_str(json: &str) -> PileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PileResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
