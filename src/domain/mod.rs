//! Finite element domain contract
//!
//! [`FeaDomain`] is the only coupling point between the pile modeler and a
//! numerical solver: registration of nodes and elements, loads and imposed
//! displacements, a static solve, and response queries by tag.
//! [`FrameDomain`] is the plane-frame implementation shipped with the crate;
//! [`RecordingDomain`] stores calls and replays seeded responses.

mod frame;
mod recording;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, ExitStatus};
use crate::elements::{BeamSection, SpringLaw};
use crate::error::{PileError, PileResult};

pub use frame::FrameDomain;
pub use recording::{RecordedElement, RecordingDomain};

/// Node and element identifier
pub type Tag = usize;

/// Horizontal translation DOF
pub const DOF_X: usize = 0;
/// Vertical translation DOF
pub const DOF_Z: usize = 1;
/// In-plane rotation DOF
pub const DOF_R: usize = 2;

/// Why a static solve stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveFailure {
    DidNotConverge { step: usize, iterations: usize },
    Singular,
}

impl SolveFailure {
    /// Exit status recorded by the analysis driver
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::DidNotConverge { .. } => ExitStatus::DidNotConverge,
            Self::Singular => ExitStatus::SingularSystem,
        }
    }
}

impl From<SolveFailure> for PileError {
    fn from(failure: SolveFailure) -> Self {
        match failure {
            SolveFailure::DidNotConverge { step, iterations } => {
                PileError::SolverNonconvergence { step, iterations }
            }
            SolveFailure::Singular => PileError::SolverSingular,
        }
    }
}

/// Deformation and force of a zero-length spring
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpringResponse {
    /// Pile-side minus soil-side displacement
    pub deformation: f64,
    /// Spring force (positive in tension)
    pub force: f64,
}

/// Plane (x, z, rotation) finite element domain with a static solver
pub trait FeaDomain {
    /// Register a node at (x, z)
    fn add_node(&mut self, tag: Tag, x: f64, z: f64) -> PileResult<()>;

    /// Restrain node DOFs [UX, UZ, R]
    fn fix(&mut self, node: Tag, restraints: [bool; 3]) -> PileResult<()>;

    /// Elastic beam-column between two nodes
    fn add_beam_column(
        &mut self,
        tag: Tag,
        i_node: Tag,
        j_node: Tag,
        section: BeamSection,
    ) -> PileResult<()>;

    /// Zero-length nonlinear spring acting on one DOF between a pile node
    /// and a soil node
    fn add_spring(
        &mut self,
        tag: Tag,
        node: Tag,
        soil_node: Tag,
        dof: usize,
        law: SpringLaw,
    ) -> PileResult<()>;

    /// Zero-length elastic link with stiffness [kx, kz, kr]
    fn add_head_link(
        &mut self,
        tag: Tag,
        i_node: Tag,
        j_node: Tag,
        stiffness: [f64; 3],
    ) -> PileResult<()>;

    /// Kinematic tie: `slave` follows the rigid-body motion of `master`
    fn add_rigid_link(&mut self, master: Tag, slave: Tag) -> PileResult<()>;

    /// Remove all nodal loads and imposed displacements
    fn clear_loads(&mut self);

    /// Nodal load [FX, FZ, M] (accumulates)
    fn add_nodal_load(&mut self, node: Tag, load: [f64; 3]) -> PileResult<()>;

    /// Impose the final value of a DOF; the DOF becomes restrained
    fn impose_displacement(&mut self, node: Tag, dof: usize, value: f64) -> PileResult<()>;

    /// Run the static analysis through the full load history
    fn analyze(&mut self, options: &AnalysisOptions) -> Result<(), SolveFailure>;

    /// Converged nodal displacement [UX, UZ, R]
    fn node_displacement(&self, node: Tag) -> PileResult<[f64; 3]>;

    /// Converged reaction [FX, FZ, M] at restrained DOFs
    fn node_reaction(&self, node: Tag) -> PileResult<[f64; 3]>;

    /// Local end forces of a beam-column [N_i, V_i, M_i, N_j, V_j, M_j]
    fn beam_forces(&self, tag: Tag) -> PileResult<[f64; 6]>;

    /// Converged state of a zero-length spring
    fn spring_response(&self, tag: Tag) -> PileResult<SpringResponse>;
}
