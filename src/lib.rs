//! Pile FEA - finite element modeling of laterally and axially loaded piles
//!
//! This library builds and drives a plane finite element model of a pile
//! group embedded in layered soil:
//! - Layered soil column with a groundwater table and effective stress
//! - Layer-aware pile discretization with p-y, t-z and q-z soil springs
//! - Rigid or flexible pile cap connections
//! - Cap force, cap displacement and soil displacement profile loading
//! - Incremental nonlinear static analysis (load or displacement control)
//! - Per-pile result series for plotting
//!
//! ## Example
//! ```rust
//! use pile_fea::prelude::*;
//!
//! let mut modeler = PileModeler::<FrameDomain>::new();
//!
//! // Soil column: two layers, water table at 3 m
//! modeler
//!     .update_soil(vec![
//!         SoilLayer::sand("Loose sand", 4.0, 30.0),
//!         SoilLayer::clay("Stiff clay", 16.0, 60.0),
//!     ])
//!     .unwrap();
//! modeler.update_gw_table(3.0).unwrap();
//!
//! // One 0.6 m concrete pile, 1 m above ground and 12 m embedded
//! modeler
//!     .update_piles(vec![PileSpec::circular(1.0, 12.0, 0.6, 30.0e6)])
//!     .unwrap();
//!
//! // 50 kN at the pile head
//! modeler.update_load(50.0, 0.0, 0.0).unwrap();
//!
//! // Build, analyze and read the moment distribution
//! let status = modeler.run().unwrap();
//! assert!(status.is_success());
//! let moments = modeler.get_moment();
//! assert_eq!(moments.len(), 1);
//! ```

pub mod analysis;
pub mod config;
pub mod curves;
pub mod domain;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod mesh;
pub mod modeler;
pub mod results;
pub mod soil;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{AnalysisOptions, AnalysisType, ExitStatus};
    pub use crate::config::{MeshPolicy, ModelerSettings, PileProblem};
    pub use crate::curves::{BackboneCurves, CurveSwitches, SimplifiedCurves};
    pub use crate::domain::{FeaDomain, FrameDomain, RecordingDomain};
    pub use crate::elements::{HeadStiffness, PileSpec, SpringKind};
    pub use crate::error::{PileError, PileResult};
    pub use crate::loads::{DispProfile, LoadCase, LoadControlType};
    pub use crate::mesh::{Mesh, PileMesher};
    pub use crate::modeler::{ModelState, PileModeler};
    pub use crate::results::{PlotData, PlotQuantity, ResultSeries};
    pub use crate::soil::{LayerTable, SoilKind, SoilLayer};
}
