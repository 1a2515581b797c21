//! Pile modeler - staged model build, analysis and result extraction
//!
//! The modeler owns the inputs (layers, piles, load case, settings), the
//! mesh, the finite element domain and the plot table. Stages run in a
//! fixed order tracked by [`ModelState`]:
//!
//! ```text
//! Empty --build_mesh--> MeshBuilt --build_load--> LoadBuilt --do_analysis--> Analyzed
//! ```
//!
//! Changing an input moves the state back to the last stage that is still
//! valid: geometry, soil and settings changes invalidate everything, a load
//! change keeps the mesh, and an analysis-type change keeps the loads.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisOptions, AnalysisType, ExitStatus};
use crate::config::{ModelerSettings, PileProblem};
use crate::curves::{BackboneCurves, CurveSwitches, SimplifiedCurves};
use crate::domain::{FeaDomain, FrameDomain};
use crate::elements::PileSpec;
use crate::error::{PileError, PileResult};
use crate::loads::{DispProfile, LoadBuilder, LoadCase, LoadControlType};
use crate::mesh::{Mesh, PileMesher};
use crate::results::{PlotData, PlotQuantity, ResultSeries};
use crate::soil::{LayerTable, SoilLayer};

/// Build stage reached by the model
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ModelState {
    #[default]
    Empty,
    MeshBuilt,
    LoadBuilt,
    Analyzed,
}

/// Pile group model driven through the build stages
pub struct PileModeler<D: FeaDomain + Default = FrameDomain> {
    settings: ModelerSettings,
    curves: Box<dyn BackboneCurves>,
    layers: LayerTable,
    piles: Vec<PileSpec>,
    load: LoadCase,
    mesh: Option<Mesh>,
    domain: D,
    state: ModelState,
    exit_status: ExitStatus,
    plot_data: PlotData,
    loaded_nodes: usize,
}

impl<D: FeaDomain + Default> Default for PileModeler<D> {
    fn default() -> Self {
        Self::with_settings(ModelerSettings::default())
    }
}

impl<D: FeaDomain + Default> PileModeler<D> {
    /// Create an empty modeler with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ModelerSettings) -> Self {
        Self {
            settings,
            curves: Box::new(SimplifiedCurves::default()),
            layers: LayerTable::new(),
            piles: Vec::new(),
            load: LoadCase::default(),
            mesh: None,
            domain: D::default(),
            state: ModelState::Empty,
            exit_status: ExitStatus::NotRun,
            plot_data: PlotData::new(),
            loaded_nodes: 0,
        }
    }

    /// Replace the backbone curve strategy
    pub fn with_curves(mut self, curves: Box<dyn BackboneCurves>) -> Self {
        self.curves = curves;
        self.invalidate(ModelState::Empty);
        self
    }

    /// Set up a modeler from a complete problem description
    pub fn from_problem(problem: &PileProblem) -> PileResult<Self> {
        let mut modeler = Self::with_settings(problem.settings.clone());
        modeler.settings.analysis.validate()?;
        modeler.update_soil(problem.layers.clone())?;
        modeler.update_gw_table(problem.gwt_depth)?;
        modeler.update_piles(problem.piles.clone())?;
        modeler.set_load(problem.load.clone())?;
        Ok(modeler)
    }

    // ----- state -----

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Move back to `cap` if the model is further along
    fn invalidate(&mut self, cap: ModelState) {
        if self.state > cap {
            debug!("Model state {:?} -> {:?}", self.state, cap);
            self.state = cap;
        }
        if cap == ModelState::Empty {
            self.mesh = None;
            self.domain = D::default();
            self.loaded_nodes = 0;
        }
        if self.state != ModelState::Analyzed {
            self.plot_data.clear();
        }
    }

    fn require(&self, required: ModelState) -> PileResult<()> {
        if self.state >= required {
            Ok(())
        } else {
            Err(PileError::Sequencing {
                required,
                actual: self.state,
            })
        }
    }

    // ----- inputs -----

    pub fn settings(&self) -> &ModelerSettings {
        &self.settings
    }

    /// Replace all settings
    pub fn update_settings(&mut self, settings: ModelerSettings) -> PileResult<()> {
        settings.mesh.validate()?;
        settings.analysis.validate()?;
        self.settings = settings;
        self.invalidate(ModelState::Empty);
        Ok(())
    }

    /// Restore the default settings and a zero force load
    pub fn set_default_parameters(&mut self) {
        self.settings = ModelerSettings::default();
        self.load = LoadCase::default();
        self.invalidate(ModelState::Empty);
    }

    pub fn set_use_toe_resistance(&mut self, on: bool) {
        self.settings.use_toe_resistance = on;
        self.invalidate(ModelState::Empty);
    }

    pub fn set_rigid_head(&mut self, on: bool) {
        self.settings.assume_rigid_head = on;
        self.invalidate(ModelState::Empty);
    }

    pub fn set_curve_switches(&mut self, switches: CurveSwitches) {
        self.settings.switches = switches;
        self.invalidate(ModelState::Empty);
    }

    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    /// Replace the soil layers
    pub fn update_soil(&mut self, layers: Vec<SoilLayer>) -> PileResult<()> {
        self.layers.update_soil(layers)?;
        self.invalidate(ModelState::Empty);
        Ok(())
    }

    /// Set the groundwater depth
    pub fn update_gw_table(&mut self, depth: f64) -> PileResult<()> {
        self.layers.update_gw_table(depth)?;
        self.invalidate(ModelState::Empty);
        Ok(())
    }

    pub fn piles(&self) -> &[PileSpec] {
        &self.piles
    }

    pub fn pile(&self, index: usize) -> PileResult<&PileSpec> {
        self.piles.get(index).ok_or(PileError::PileIndex(index))
    }

    /// Replace the pile group
    pub fn update_piles(&mut self, piles: Vec<PileSpec>) -> PileResult<()> {
        if piles.len() > self.settings.max_piles {
            return Err(PileError::InvalidGeometry(format!(
                "{} piles exceed the limit of {}",
                piles.len(),
                self.settings.max_piles
            )));
        }
        for (index, pile) in piles.iter().enumerate() {
            pile.validate(index)?;
        }
        self.piles = piles;
        self.invalidate(ModelState::Empty);
        Ok(())
    }

    /// Replace one pile of the group
    pub fn update_pile(&mut self, index: usize, pile: PileSpec) -> PileResult<()> {
        pile.validate(index)?;
        let slot = self.piles.get_mut(index).ok_or(PileError::PileIndex(index))?;
        *slot = pile;
        self.invalidate(ModelState::Empty);
        Ok(())
    }

    pub fn load(&self) -> &LoadCase {
        &self.load
    }

    pub fn load_type(&self) -> LoadControlType {
        self.load.control_type()
    }

    /// Switch the load-control mode; the previous load is discarded
    pub fn set_load_type(&mut self, mode: LoadControlType) {
        self.load = LoadCase::zero(mode);
        self.invalidate(ModelState::MeshBuilt);
    }

    /// Replace the load case, switching mode as needed
    pub fn set_load(&mut self, load: LoadCase) -> PileResult<()> {
        load.validate()?;
        self.load = load;
        self.invalidate(ModelState::MeshBuilt);
        Ok(())
    }

    fn update_active(&mut self, load: LoadCase) -> PileResult<()> {
        let active = self.load.control_type();
        if load.control_type() != active {
            return Err(PileError::InvalidInput(format!(
                "{} values given while the load mode is {}",
                load.control_type(),
                active
            )));
        }
        self.set_load(load)
    }

    /// Cap force: horizontal `p`, vertical `pv` (positive down) and moment
    pub fn update_load(&mut self, p: f64, pv: f64, moment: f64) -> PileResult<()> {
        self.update_active(LoadCase::Force { p, pv, moment })
    }

    /// Cap displacement
    pub fn update_displacement(&mut self, ux: f64, uz: f64) -> PileResult<()> {
        self.update_active(LoadCase::Displacement { ux, uz })
    }

    /// Soil displacement profile
    pub fn update_disp_profile(&mut self, profile: DispProfile) -> PileResult<()> {
        self.update_active(LoadCase::SoilProfile(profile))
    }

    /// Select the analysis scheme by name, e.g. `"load-control"`
    pub fn set_analysis_type(&mut self, name: &str) -> PileResult<()> {
        let analysis_type: AnalysisType = name.parse()?;
        self.settings.analysis.analysis_type = analysis_type;
        self.invalidate(ModelState::LoadBuilt);
        Ok(())
    }

    pub fn set_analysis_options(&mut self, options: AnalysisOptions) -> PileResult<()> {
        options.validate()?;
        self.settings.analysis = options;
        self.invalidate(ModelState::LoadBuilt);
        Ok(())
    }

    // ----- stages -----

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Mutable domain access, e.g. to seed a stub domain
    pub fn domain_mut(&mut self) -> &mut D {
        &mut self.domain
    }

    /// Node elevations of one pile, head to tip
    pub fn node_depths(&self, pile: usize) -> PileResult<Vec<f64>> {
        self.require(ModelState::MeshBuilt)?;
        self.mesh
            .as_ref()
            .and_then(|mesh| mesh.pile(pile))
            .map(|p| p.depths())
            .ok_or(PileError::PileIndex(pile))
    }

    /// Discretize the piles and register the mesh in a fresh domain
    ///
    /// On error the previous mesh, domain and state are kept.
    pub fn build_mesh(&mut self) -> PileResult<()> {
        let mesh = PileMesher::new(&self.settings, self.curves.as_ref())
            .build(&self.piles, &self.layers)?;
        let mut domain = D::default();
        mesh.emit(&mut domain)?;

        self.mesh = Some(mesh);
        self.domain = domain;
        self.loaded_nodes = 0;
        self.state = ModelState::MeshBuilt;
        self.plot_data.clear();
        info!("Mesh built for {} pile(s)", self.piles.len());
        Ok(())
    }

    /// Apply the active load case to the domain
    pub fn build_load(&mut self) -> PileResult<()> {
        self.require(ModelState::MeshBuilt)?;
        let mesh = self.mesh.as_ref().ok_or(PileError::Sequencing {
            required: ModelState::MeshBuilt,
            actual: self.state,
        })?;

        self.state = ModelState::MeshBuilt;
        self.plot_data.clear();
        self.loaded_nodes =
            LoadBuilder::new(mesh, &self.layers).apply(&self.load, &mut self.domain)?;
        self.state = ModelState::LoadBuilt;
        info!(
            "{} load built on {} node(s)",
            self.load.control_type(),
            self.loaded_nodes
        );
        Ok(())
    }

    /// Number of nodes carrying the current load
    pub fn num_loaded_nodes(&self) -> usize {
        self.loaded_nodes
    }

    /// Check the analysis can run with the current options
    pub fn build_analysis(&mut self) -> PileResult<()> {
        self.require(ModelState::LoadBuilt)?;
        self.settings.analysis.validate()?;
        debug!(
            "Analysis ready: {}, {} increments",
            self.settings.analysis.analysis_type, self.settings.analysis.num_increments
        );
        Ok(())
    }

    /// Run the static analysis and extract the plot data
    ///
    /// The outcome is recorded for [`Self::get_exit_status`]. A model that is
    /// not loaded yet records [`ExitStatus::NotReady`]; a solver failure
    /// records its status and leaves the model at [`ModelState::LoadBuilt`].
    pub fn do_analysis(&mut self) -> PileResult<ExitStatus> {
        if let Err(err) = self.build_analysis() {
            self.exit_status = ExitStatus::NotReady;
            warn!("Analysis not ready: {}", err);
            return Err(err);
        }

        self.state = ModelState::LoadBuilt;
        self.plot_data.clear();
        match self.domain.analyze(&self.settings.analysis) {
            Ok(()) => {
                self.exit_status = ExitStatus::Success;
                self.state = ModelState::Analyzed;
                info!("Analysis converged");
                self.extract_plot_data()?;
                Ok(self.exit_status)
            }
            Err(failure) => {
                self.exit_status = failure.exit_status();
                warn!("Analysis failed: {}", self.exit_status);
                Err(failure.into())
            }
        }
    }

    /// Build every missing stage and analyze
    pub fn run(&mut self) -> PileResult<ExitStatus> {
        if self.state < ModelState::MeshBuilt {
            self.build_mesh()?;
        }
        if self.state < ModelState::LoadBuilt {
            self.build_load()?;
        }
        self.do_analysis()
    }

    /// Status of the last analysis attempt
    pub fn get_exit_status(&self) -> ExitStatus {
        self.exit_status
    }

    // ----- results -----

    /// Rebuild the plot table from the solved domain
    ///
    /// The table is cleared first and stays empty unless the model has been
    /// analyzed successfully.
    pub fn extract_plot_data(&mut self) -> PileResult<()> {
        self.plot_data.clear();
        self.require(ModelState::Analyzed)?;
        let mesh = self.mesh.as_ref().ok_or(PileError::Sequencing {
            required: ModelState::MeshBuilt,
            actual: self.state,
        })?;
        self.plot_data = PlotData::extract(mesh, &self.domain)?;
        debug!("Extracted plot data for {} pile(s)", self.plot_data.num_piles());
        Ok(())
    }

    /// Discard all result series
    pub fn clear_plot_buffers(&mut self) {
        self.plot_data.clear();
    }

    pub fn plot_data(&self) -> &PlotData {
        &self.plot_data
    }

    pub fn get_lateral_displacements(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::LateralDisplacement)
    }

    pub fn get_axial_displacements(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::AxialDisplacement)
    }

    pub fn get_moment(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Moment)
    }

    pub fn get_shear(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Shear)
    }

    pub fn get_force(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::AxialForce)
    }

    pub fn get_stress(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Stress)
    }

    pub fn get_pult(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Pult)
    }

    pub fn get_y50(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Y50)
    }

    pub fn get_tult(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Tult)
    }

    pub fn get_z50(&self) -> Vec<&ResultSeries> {
        self.plot_data.collection(PlotQuantity::Z50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordingDomain, SolveFailure};

    fn stub_modeler() -> PileModeler<RecordingDomain> {
        let mut modeler = PileModeler::<RecordingDomain>::new();
        modeler
            .update_soil(vec![SoilLayer::sand("Sand", 15.0, 32.0)])
            .unwrap();
        modeler
            .update_piles(vec![PileSpec::circular(1.0, 10.0, 0.6, 30.0e6)])
            .unwrap();
        modeler
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut modeler = stub_modeler();
        assert_eq!(modeler.get_exit_status(), ExitStatus::NotRun);
        assert!(matches!(
            modeler.build_load(),
            Err(PileError::Sequencing {
                required: ModelState::MeshBuilt,
                actual: ModelState::Empty
            })
        ));
        assert!(modeler.do_analysis().is_err());
        assert_eq!(modeler.get_exit_status(), ExitStatus::NotReady);

        modeler.build_mesh().unwrap();
        assert!(modeler.do_analysis().is_err());
        modeler.build_load().unwrap();
        assert_eq!(modeler.do_analysis().unwrap(), ExitStatus::Success);
        assert_eq!(modeler.state(), ModelState::Analyzed);
        assert_eq!(modeler.get_moment().len(), 1);
    }

    #[test]
    fn test_input_changes_roll_back_state() {
        let mut modeler = stub_modeler();
        modeler.run().unwrap();

        modeler.set_analysis_type("displacement-control").unwrap();
        assert_eq!(modeler.state(), ModelState::LoadBuilt);
        assert!(modeler.get_moment().is_empty());

        modeler.update_load(10.0, 0.0, 0.0).unwrap();
        assert_eq!(modeler.state(), ModelState::MeshBuilt);

        modeler.update_gw_table(2.0).unwrap();
        assert_eq!(modeler.state(), ModelState::Empty);
        assert!(modeler.mesh().is_none());
        assert!(modeler.node_depths(0).is_err());
    }

    #[test]
    fn test_update_requires_matching_mode() {
        let mut modeler = stub_modeler();
        assert!(modeler.update_displacement(0.01, 0.0).is_err());
        modeler.set_load_type(LoadControlType::Displacement);
        modeler.update_displacement(0.01, 0.0).unwrap();
        assert!(matches!(
            modeler.update_load(1.0, 0.0, 0.0),
            Err(PileError::InvalidInput(_))
        ));
        assert_eq!(modeler.load(), &LoadCase::Displacement { ux: 0.01, uz: 0.0 });
    }

    #[test]
    fn test_solver_failure_recorded() {
        let mut modeler = stub_modeler();
        modeler.build_mesh().unwrap();
        modeler.build_load().unwrap();
        modeler.domain_mut().fail_with(SolveFailure::DidNotConverge {
            step: 3,
            iterations: 50,
        });

        assert!(matches!(
            modeler.do_analysis(),
            Err(PileError::SolverNonconvergence { step: 3, .. })
        ));
        assert_eq!(modeler.get_exit_status(), ExitStatus::DidNotConverge);
        assert_eq!(modeler.state(), ModelState::LoadBuilt);
        assert!(modeler.plot_data().is_empty());

        modeler.domain_mut().fail_with(SolveFailure::Singular);
        assert!(modeler.do_analysis().is_err());
        assert_eq!(modeler.get_exit_status().code(), -2);
    }

    #[test]
    fn test_failed_mesh_build_commits_nothing() {
        let mut modeler = stub_modeler();
        let mut deep = PileSpec::circular(1.0, 10.0, 0.6, 30.0e6);
        deep.embedded_length = 40.0;
        modeler.update_piles(vec![deep]).unwrap();

        assert!(matches!(modeler.build_mesh(), Err(PileError::InvalidLayering(_))));
        assert_eq!(modeler.state(), ModelState::Empty);
        assert!(modeler.mesh().is_none());
        assert!(modeler.domain().nodes.is_empty());
        assert!(matches!(modeler.build_load(), Err(PileError::Sequencing { .. })));
    }

    #[test]
    fn test_invalid_inputs_rejected_without_change() {
        let mut modeler = stub_modeler();
        modeler.build_mesh().unwrap();

        let mut bad = PileSpec::default();
        bad.elastic_modulus = -1.0;
        assert!(matches!(
            modeler.update_piles(vec![bad]),
            Err(PileError::InvalidGeometry(_))
        ));
        assert!(matches!(
            modeler.update_pile(5, PileSpec::default()),
            Err(PileError::PileIndex(5))
        ));
        assert!(modeler.set_analysis_type("dynamic").is_err());
        assert_eq!(modeler.state(), ModelState::MeshBuilt);
        assert_eq!(modeler.piles().len(), 1);
    }
}
