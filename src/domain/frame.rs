//! Plane frame domain with an incremental Newton-Raphson static solver

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use super::{FeaDomain, SolveFailure, SpringResponse, Tag};
use crate::analysis::{AnalysisOptions, AnalysisType};
use crate::elements::{BeamSection, SpringLaw};
use crate::error::{PileError, PileResult};
use crate::math::{self, Mat, Mat6, Vec as FEVec, Vec6};

/// DOFs per node
const NDF: usize = 3;

#[derive(Debug, Clone)]
struct DomainNode {
    tag: Tag,
    x: f64,
    z: f64,
    fixed: [bool; 3],
}

#[derive(Debug, Clone)]
struct Beam {
    i: usize,
    j: usize,
    section: BeamSection,
    length: f64,
    t: Mat6,
}

impl Beam {
    fn dofs(&self) -> [usize; 6] {
        let (i, j) = (self.i * NDF, self.j * NDF);
        [i, i + 1, i + 2, j, j + 1, j + 2]
    }

    fn local_stiffness(&self) -> Mat6 {
        math::beam_local_stiffness(self.section.ea, self.section.ei, self.length)
    }
}

#[derive(Debug, Clone)]
struct Spring {
    node: usize,
    soil: usize,
    dof: usize,
    law: SpringLaw,
}

impl Spring {
    fn deformation(&self, u: &FEVec) -> f64 {
        u[self.node * NDF + self.dof] - u[self.soil * NDF + self.dof]
    }
}

#[derive(Debug, Clone)]
struct HeadLink {
    i: usize,
    j: usize,
    stiffness: [f64; 3],
}

#[derive(Debug, Clone)]
struct RigidLink {
    master: usize,
    slave: usize,
    dx: f64,
    dz: f64,
}

impl RigidLink {
    /// Slave DOFs written as combinations of master DOFs
    fn slave_rows(&self) -> [Vec<(usize, f64)>; 3] {
        let m = self.master * NDF;
        [
            vec![(m, 1.0), (m + 2, -self.dz)],
            vec![(m + 1, 1.0), (m + 2, self.dx)],
            vec![(m + 2, 1.0)],
        ]
    }
}

#[derive(Debug, Clone, Copy)]
enum ElementRef {
    Beam(usize),
    Spring(usize),
    Link(usize),
}

/// Converged state of the last successful analysis
#[derive(Debug, Clone)]
struct Solution {
    u: FEVec,
    reactions: FEVec,
}

/// Plane frame finite element domain
///
/// Nodes carry three DOFs (UX, UZ, R). Beam-columns are linear elastic;
/// soil springs follow their [`SpringLaw`]; rigid links are enforced
/// exactly by condensing slave DOFs onto their master. Each analysis
/// restarts from the unloaded state and applies the loads and imposed
/// displacements proportionally over the increments.
#[derive(Debug, Clone, Default)]
pub struct FrameDomain {
    nodes: Vec<DomainNode>,
    node_index: HashMap<Tag, usize>,
    beams: Vec<Beam>,
    springs: Vec<Spring>,
    links: Vec<HeadLink>,
    rigid_links: Vec<RigidLink>,
    element_index: HashMap<Tag, ElementRef>,
    loads: BTreeMap<usize, [f64; 3]>,
    imposed: BTreeMap<(usize, usize), f64>,
    solution: Option<Solution>,
}

impl FrameDomain {
    /// Create an empty domain
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_elements(&self) -> usize {
        self.element_index.len()
    }

    fn index_of(&self, tag: Tag) -> PileResult<usize> {
        self.node_index
            .get(&tag)
            .copied()
            .ok_or(PileError::NodeNotFound(tag))
    }

    fn check_new_element(&self, tag: Tag) -> PileResult<()> {
        if self.element_index.contains_key(&tag) {
            return Err(PileError::DuplicateTag(tag));
        }
        Ok(())
    }

    fn check_dof(dof: usize) -> PileResult<()> {
        if dof >= NDF {
            return Err(PileError::InvalidInput(format!("DOF {} out of range", dof)));
        }
        Ok(())
    }

    fn is_restrained(&self, dof: usize) -> bool {
        let node = dof / NDF;
        self.nodes[node].fixed[dof % NDF] || self.imposed.contains_key(&(node, dof % NDF))
    }

    fn external_forces(&self, n_dofs: usize) -> FEVec {
        let mut f = FEVec::zeros(n_dofs);
        for (&node, load) in &self.loads {
            for d in 0..NDF {
                f[node * NDF + d] += load[d];
            }
        }
        f
    }

    /// Internal force vector and tangent stiffness at displacement `u`
    fn assemble(&self, u: &FEVec) -> (FEVec, Mat) {
        let n = u.len();
        let mut r = FEVec::zeros(n);
        let mut k = Mat::zeros(n, n);

        for beam in &self.beams {
            let dofs = beam.dofs();
            let k_global = beam.t.transpose() * beam.local_stiffness() * beam.t;
            let u_e = Vec6::from_fn(|a, _| u[dofs[a]]);
            let f_e = k_global * u_e;
            for a in 0..6 {
                r[dofs[a]] += f_e[a];
                for b in 0..6 {
                    k[(dofs[a], dofs[b])] += k_global[(a, b)];
                }
            }
        }

        for spring in &self.springs {
            let (force, tangent) = spring.law.response(spring.deformation(u));
            let p = spring.node * NDF + spring.dof;
            let s = spring.soil * NDF + spring.dof;
            r[p] += force;
            r[s] -= force;
            k[(p, p)] += tangent;
            k[(s, s)] += tangent;
            k[(p, s)] -= tangent;
            k[(s, p)] -= tangent;
        }

        for link in &self.links {
            for d in 0..NDF {
                let (a, b) = (link.i * NDF + d, link.j * NDF + d);
                let kd = link.stiffness[d];
                let force = kd * (u[b] - u[a]);
                r[a] -= force;
                r[b] += force;
                k[(a, a)] += kd;
                k[(b, b)] += kd;
                k[(a, b)] -= kd;
                k[(b, a)] -= kd;
            }
        }

        (r, k)
    }

    /// Map from every DOF to the retained DOFs it follows
    ///
    /// Retained DOFs map onto themselves; DOFs of a rigid-link slave follow
    /// the rigid-body motion of the master.
    fn constraint_map(&self, n_dofs: usize) -> Vec<Vec<(usize, f64)>> {
        let mut map: Vec<Vec<(usize, f64)>> = (0..n_dofs).map(|d| vec![(d, 1.0)]).collect();
        for link in &self.rigid_links {
            for (d, row) in link.slave_rows().into_iter().enumerate() {
                map[link.slave * NDF + d] = row;
            }
        }
        map
    }

    fn is_slave(&self, node: usize) -> bool {
        self.rigid_links.iter().any(|link| link.slave == node)
    }

    fn is_master(&self, node: usize) -> bool {
        self.rigid_links.iter().any(|link| link.master == node)
    }

    fn solution(&self) -> PileResult<&Solution> {
        self.solution.as_ref().ok_or(PileError::NotAnalyzed)
    }

    fn element(&self, tag: Tag) -> PileResult<ElementRef> {
        self.element_index
            .get(&tag)
            .copied()
            .ok_or(PileError::ElementNotFound(tag))
    }
}

impl FeaDomain for FrameDomain {
    fn add_node(&mut self, tag: Tag, x: f64, z: f64) -> PileResult<()> {
        if self.node_index.contains_key(&tag) {
            return Err(PileError::DuplicateTag(tag));
        }
        self.node_index.insert(tag, self.nodes.len());
        self.nodes.push(DomainNode {
            tag,
            x,
            z,
            fixed: [false; 3],
        });
        self.solution = None;
        Ok(())
    }

    fn fix(&mut self, node: Tag, restraints: [bool; 3]) -> PileResult<()> {
        let idx = self.index_of(node)?;
        let fixed = &mut self.nodes[idx].fixed;
        for d in 0..NDF {
            fixed[d] |= restraints[d];
        }
        self.solution = None;
        Ok(())
    }

    fn add_beam_column(
        &mut self,
        tag: Tag,
        i_node: Tag,
        j_node: Tag,
        section: BeamSection,
    ) -> PileResult<()> {
        self.check_new_element(tag)?;
        let (i, j) = (self.index_of(i_node)?, self.index_of(j_node)?);
        let (ni, nj) = (&self.nodes[i], &self.nodes[j]);
        let t = math::beam_transformation_matrix(&[ni.x, ni.z], &[nj.x, nj.z]).ok_or_else(|| {
            PileError::InvalidGeometry(format!(
                "beam-column {} has zero length: i={}, j={}",
                tag, ni.tag, nj.tag
            ))
        })?;
        let length = ((nj.x - ni.x).powi(2) + (nj.z - ni.z).powi(2)).sqrt();
        if !(section.ea > 0.0 && section.ei > 0.0) {
            return Err(PileError::InvalidGeometry(format!(
                "beam-column {} needs positive EA and EI",
                tag
            )));
        }

        self.element_index.insert(tag, ElementRef::Beam(self.beams.len()));
        self.beams.push(Beam {
            i,
            j,
            section,
            length,
            t,
        });
        self.solution = None;
        Ok(())
    }

    fn add_spring(
        &mut self,
        tag: Tag,
        node: Tag,
        soil_node: Tag,
        dof: usize,
        law: SpringLaw,
    ) -> PileResult<()> {
        self.check_new_element(tag)?;
        Self::check_dof(dof)?;
        let (node, soil) = (self.index_of(node)?, self.index_of(soil_node)?);
        self.element_index.insert(tag, ElementRef::Spring(self.springs.len()));
        self.springs.push(Spring {
            node,
            soil,
            dof,
            law,
        });
        self.solution = None;
        Ok(())
    }

    fn add_head_link(
        &mut self,
        tag: Tag,
        i_node: Tag,
        j_node: Tag,
        stiffness: [f64; 3],
    ) -> PileResult<()> {
        self.check_new_element(tag)?;
        let (i, j) = (self.index_of(i_node)?, self.index_of(j_node)?);
        if stiffness.iter().any(|k| !(k.is_finite() && *k >= 0.0)) {
            return Err(PileError::InvalidInput(format!(
                "head link {} has a negative stiffness",
                tag
            )));
        }
        self.element_index.insert(tag, ElementRef::Link(self.links.len()));
        self.links.push(HeadLink {
            i,
            j,
            stiffness,
        });
        self.solution = None;
        Ok(())
    }

    fn add_rigid_link(&mut self, master: Tag, slave: Tag) -> PileResult<()> {
        let (m, s) = (self.index_of(master)?, self.index_of(slave)?);
        if m == s || self.is_slave(s) || self.is_slave(m) || self.is_master(s) {
            return Err(PileError::InvalidInput(format!(
                "rigid link {} -> {} would chain or duplicate a constraint",
                master, slave
            )));
        }
        let (nm, ns) = (&self.nodes[m], &self.nodes[s]);
        self.rigid_links.push(RigidLink {
            master: m,
            slave: s,
            dx: ns.x - nm.x,
            dz: ns.z - nm.z,
        });
        self.solution = None;
        Ok(())
    }

    fn clear_loads(&mut self) {
        self.loads.clear();
        self.imposed.clear();
        self.solution = None;
    }

    fn add_nodal_load(&mut self, node: Tag, load: [f64; 3]) -> PileResult<()> {
        let idx = self.index_of(node)?;
        let entry = self.loads.entry(idx).or_insert([0.0; 3]);
        for d in 0..NDF {
            entry[d] += load[d];
        }
        self.solution = None;
        Ok(())
    }

    fn impose_displacement(&mut self, node: Tag, dof: usize, value: f64) -> PileResult<()> {
        Self::check_dof(dof)?;
        let idx = self.index_of(node)?;
        self.imposed.insert((idx, dof), value);
        self.solution = None;
        Ok(())
    }

    fn analyze(&mut self, options: &AnalysisOptions) -> Result<(), SolveFailure> {
        self.solution = None;
        let n_dofs = self.nodes.len() * NDF;
        if n_dofs == 0 {
            return Err(SolveFailure::Singular);
        }

        let map = self.constraint_map(n_dofs);
        let retained: Vec<bool> = (0..n_dofs).map(|d| !self.is_slave(d / NDF)).collect();
        if (0..n_dofs).any(|d| !retained[d] && self.is_restrained(d)) {
            warn!("Restraint or imposed displacement on a rigid-link slave");
            return Err(SolveFailure::Singular);
        }
        let free: Vec<usize> = (0..n_dofs)
            .filter(|&d| retained[d] && !self.is_restrained(d))
            .collect();
        let f_ext = condense_vector(&map, &self.external_forces(n_dofs));
        let steps = options.num_increments.max(1);

        debug!(
            "Static analysis: {} DOFs ({} free), {} increments, {}",
            n_dofs,
            free.len(),
            steps,
            options.analysis_type
        );

        let mut q = FEVec::zeros(n_dofs);

        for step in 1..=steps {
            let lambda = step as f64 / steps as f64;
            for (&(node, dof), &value) in &self.imposed {
                q[node * NDF + dof] = lambda * value;
            }
            let target = &f_ext * lambda;

            let mut converged = false;
            let mut iterations = 0;
            while iterations <= options.max_iterations {
                let (r_full, k_full) = self.assemble(&expand(&map, &q));
                let r_int = condense_vector(&map, &r_full);
                let residual = FEVec::from_iterator(
                    free.len(),
                    free.iter().map(|&d| target[d] - r_int[d]),
                );

                if options.analysis_type == AnalysisType::LoadControl {
                    let reference = 1.0 + target.norm() + r_int.norm();
                    if residual.norm() <= options.tolerance * reference {
                        converged = true;
                        break;
                    }
                }
                if iterations == options.max_iterations || free.is_empty() {
                    converged = free.is_empty();
                    break;
                }

                let k = condense_matrix(&map, &k_full);
                let k_ff = Mat::from_fn(free.len(), free.len(), |a, b| k[(free[a], free[b])]);
                let dq = math::solve_linear_system(&k_ff, &residual).ok_or_else(|| {
                    warn!("Singular tangent stiffness at step {}", step);
                    SolveFailure::Singular
                })?;
                if dq.iter().any(|v| !v.is_finite()) {
                    warn!("Non-finite displacement increment at step {}", step);
                    return Err(SolveFailure::Singular);
                }
                for (a, &d) in free.iter().enumerate() {
                    q[d] += dq[a];
                }
                iterations += 1;

                if options.analysis_type == AnalysisType::DisplacementControl {
                    let q_free = free.iter().map(|&d| q[d] * q[d]).sum::<f64>().sqrt();
                    if dq.norm() <= options.tolerance * (1.0 + q_free) {
                        converged = true;
                        break;
                    }
                }
            }

            if !converged {
                warn!(
                    "Step {} of {} did not converge in {} iterations",
                    step, steps, options.max_iterations
                );
                return Err(SolveFailure::DidNotConverge {
                    step,
                    iterations: options.max_iterations,
                });
            }
            debug!("Step {} converged in {} iterations", step, iterations);
        }

        let u = expand(&map, &q);
        let (r_int, _) = self.assemble(&u);
        let mut reactions = r_int - self.external_forces(n_dofs);
        for d in 0..n_dofs {
            if !self.is_restrained(d) {
                reactions[d] = 0.0;
            }
        }
        self.solution = Some(Solution { u, reactions });
        Ok(())
    }

    fn node_displacement(&self, node: Tag) -> PileResult<[f64; 3]> {
        let idx = self.index_of(node)?;
        let u = &self.solution()?.u;
        Ok([u[idx * NDF], u[idx * NDF + 1], u[idx * NDF + 2]])
    }

    fn node_reaction(&self, node: Tag) -> PileResult<[f64; 3]> {
        let idx = self.index_of(node)?;
        let r = &self.solution()?.reactions;
        Ok([r[idx * NDF], r[idx * NDF + 1], r[idx * NDF + 2]])
    }

    fn beam_forces(&self, tag: Tag) -> PileResult<[f64; 6]> {
        let beam = match self.element(tag)? {
            ElementRef::Beam(i) => &self.beams[i],
            _ => return Err(PileError::ElementNotFound(tag)),
        };
        let u = &self.solution()?.u;
        let dofs = beam.dofs();
        let u_e = Vec6::from_fn(|a, _| u[dofs[a]]);
        let f_local = beam.local_stiffness() * (beam.t * u_e);
        let mut forces = [0.0; 6];
        forces.copy_from_slice(f_local.as_slice());
        Ok(forces)
    }

    fn spring_response(&self, tag: Tag) -> PileResult<SpringResponse> {
        let u = &self.solution()?.u;
        match self.element(tag)? {
            ElementRef::Spring(i) => {
                let spring = &self.springs[i];
                let deformation = spring.deformation(u);
                let (force, _) = spring.law.response(deformation);
                Ok(SpringResponse { deformation, force })
            }
            ElementRef::Link(i) => {
                let link = &self.links[i];
                let deformation = u[link.j * NDF] - u[link.i * NDF];
                Ok(SpringResponse {
                    deformation,
                    force: link.stiffness[0] * deformation,
                })
            }
            ElementRef::Beam(_) => Err(PileError::ElementNotFound(tag)),
        }
    }
}

/// Full displacement vector from the retained DOFs
fn expand(map: &[Vec<(usize, f64)>], q: &FEVec) -> FEVec {
    FEVec::from_iterator(
        map.len(),
        map.iter().map(|row| row.iter().map(|&(d, c)| c * q[d]).sum::<f64>()),
    )
}

/// Tᵀ·v
fn condense_vector(map: &[Vec<(usize, f64)>], v: &FEVec) -> FEVec {
    let mut out = FEVec::zeros(v.len());
    for (i, row) in map.iter().enumerate() {
        for &(d, c) in row {
            out[d] += c * v[i];
        }
    }
    out
}

/// Tᵀ·K·T
fn condense_matrix(map: &[Vec<(usize, f64)>], k: &Mat) -> Mat {
    let n = map.len();
    let mut out = Mat::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let kij = k[(i, j)];
            if kij == 0.0 {
                continue;
            }
            for &(a, ca) in &map[i] {
                for &(b, cb) in &map[j] {
                    out[(a, b)] += ca * kij * cb;
                }
            }
        }
    }
    out
}
