//! Recording domain with pre-seeded responses

use std::collections::{BTreeMap, BTreeSet};

use super::{FeaDomain, SolveFailure, SpringResponse, Tag};
use crate::analysis::AnalysisOptions;
use crate::elements::{BeamSection, SpringLaw};
use crate::error::{PileError, PileResult};

/// Registered element, as seen by a [`RecordingDomain`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedElement {
    Beam {
        i: Tag,
        j: Tag,
        section: BeamSection,
    },
    Spring {
        node: Tag,
        soil_node: Tag,
        dof: usize,
        law: SpringLaw,
    },
    HeadLink {
        i: Tag,
        j: Tag,
        stiffness: [f64; 3],
    },
}

/// A [`FeaDomain`] that stores every call and answers queries from
/// seeded values
///
/// Unseeded responses read as zero once [`FeaDomain::analyze`] has
/// succeeded. The outcome of `analyze` is set with [`Self::fail_with`].
#[derive(Debug, Clone, Default)]
pub struct RecordingDomain {
    pub nodes: BTreeMap<Tag, (f64, f64)>,
    pub fixed: BTreeMap<Tag, [bool; 3]>,
    pub elements: BTreeMap<Tag, RecordedElement>,
    pub rigid_links: Vec<(Tag, Tag)>,
    pub loads: BTreeMap<Tag, [f64; 3]>,
    pub imposed: BTreeMap<(Tag, usize), f64>,
    pub analyses: usize,
    displacements: BTreeMap<Tag, [f64; 3]>,
    beam_forces: BTreeMap<Tag, [f64; 6]>,
    springs: BTreeMap<Tag, SpringResponse>,
    failure: Option<SolveFailure>,
    analyzed: bool,
}

impl RecordingDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following analysis fail
    pub fn fail_with(&mut self, failure: SolveFailure) {
        self.failure = Some(failure);
    }

    pub fn seed_displacement(&mut self, node: Tag, value: [f64; 3]) {
        self.displacements.insert(node, value);
    }

    pub fn seed_beam_forces(&mut self, element: Tag, value: [f64; 6]) {
        self.beam_forces.insert(element, value);
    }

    pub fn seed_spring(&mut self, element: Tag, value: SpringResponse) {
        self.springs.insert(element, value);
    }

    /// Tags of the nodes carrying a nodal load
    pub fn loaded_nodes(&self) -> BTreeSet<Tag> {
        self.loads.keys().copied().collect()
    }

    fn node(&self, tag: Tag) -> PileResult<()> {
        if self.nodes.contains_key(&tag) {
            Ok(())
        } else {
            Err(PileError::NodeNotFound(tag))
        }
    }

    fn new_element(&self, tag: Tag) -> PileResult<()> {
        if self.elements.contains_key(&tag) {
            Err(PileError::DuplicateTag(tag))
        } else {
            Ok(())
        }
    }

    fn solved(&self) -> PileResult<()> {
        if self.analyzed {
            Ok(())
        } else {
            Err(PileError::NotAnalyzed)
        }
    }
}

impl FeaDomain for RecordingDomain {
    fn add_node(&mut self, tag: Tag, x: f64, z: f64) -> PileResult<()> {
        if self.nodes.contains_key(&tag) {
            return Err(PileError::DuplicateTag(tag));
        }
        self.nodes.insert(tag, (x, z));
        Ok(())
    }

    fn fix(&mut self, node: Tag, restraints: [bool; 3]) -> PileResult<()> {
        self.node(node)?;
        self.fixed.insert(node, restraints);
        Ok(())
    }

    fn add_beam_column(
        &mut self,
        tag: Tag,
        i_node: Tag,
        j_node: Tag,
        section: BeamSection,
    ) -> PileResult<()> {
        self.new_element(tag)?;
        self.node(i_node)?;
        self.node(j_node)?;
        self.elements.insert(
            tag,
            RecordedElement::Beam {
                i: i_node,
                j: j_node,
                section,
            },
        );
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
        self.new_element(tag)?;
        self.node(node)?;
        self.node(soil_node)?;
        self.elements.insert(
            tag,
            RecordedElement::Spring {
                node,
                soil_node,
                dof,
                law,
            },
        );
        Ok(())
    }

    fn add_head_link(
        &mut self,
        tag: Tag,
        i_node: Tag,
        j_node: Tag,
        stiffness: [f64; 3],
    ) -> PileResult<()> {
        self.new_element(tag)?;
        self.node(i_node)?;
        self.node(j_node)?;
        self.elements.insert(
            tag,
            RecordedElement::HeadLink {
                i: i_node,
                j: j_node,
                stiffness,
            },
        );
        Ok(())
    }

    fn add_rigid_link(&mut self, master: Tag, slave: Tag) -> PileResult<()> {
        self.node(master)?;
        self.node(slave)?;
        self.rigid_links.push((master, slave));
        Ok(())
    }

    fn clear_loads(&mut self) {
        self.loads.clear();
        self.imposed.clear();
        self.analyzed = false;
    }

    fn add_nodal_load(&mut self, node: Tag, load: [f64; 3]) -> PileResult<()> {
        self.node(node)?;
        let entry = self.loads.entry(node).or_insert([0.0; 3]);
        for (total, value) in entry.iter_mut().zip(load) {
            *total += value;
        }
        Ok(())
    }

    fn impose_displacement(&mut self, node: Tag, dof: usize, value: f64) -> PileResult<()> {
        self.node(node)?;
        self.imposed.insert((node, dof), value);
        Ok(())
    }

    fn analyze(&mut self, _options: &AnalysisOptions) -> Result<(), SolveFailure> {
        self.analyses += 1;
        self.analyzed = false;
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        self.analyzed = true;
        Ok(())
    }

    fn node_displacement(&self, node: Tag) -> PileResult<[f64; 3]> {
        self.node(node)?;
        self.solved()?;
        Ok(self.displacements.get(&node).copied().unwrap_or_default())
    }

    fn node_reaction(&self, node: Tag) -> PileResult<[f64; 3]> {
        self.node(node)?;
        self.solved()?;
        Ok([0.0; 3])
    }

    fn beam_forces(&self, tag: Tag) -> PileResult<[f64; 6]> {
        match self.elements.get(&tag) {
            Some(RecordedElement::Beam { .. }) => {
                self.solved()?;
                Ok(self.beam_forces.get(&tag).copied().unwrap_or_default())
            }
            _ => Err(PileError::ElementNotFound(tag)),
        }
    }

    fn spring_response(&self, tag: Tag) -> PileResult<SpringResponse> {
        match self.elements.get(&tag) {
            Some(RecordedElement::Spring { .. }) | Some(RecordedElement::HeadLink { .. }) => {
                self.solved()?;
                Ok(self.springs.get(&tag).copied().unwrap_or_default())
            }
            _ => Err(PileError::ElementNotFound(tag)),
        }
    }
}
