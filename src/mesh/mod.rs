//! Discretized pile group
//!
//! A [`Mesh`] is the plain-data description of everything registered in the
//! finite element domain: pile nodes and beam-columns, soil-reaction nodes
//! and springs, and the cap. It is produced by [`PileMesher`] and is the
//! shared map used afterwards by the load builder and the result extractor
//! to find tags by pile and depth.

mod mesher;

use serde::{Deserialize, Serialize};

use crate::domain::{FeaDomain, Tag};
use crate::elements::{BeamSection, SpringKind, SpringLaw, SpringParams};
use crate::error::PileResult;

pub use mesher::PileMesher;

/// A node of the plane model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub tag: Tag,
    pub x: f64,
    /// Elevation, negative below the ground surface
    pub z: f64,
}

impl MeshNode {
    /// Depth below the ground surface (negative above ground)
    pub fn depth(&self) -> f64 {
        -self.z
    }
}

/// Beam-column between two consecutive nodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileElement {
    pub tag: Tag,
    pub i_node: Tag,
    pub j_node: Tag,
    pub section: BeamSection,
}

/// Zero-length soil spring between a pile node and its soil-reaction node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringElement {
    pub tag: Tag,
    pub kind: SpringKind,
    pub pile_node: Tag,
    pub soil_node: Tag,
    /// Elevation of the spring
    pub z: f64,
    /// Pile length the spring represents
    pub tributary_length: f64,
    pub params: SpringParams,
    /// Index of the soil layer at the spring
    pub layer: usize,
}

impl SpringElement {
    /// Force-deformation law registered in the domain
    pub fn law(&self) -> SpringLaw {
        match self.kind {
            SpringKind::Toe => SpringLaw::compression_backbone(self.params),
            SpringKind::Lateral | SpringKind::Shaft => SpringLaw::backbone(self.params),
        }
    }
}

/// Zero-length elastic link between a pile head and its cap node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadLinkElement {
    pub tag: Tag,
    /// [kx, kz, kr]
    pub stiffness: [f64; 3],
}

/// Connection record of one pile head
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadNode {
    /// Top node of the pile
    pub node_tag: Tag,
    /// Cap node the head is connected to
    pub connected_node_tag: Tag,
    pub x_offset: f64,
    pub rotational: f64,
    pub translational: f64,
    /// Elastic head link; `None` for a rigid cap connection
    pub link: Option<HeadLinkElement>,
}

/// Mesh of one pile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileMesh {
    pub index: usize,
    pub diameter: f64,
    /// Pile nodes ordered head to tip
    pub nodes: Vec<MeshNode>,
    /// `elements[k]` joins `nodes[k]` and `nodes[k + 1]`
    pub elements: Vec<PileElement>,
    /// Fixed soil-reaction nodes, one per embedded pile node
    pub soil_nodes: Vec<MeshNode>,
    /// Springs ordered head to tip
    pub springs: Vec<SpringElement>,
    pub head: HeadNode,
}

impl PileMesh {
    /// Node elevations, head to tip
    pub fn depths(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.z).collect()
    }

    /// Springs of one kind, head to tip
    pub fn springs_of(&self, kind: SpringKind) -> impl Iterator<Item = &SpringElement> + '_ {
        self.springs.iter().filter(move |s| s.kind == kind)
    }

    pub fn tip(&self) -> Option<&MeshNode> {
        self.nodes.last()
    }
}

/// The complete pile group model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub piles: Vec<PileMesh>,
    /// Cap nodes carrying the head loads (one when rigid, else one per pile)
    pub cap_nodes: Vec<MeshNode>,
    /// Elastic beams joining consecutive cap nodes
    pub cap_beams: Vec<PileElement>,
    pub rigid_head: bool,
}

impl Mesh {
    pub fn num_piles(&self) -> usize {
        self.piles.len()
    }

    pub fn pile(&self, index: usize) -> Option<&PileMesh> {
        self.piles.get(index)
    }

    /// Total number of registered nodes
    pub fn num_nodes(&self) -> usize {
        self.cap_nodes.len()
            + self
                .piles
                .iter()
                .map(|p| p.nodes.len() + p.soil_nodes.len())
                .sum::<usize>()
    }

    /// Register the mesh in a finite element domain
    pub fn emit<D: FeaDomain>(&self, domain: &mut D) -> PileResult<()> {
        for pile in &self.piles {
            for node in &pile.nodes {
                domain.add_node(node.tag, node.x, node.z)?;
            }
        }
        for pile in &self.piles {
            for node in &pile.soil_nodes {
                domain.add_node(node.tag, node.x, node.z)?;
                domain.fix(node.tag, [true, true, true])?;
            }
        }
        for node in &self.cap_nodes {
            domain.add_node(node.tag, node.x, node.z)?;
        }

        for pile in &self.piles {
            for element in &pile.elements {
                domain.add_beam_column(
                    element.tag,
                    element.i_node,
                    element.j_node,
                    element.section,
                )?;
            }
            for spring in &pile.springs {
                domain.add_spring(
                    spring.tag,
                    spring.pile_node,
                    spring.soil_node,
                    spring.kind.dof(),
                    spring.law(),
                )?;
            }
        }

        for pile in &self.piles {
            let head = &pile.head;
            match head.link {
                Some(link) => domain.add_head_link(
                    link.tag,
                    head.connected_node_tag,
                    head.node_tag,
                    link.stiffness,
                )?,
                None => domain.add_rigid_link(head.connected_node_tag, head.node_tag)?,
            }
        }
        for beam in &self.cap_beams {
            domain.add_beam_column(beam.tag, beam.i_node, beam.j_node, beam.section)?;
        }
        Ok(())
    }
}
