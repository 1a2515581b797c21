//! Pile mesher - layer-aware discretization and spring attachment

use log::{debug, info};

use super::{HeadLinkElement, HeadNode, Mesh, MeshNode, PileElement, PileMesh, SpringElement};
use crate::config::ModelerSettings;
use crate::curves::{BackboneCurves, SpringInput};
use crate::domain::Tag;
use crate::elements::{BeamSection, PileSpec, SpringKind};
use crate::error::{PileError, PileResult};
use crate::soil::LayerTable;

/// Layer segments shorter than this are not meshed (m)
const MIN_SEGMENT: f64 = 1e-6;

/// Geometric comparison tolerance (m)
const GEOM_TOL: f64 = 1e-9;

/// Sequential tag allocator
#[derive(Debug)]
struct TagCounter(Tag);

impl TagCounter {
    fn next(&mut self) -> Tag {
        let tag = self.0;
        self.0 += 1;
        tag
    }
}

/// Builds a [`Mesh`] from pile geometry and the soil layering
///
/// Node placement follows the [`crate::config::MeshPolicy`] of the settings;
/// spring parameters come from the supplied [`BackboneCurves`] strategy.
pub struct PileMesher<'a> {
    settings: &'a ModelerSettings,
    curves: &'a dyn BackboneCurves,
}

impl<'a> PileMesher<'a> {
    pub fn new(settings: &'a ModelerSettings, curves: &'a dyn BackboneCurves) -> Self {
        Self { settings, curves }
    }

    /// Node elevations of one pile, head first
    ///
    /// The free length is split into `num_elements_in_air` equal elements.
    /// Every layer segment of the embedded length gets a share of
    /// `num_pile_elements` proportional to its thickness, clamped to the
    /// per-layer bounds. Layer interfaces always coincide with nodes.
    pub fn node_depths(&self, pile: &PileSpec, layers: &LayerTable) -> PileResult<Vec<f64>> {
        let policy = &self.settings.mesh;
        policy.validate()?;
        let l1 = pile.above_ground_length;
        let l2 = pile.embedded_length;
        let mut z = Vec::new();

        if l1 > 0.0 {
            let n = policy.num_elements_in_air;
            for k in 0..n {
                z.push(l1 - l1 * k as f64 / n as f64);
            }
        }

        let mut bounds = vec![0.0];
        bounds.extend(
            layers
                .interface_depths()
                .into_iter()
                .filter(|&d| d > MIN_SEGMENT && d < l2 - MIN_SEGMENT),
        );
        bounds.push(l2);

        for pair in bounds.windows(2) {
            let (top, bottom) = (pair[0], pair[1]);
            let span = bottom - top;
            if span < MIN_SEGMENT {
                continue;
            }
            let share = (span / l2 * policy.num_pile_elements as f64).round() as usize;
            let n = share.clamp(policy.min_elements_per_layer, policy.max_elements_per_layer);
            for k in 0..n {
                z.push(-(top + span * k as f64 / n as f64));
            }
        }
        z.push(-l2);
        Ok(z)
    }

    /// Discretize the pile group
    pub fn build(&self, piles: &[PileSpec], layers: &LayerTable) -> PileResult<Mesh> {
        self.settings.mesh.validate()?;
        layers.validate()?;
        self.validate_group(piles, layers)?;

        let rigid_head = self.settings.assume_rigid_head;
        let elevations = piles
            .iter()
            .map(|pile| self.node_depths(pile, layers))
            .collect::<PileResult<Vec<_>>>()?;

        let mut node_tags = TagCounter(1);
        let mut element_tags = TagCounter(1);

        let pile_nodes: Vec<Vec<MeshNode>> = piles
            .iter()
            .zip(&elevations)
            .map(|(pile, zs)| {
                zs.iter()
                    .map(|&z| MeshNode {
                        tag: node_tags.next(),
                        x: pile.x_offset,
                        z,
                    })
                    .collect()
            })
            .collect();

        let soil_nodes: Vec<Vec<MeshNode>> = pile_nodes
            .iter()
            .map(|nodes| {
                nodes
                    .iter()
                    .filter(|n| n.z < 0.0)
                    .map(|n| MeshNode {
                        tag: node_tags.next(),
                        x: n.x,
                        z: n.z,
                    })
                    .collect()
            })
            .collect();

        let head_z = piles[0].above_ground_length;
        let cap_nodes: Vec<MeshNode> = if rigid_head {
            let x = piles.iter().map(|p| p.x_offset).sum::<f64>() / piles.len() as f64;
            vec![MeshNode {
                tag: node_tags.next(),
                x,
                z: head_z,
            }]
        } else {
            piles
                .iter()
                .map(|p| MeshNode {
                    tag: node_tags.next(),
                    x: p.x_offset,
                    z: head_z,
                })
                .collect()
        };

        let elements: Vec<Vec<PileElement>> = piles
            .iter()
            .zip(&pile_nodes)
            .map(|(pile, nodes)| {
                let section = BeamSection::new(pile.ea(), pile.ei(), pile.gj());
                nodes
                    .windows(2)
                    .map(|pair| PileElement {
                        tag: element_tags.next(),
                        i_node: pair[0].tag,
                        j_node: pair[1].tag,
                        section,
                    })
                    .collect()
            })
            .collect();

        let mut springs = Vec::with_capacity(piles.len());
        for ((pile, nodes), soil) in piles.iter().zip(&pile_nodes).zip(&soil_nodes) {
            springs.push(self.attach_springs(pile, nodes, soil, layers, &mut element_tags)?);
        }

        let head_stiffness = self.settings.head_stiffness;
        let heads: Vec<HeadNode> = piles
            .iter()
            .zip(&pile_nodes)
            .enumerate()
            .map(|(i, (pile, nodes))| {
                let link = (!rigid_head).then(|| HeadLinkElement {
                    tag: element_tags.next(),
                    stiffness: [
                        pile.head.translational * head_stiffness.ea,
                        pile.head.translational * head_stiffness.ea,
                        pile.head.rotational * head_stiffness.ei,
                    ],
                });
                HeadNode {
                    node_tag: nodes[0].tag,
                    connected_node_tag: if rigid_head {
                        cap_nodes[0].tag
                    } else {
                        cap_nodes[i].tag
                    },
                    x_offset: pile.x_offset,
                    rotational: pile.head.rotational,
                    translational: pile.head.translational,
                    link,
                }
            })
            .collect();

        let mut ordered_caps: Vec<&MeshNode> = cap_nodes.iter().collect();
        ordered_caps.sort_by(|a, b| a.x.total_cmp(&b.x));
        let cap_section = head_stiffness.section();
        let cap_beams: Vec<PileElement> = ordered_caps
            .windows(2)
            .map(|pair| PileElement {
                tag: element_tags.next(),
                i_node: pair[0].tag,
                j_node: pair[1].tag,
                section: cap_section,
            })
            .collect();

        let piles: Vec<PileMesh> = piles
            .iter()
            .zip(pile_nodes)
            .zip(elements)
            .zip(soil_nodes)
            .zip(springs)
            .zip(heads)
            .enumerate()
            .map(|(index, (((((pile, nodes), elements), soil_nodes), springs), head))| PileMesh {
                index,
                diameter: pile.diameter,
                nodes,
                elements,
                soil_nodes,
                springs,
                head,
            })
            .collect();

        let mesh = Mesh {
            piles,
            cap_nodes,
            cap_beams,
            rigid_head,
        };
        info!(
            "Meshed {} pile(s): {} nodes, {} springs, {} head",
            mesh.num_piles(),
            mesh.num_nodes(),
            mesh.piles.iter().map(|p| p.springs.len()).sum::<usize>(),
            if rigid_head { "rigid" } else { "flexible" }
        );
        Ok(mesh)
    }

    /// Springs of one pile; `soil` holds one node per embedded pile node
    fn attach_springs(
        &self,
        pile: &PileSpec,
        nodes: &[MeshNode],
        soil: &[MeshNode],
        layers: &LayerTable,
        tags: &mut TagCounter,
    ) -> PileResult<Vec<SpringElement>> {
        let mut springs = Vec::new();
        let embedded = nodes.iter().enumerate().filter(|(_, n)| n.z < 0.0);

        for ((k, node), soil_node) in embedded.zip(soil) {
            let depth = node.depth();
            let above = nodes[k - 1].z - node.z;
            let below = nodes.get(k + 1).map_or(0.0, |next| node.z - next.z);
            let tributary_length = 0.5 * (above + below);

            let layer_index = layers.layer_index_at(depth)?;
            let input = SpringInput {
                depth,
                diameter: pile.diameter,
                sigma_v: layers.effective_stress(depth)?,
                layer: &layers.layers()[layer_index],
                tributary_length,
                below_water_table: layers.is_below_water_table(depth),
                switches: self.settings.switches,
            };

            let is_tip = k + 1 == nodes.len();
            let mut kinds = vec![
                (SpringKind::Lateral, self.curves.lateral(&input)),
                (SpringKind::Shaft, self.curves.shaft(&input)),
            ];
            if is_tip && self.settings.use_toe_resistance {
                kinds.push((SpringKind::Toe, self.curves.toe(&input)));
            }

            for (kind, params) in kinds {
                springs.push(SpringElement {
                    tag: tags.next(),
                    kind,
                    pile_node: node.tag,
                    soil_node: soil_node.tag,
                    z: node.z,
                    tributary_length,
                    params,
                    layer: layer_index,
                });
            }
        }
        debug!("Pile springs: {} over {} nodes", springs.len(), nodes.len());
        Ok(springs)
    }

    fn validate_group(&self, piles: &[PileSpec], layers: &LayerTable) -> PileResult<()> {
        let max_piles = self.settings.max_piles;
        if piles.is_empty() || piles.len() > max_piles {
            return Err(PileError::InvalidGeometry(format!(
                "between 1 and {} piles are supported, got {}",
                max_piles,
                piles.len()
            )));
        }
        for (index, pile) in piles.iter().enumerate() {
            pile.validate(index)?;
        }

        let l1 = piles[0].above_ground_length;
        if let Some(index) = piles
            .iter()
            .position(|p| (p.above_ground_length - l1).abs() > GEOM_TOL)
        {
            return Err(PileError::InvalidGeometry(format!(
                "pile {} above-ground length {} differs from the shared value {}",
                index, piles[index].above_ground_length, l1
            )));
        }

        let mut offsets: Vec<f64> = piles.iter().map(|p| p.x_offset).collect();
        offsets.sort_by(f64::total_cmp);
        if offsets.windows(2).any(|w| w[1] - w[0] < GEOM_TOL) {
            return Err(PileError::InvalidGeometry(
                "piles of a group need distinct x offsets".to_string(),
            ));
        }

        let soil_depth = layers.total_depth();
        if let Some((index, pile)) = piles
            .iter()
            .enumerate()
            .find(|(_, p)| p.embedded_length > soil_depth + GEOM_TOL)
        {
            return Err(PileError::InvalidLayering(format!(
                "pile {} embedded length {} exceeds the soil column depth {}",
                index, pile.embedded_length, soil_depth
            )));
        }
        Ok(())
    }
}
