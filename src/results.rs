//! Result series for plotting
//!
//! After a successful analysis the modeler walks every pile of the mesh and
//! reads nodal and element state back from the domain. Each pile yields one
//! [`ResultSeries`] per [`PlotQuantity`], stored in a single [`PlotData`]
//! table keyed by (pile index, quantity).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::FeaDomain;
use crate::elements::SpringKind;
use crate::error::PileResult;
use crate::mesh::{Mesh, PileMesh};

/// Quantities plotted along a pile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlotQuantity {
    LateralDisplacement,
    AxialDisplacement,
    Moment,
    Shear,
    AxialForce,
    /// Lateral soil pressure on the pile
    Stress,
    /// Ultimate lateral resistance per unit length
    Pult,
    Y50,
    /// Ultimate shaft friction per unit length
    Tult,
    Z50,
}

impl PlotQuantity {
    pub const ALL: [PlotQuantity; 10] = [
        Self::LateralDisplacement,
        Self::AxialDisplacement,
        Self::Moment,
        Self::Shear,
        Self::AxialForce,
        Self::Stress,
        Self::Pult,
        Self::Y50,
        Self::Tult,
        Self::Z50,
    ];

    /// Axis label with units
    pub fn label(&self) -> &'static str {
        match self {
            Self::LateralDisplacement => "Lateral displacement (m)",
            Self::AxialDisplacement => "Axial displacement (m)",
            Self::Moment => "Moment (kN·m)",
            Self::Shear => "Shear (kN)",
            Self::AxialForce => "Axial force (kN)",
            Self::Stress => "Soil stress (kPa)",
            Self::Pult => "Pult (kN/m)",
            Self::Y50 => "y50 (m)",
            Self::Tult => "Tult (kN/m)",
            Self::Z50 => "z50 (m)",
        }
    }

    /// Sampled at springs rather than at every pile node
    pub fn is_spring_quantity(&self) -> bool {
        matches!(
            self,
            Self::Stress | Self::Pult | Self::Y50 | Self::Tult | Self::Z50
        )
    }
}

impl fmt::Display for PlotQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ordered (elevation, value) pairs along one pile, head to tip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    pub points: Vec<(f64, f64)>,
}

impl ResultSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, z: f64, value: f64) {
        self.points.push((z, value));
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn depths(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    /// Point with the largest absolute value
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    }
}

/// Key figures of one pile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileSummary {
    pub pile: usize,
    pub head_lateral_displacement: f64,
    pub head_axial_displacement: f64,
    /// (elevation, moment) of the largest moment
    pub max_moment: (f64, f64),
    /// (elevation, shear) of the largest shear
    pub max_shear: (f64, f64),
    pub head_axial_force: f64,
}

/// All result series of the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotData {
    table: BTreeMap<(usize, PlotQuantity), ResultSeries>,
    num_piles: usize,
}

impl PlotData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every series back from a solved domain
    pub fn extract<D: FeaDomain>(mesh: &Mesh, domain: &D) -> PileResult<Self> {
        let mut data = Self::new();
        for pile in &mesh.piles {
            data.extract_nodes(pile, domain)?;
            data.extract_springs(pile, domain)?;
        }
        data.num_piles = mesh.num_piles();
        Ok(data)
    }

    fn series_mut(&mut self, pile: usize, quantity: PlotQuantity) -> &mut ResultSeries {
        self.table.entry((pile, quantity)).or_default()
    }

    /// Displacements and section forces at every pile node
    fn extract_nodes<D: FeaDomain>(&mut self, pile: &PileMesh, domain: &D) -> PileResult<()> {
        let index = pile.index;
        for (k, node) in pile.nodes.iter().enumerate() {
            let disp = domain.node_displacement(node.tag)?;

            // section forces from the element below, or above at the tip
            let (axial, shear, moment) = match pile.elements.get(k) {
                Some(below) => {
                    let f = domain.beam_forces(below.tag)?;
                    (-f[0], f[1], -f[2])
                }
                None => match k.checked_sub(1).and_then(|a| pile.elements.get(a)) {
                    Some(above) => {
                        let f = domain.beam_forces(above.tag)?;
                        (f[3], -f[4], f[5])
                    }
                    None => (0.0, 0.0, 0.0),
                },
            };

            let z = node.z;
            self.series_mut(index, PlotQuantity::LateralDisplacement).push(z, disp[0]);
            self.series_mut(index, PlotQuantity::AxialDisplacement).push(z, disp[1]);
            self.series_mut(index, PlotQuantity::Moment).push(z, moment);
            self.series_mut(index, PlotQuantity::Shear).push(z, shear);
            self.series_mut(index, PlotQuantity::AxialForce).push(z, axial);
        }
        Ok(())
    }

    /// Soil pressure and backbone parameters at every spring
    fn extract_springs<D: FeaDomain>(&mut self, pile: &PileMesh, domain: &D) -> PileResult<()> {
        let index = pile.index;
        for quantity in PlotQuantity::ALL.iter().filter(|q| q.is_spring_quantity()) {
            self.series_mut(index, *quantity);
        }

        for spring in pile.springs_of(SpringKind::Lateral) {
            let response = domain.spring_response(spring.tag)?;
            let length = spring.tributary_length;
            let stress = response.force / (length * pile.diameter);
            self.series_mut(index, PlotQuantity::Stress).push(spring.z, stress);
            self.series_mut(index, PlotQuantity::Pult)
                .push(spring.z, spring.params.ultimate / length);
            self.series_mut(index, PlotQuantity::Y50).push(spring.z, spring.params.y50);
        }
        for spring in pile.springs_of(SpringKind::Shaft) {
            let length = spring.tributary_length;
            self.series_mut(index, PlotQuantity::Tult)
                .push(spring.z, spring.params.ultimate / length);
            self.series_mut(index, PlotQuantity::Z50).push(spring.z, spring.params.y50);
        }
        Ok(())
    }

    /// Discard every series
    pub fn clear(&mut self) {
        self.table.clear();
        self.num_piles = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn num_piles(&self) -> usize {
        self.num_piles
    }

    pub fn series(&self, pile: usize, quantity: PlotQuantity) -> Option<&ResultSeries> {
        self.table.get(&(pile, quantity))
    }

    /// One series per pile for a quantity, in pile order
    pub fn collection(&self, quantity: PlotQuantity) -> Vec<&ResultSeries> {
        (0..self.num_piles)
            .filter_map(|pile| self.series(pile, quantity))
            .collect()
    }

    pub fn summary(&self, pile: usize) -> Option<PileSummary> {
        let head = |q: PlotQuantity| {
            self.series(pile, q)
                .and_then(|s| s.points.first().map(|p| p.1))
        };
        let peak = |q: PlotQuantity| self.series(pile, q).and_then(ResultSeries::peak);
        Some(PileSummary {
            pile,
            head_lateral_displacement: head(PlotQuantity::LateralDisplacement)?,
            head_axial_displacement: head(PlotQuantity::AxialDisplacement)?,
            max_moment: peak(PlotQuantity::Moment)?,
            max_shear: peak(PlotQuantity::Shear)?,
            head_axial_force: head(PlotQuantity::AxialForce)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelerSettings;
    use crate::curves::SimplifiedCurves;
    use crate::domain::{RecordingDomain, SpringResponse};
    use crate::elements::PileSpec;
    use crate::mesh::PileMesher;
    use crate::soil::{LayerTable, SoilLayer};
    use approx::assert_relative_eq;

    fn solved_stub() -> (Mesh, RecordingDomain) {
        let settings = ModelerSettings::default();
        let curves = SimplifiedCurves::default();
        let layers =
            LayerTable::with_layers(vec![SoilLayer::sand("Sand", 12.0, 32.0)], 0.0).unwrap();
        let pile = PileSpec::circular(1.0, 10.0, 0.6, 30.0e6);
        let mesh = PileMesher::new(&settings, &curves).build(&[pile], &layers).unwrap();

        let mut domain = RecordingDomain::new();
        mesh.emit(&mut domain).unwrap();
        domain.analyze(&settings.analysis).unwrap();
        (mesh, domain)
    }

    #[test]
    fn test_every_quantity_present() {
        let (mesh, domain) = solved_stub();
        let data = PlotData::extract(&mesh, &domain).unwrap();
        let pile = &mesh.piles[0];

        assert_eq!(data.num_piles(), 1);
        for quantity in PlotQuantity::ALL {
            let series = data.series(0, quantity).unwrap();
            let expected = if quantity.is_spring_quantity() {
                pile.springs_of(SpringKind::Lateral).count()
            } else {
                pile.nodes.len()
            };
            assert_eq!(series.len(), expected, "{:?}", quantity);
        }
        assert_eq!(data.series(0, PlotQuantity::Moment).unwrap().depths(), pile.depths());
    }

    #[test]
    fn test_seeded_values_read_back() {
        let (mesh, mut domain) = solved_stub();
        let pile = &mesh.piles[0];
        let head = pile.nodes[0].tag;
        let tip_element = pile.elements.last().unwrap().tag;
        let spring = pile.springs_of(SpringKind::Lateral).next().unwrap();

        domain.seed_displacement(head, [0.02, -0.001, 0.003]);
        domain.seed_beam_forces(pile.elements[0].tag, [10.0, 5.0, -40.0, -10.0, -5.0, 42.5]);
        domain.seed_beam_forces(tip_element, [1.0, 2.0, 3.0, 4.0, 6.0, 7.0]);
        domain.seed_spring(
            spring.tag,
            SpringResponse {
                deformation: 0.01,
                force: 12.0,
            },
        );

        let data = PlotData::extract(&mesh, &domain).unwrap();
        let value = |q: PlotQuantity, k: usize| data.series(0, q).unwrap().points[k].1;

        assert_relative_eq!(value(PlotQuantity::LateralDisplacement, 0), 0.02);
        assert_relative_eq!(value(PlotQuantity::AxialDisplacement, 0), -0.001);
        assert_relative_eq!(value(PlotQuantity::AxialForce, 0), -10.0);
        assert_relative_eq!(value(PlotQuantity::Shear, 0), 5.0);
        assert_relative_eq!(value(PlotQuantity::Moment, 0), 40.0);

        let tip = pile.nodes.len() - 1;
        assert_relative_eq!(value(PlotQuantity::AxialForce, tip), 4.0);
        assert_relative_eq!(value(PlotQuantity::Shear, tip), -6.0);
        assert_relative_eq!(value(PlotQuantity::Moment, tip), 7.0);

        let stress = 12.0 / (spring.tributary_length * 0.6);
        assert_relative_eq!(value(PlotQuantity::Stress, 0), stress);
        assert_relative_eq!(
            value(PlotQuantity::Pult, 0),
            spring.params.ultimate / spring.tributary_length
        );
    }

    #[test]
    fn test_unsolved_domain_fails() {
        let (mesh, mut domain) = solved_stub();
        domain.clear_loads();
        assert!(PlotData::extract(&mesh, &domain).is_err());
    }

    #[test]
    fn test_clear_and_summary() {
        let (mesh, mut domain) = solved_stub();
        let pile = &mesh.piles[0];
        domain.seed_beam_forces(pile.elements[3].tag, [0.0, 0.0, -55.0, 0.0, 0.0, 50.0]);

        let mut data = PlotData::extract(&mesh, &domain).unwrap();
        let summary = data.summary(0).unwrap();
        assert_relative_eq!(summary.max_moment.1, 55.0);
        assert_relative_eq!(summary.max_moment.0, pile.nodes[3].z);

        data.clear();
        assert!(data.is_empty());
        assert!(data.collection(PlotQuantity::Moment).is_empty());
        assert!(data.summary(0).is_none());
    }

    #[test]
    fn test_peak_keeps_sign() {
        let series = ResultSeries {
            points: vec![(0.0, 1.0), (-1.0, -3.0), (-2.0, 2.0)],
        };
        assert_eq!(series.peak(), Some((-1.0, -3.0)));
        assert_eq!(ResultSeries::new().peak(), None);
    }
}
