//! Translate a [`LoadCase`] into nodal loads and imposed displacements

use log::debug;

use super::{HeadLoadDistribution, LoadCase};
use crate::domain::{FeaDomain, DOF_X, DOF_Z};
use crate::elements::SpringKind;
use crate::error::PileResult;
use crate::mesh::Mesh;
use crate::soil::LayerTable;

/// Applies the active load case to a meshed domain
#[derive(Debug, Clone, Copy)]
pub struct LoadBuilder<'a> {
    mesh: &'a Mesh,
    layers: &'a LayerTable,
    distribution: HeadLoadDistribution,
}

impl<'a> LoadBuilder<'a> {
    pub fn new(mesh: &'a Mesh, layers: &'a LayerTable) -> Self {
        Self {
            mesh,
            layers,
            distribution: HeadLoadDistribution::default(),
        }
    }

    pub fn with_distribution(mut self, distribution: HeadLoadDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Replace all loads of the domain with `load`
    ///
    /// Returns the number of loaded nodes. An invalid load is rejected before
    /// the domain is touched; a failure while applying leaves the domain
    /// without any load.
    pub fn apply<D: FeaDomain>(&self, load: &LoadCase, domain: &mut D) -> PileResult<usize> {
        load.validate()?;
        domain.clear_loads();
        let result = self.apply_case(load, domain);
        if result.is_err() {
            domain.clear_loads();
        }
        result
    }

    fn apply_case<D: FeaDomain>(&self, load: &LoadCase, domain: &mut D) -> PileResult<usize> {
        let caps = &self.mesh.cap_nodes;
        match *load {
            LoadCase::Force { p, pv, moment } => {
                let share = self.distribution.share(caps.len());
                for node in caps {
                    domain.add_nodal_load(node.tag, [share * p, -share * pv, share * moment])?;
                }
                debug!(
                    "Cap force P={} PV={} M={} on {} node(s)",
                    p,
                    pv,
                    moment,
                    caps.len()
                );
                Ok(caps.len())
            }
            LoadCase::Displacement { ux, uz } => {
                for node in caps {
                    domain.impose_displacement(node.tag, DOF_X, ux)?;
                    domain.impose_displacement(node.tag, DOF_Z, uz)?;
                }
                debug!("Cap displacement ux={} uz={} on {} node(s)", ux, uz, caps.len());
                Ok(caps.len())
            }
            LoadCase::SoilProfile(profile) => {
                let mut loaded = 0;
                for pile in &self.mesh.piles {
                    for spring in pile.springs_of(SpringKind::Lateral) {
                        let value = profile.displacement_at(-spring.z, self.layers);
                        domain.impose_displacement(spring.soil_node, DOF_X, value)?;
                        loaded += 1;
                    }
                }
                debug!(
                    "Soil profile with surface displacement {} on {} soil node(s)",
                    profile.surface_disp, loaded
                );
                Ok(loaded)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelerSettings;
    use crate::curves::SimplifiedCurves;
    use crate::domain::RecordingDomain;
    use crate::elements::PileSpec;
    use crate::loads::DispProfile;
    use crate::mesh::PileMesher;
    use crate::soil::SoilLayer;
    use approx::assert_relative_eq;

    fn layers() -> LayerTable {
        LayerTable::with_layers(
            vec![
                SoilLayer::sand("Top", 2.0, 30.0),
                SoilLayer::clay("Middle", 3.0, 40.0),
                SoilLayer::sand("Bottom", 5.0, 35.0),
            ],
            4.0,
        )
        .unwrap()
    }

    fn meshed(rigid: bool) -> (Mesh, RecordingDomain) {
        let settings = ModelerSettings {
            assume_rigid_head: rigid,
            ..ModelerSettings::default()
        };
        let curves = SimplifiedCurves::default();
        let piles = [
            PileSpec::circular(1.0, 8.0, 0.5, 25.0e6).with_offset(-1.0),
            PileSpec::circular(1.0, 8.0, 0.5, 25.0e6).with_offset(1.0),
        ];
        let mesh = PileMesher::new(&settings, &curves).build(&piles, &layers()).unwrap();
        let mut domain = RecordingDomain::new();
        mesh.emit(&mut domain).unwrap();
        (mesh, domain)
    }

    #[test]
    fn test_rigid_cap_force_on_single_node() {
        let (mesh, mut domain) = meshed(true);
        let table = layers();
        let load = LoadCase::Force {
            p: 100.0,
            pv: 400.0,
            moment: 20.0,
        };
        let loaded = LoadBuilder::new(&mesh, &table).apply(&load, &mut domain).unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(domain.loads[&mesh.cap_nodes[0].tag], [100.0, -400.0, 20.0]);
        assert!(domain.imposed.is_empty());
    }

    #[test]
    fn test_free_heads_split_equally() {
        let (mesh, mut domain) = meshed(false);
        let table = layers();
        let load = LoadCase::Force {
            p: 100.0,
            pv: 0.0,
            moment: 0.0,
        };
        LoadBuilder::new(&mesh, &table).apply(&load, &mut domain).unwrap();

        assert_eq!(domain.loads.len(), 2);
        for node in &mesh.cap_nodes {
            assert_relative_eq!(domain.loads[&node.tag][0], 50.0);
        }
    }

    #[test]
    fn test_mode_switch_discards_forces() {
        let (mesh, mut domain) = meshed(true);
        let table = layers();
        let builder = LoadBuilder::new(&mesh, &table);
        let force = LoadCase::Force {
            p: 100.0,
            pv: 0.0,
            moment: 0.0,
        };
        builder.apply(&force, &mut domain).unwrap();
        builder
            .apply(&LoadCase::Displacement { ux: 0.01, uz: 0.0 }, &mut domain)
            .unwrap();

        assert!(domain.loads.is_empty());
        let cap = mesh.cap_nodes[0].tag;
        assert_eq!(domain.imposed[&(cap, DOF_X)], 0.01);
        assert_eq!(domain.imposed[&(cap, DOF_Z)], 0.0);
    }

    #[test]
    fn test_soil_profile_on_lateral_soil_nodes() {
        let (mesh, mut domain) = meshed(false);
        let table = layers();
        let load = LoadCase::SoilProfile(DispProfile::new(0.1, 50.0, 20.0, 0.0));
        let loaded = LoadBuilder::new(&mesh, &table).apply(&load, &mut domain).unwrap();

        let lateral: Vec<_> = mesh
            .piles
            .iter()
            .flat_map(|p| p.springs_of(SpringKind::Lateral))
            .collect();
        assert_eq!(loaded, lateral.len());
        assert_eq!(domain.imposed.len(), lateral.len());
        for spring in lateral {
            let value = domain.imposed[&(spring.soil_node, DOF_X)];
            if (spring.z + 2.0).abs() < 1e-12 {
                assert_relative_eq!(value, 0.05, epsilon = 1e-12);
            }
            assert!(value <= 0.1 && value >= 0.0);
        }
    }

    #[test]
    fn test_invalid_load_keeps_previous_loads() {
        let (mesh, mut domain) = meshed(true);
        let table = layers();
        let builder = LoadBuilder::new(&mesh, &table);
        builder
            .apply(&LoadCase::Displacement { ux: 0.01, uz: 0.0 }, &mut domain)
            .unwrap();
        let bad = LoadCase::Force {
            p: f64::INFINITY,
            pv: 0.0,
            moment: 0.0,
        };
        assert!(builder.apply(&bad, &mut domain).is_err());
        assert_eq!(domain.imposed.len(), 2);
    }
}
