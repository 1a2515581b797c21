//! Modeler pipeline against a recording domain with seeded responses

use approx::assert_relative_eq;
use pile_fea::domain::{RecordedElement, SolveFailure, SpringResponse, DOF_X, DOF_Z};
use pile_fea::prelude::*;

fn stub_modeler(rigid: bool) -> PileModeler<RecordingDomain> {
    let mut modeler = PileModeler::<RecordingDomain>::new();
    modeler.set_rigid_head(rigid);
    modeler
        .update_soil(vec![
            SoilLayer::sand("Sand", 2.0, 30.0),
            SoilLayer::clay("Clay", 3.0, 40.0),
            SoilLayer::sand("Dense sand", 5.0, 36.0),
        ])
        .unwrap();
    modeler.update_gw_table(4.0).unwrap();
    modeler
        .update_piles(vec![
            PileSpec::circular(1.0, 8.0, 0.5, 25.0e6).with_offset(-1.0),
            PileSpec::circular(1.0, 8.0, 0.5, 25.0e6).with_offset(1.0),
        ])
        .unwrap();
    modeler
}

#[test]
fn test_mesh_registration() {
    let mut modeler = stub_modeler(true);
    modeler.build_mesh().unwrap();
    let mesh = modeler.mesh().unwrap().clone();
    let domain = modeler.domain();

    assert_eq!(domain.nodes.len(), mesh.num_nodes());
    let soil_nodes: usize = mesh.piles.iter().map(|p| p.soil_nodes.len()).sum();
    assert_eq!(domain.fixed.len(), soil_nodes);
    assert!(domain.fixed.values().all(|r| *r == [true, true, true]));
    assert_eq!(domain.rigid_links.len(), 2);

    let springs = domain
        .elements
        .values()
        .filter(|e| matches!(e, RecordedElement::Spring { .. }))
        .count();
    assert_eq!(springs, mesh.piles.iter().map(|p| p.springs.len()).sum::<usize>());
    assert!(!domain
        .elements
        .values()
        .any(|e| matches!(e, RecordedElement::HeadLink { .. })));
}

#[test]
fn test_flexible_heads_use_links() {
    let mut modeler = stub_modeler(false);
    modeler.build_mesh().unwrap();
    let domain = modeler.domain();

    let links = domain
        .elements
        .values()
        .filter(|e| matches!(e, RecordedElement::HeadLink { .. }))
        .count();
    assert_eq!(links, 2);
    assert!(domain.rigid_links.is_empty());
}

#[test]
fn test_seeded_responses_reach_plot_data() {
    let mut modeler = stub_modeler(true);
    modeler.update_load(100.0, 0.0, 0.0).unwrap();
    modeler.build_mesh().unwrap();
    modeler.build_load().unwrap();

    let mesh = modeler.mesh().unwrap().clone();
    let pile = &mesh.piles[1];
    let spring = pile.springs_of(SpringKind::Lateral).nth(2).unwrap();
    let domain = modeler.domain_mut();
    domain.seed_displacement(pile.nodes[0].tag, [0.012, -0.002, 0.0]);
    domain.seed_beam_forces(pile.elements[0].tag, [0.0, 50.0, 0.0, 0.0, -50.0, 50.0]);
    domain.seed_spring(
        spring.tag,
        SpringResponse {
            deformation: 0.004,
            force: 6.0,
        },
    );

    assert_eq!(modeler.do_analysis().unwrap(), ExitStatus::Success);
    assert_eq!(modeler.domain().analyses, 1);

    let lateral = modeler.get_lateral_displacements();
    assert_eq!(lateral.len(), 2);
    assert_relative_eq!(lateral[1].points[0].1, 0.012);
    assert_relative_eq!(lateral[0].points[0].1, 0.0);
    assert_relative_eq!(modeler.get_axial_displacements()[1].points[0].1, -0.002);
    assert_relative_eq!(modeler.get_shear()[1].points[0].1, 50.0);
    assert_relative_eq!(
        modeler.get_stress()[1].points[2].1,
        6.0 / (spring.tributary_length * 0.5)
    );
    assert_relative_eq!(modeler.get_y50()[1].points[2].1, spring.params.y50);
}

#[test]
fn test_mode_switch_leaves_no_force() {
    let mut modeler = stub_modeler(true);
    modeler.update_load(100.0, 20.0, 5.0).unwrap();
    modeler.build_mesh().unwrap();
    modeler.build_load().unwrap();
    let cap = modeler.mesh().unwrap().cap_nodes[0].tag;
    assert_eq!(modeler.domain().loads[&cap], [100.0, -20.0, 5.0]);

    modeler.set_load_type(LoadControlType::Displacement);
    modeler.update_displacement(0.02, -0.001).unwrap();
    modeler.build_load().unwrap();

    let domain = modeler.domain();
    assert!(domain.loads.is_empty());
    assert_eq!(domain.imposed[&(cap, DOF_X)], 0.02);
    assert_eq!(domain.imposed[&(cap, DOF_Z)], -0.001);
    assert_eq!(modeler.num_loaded_nodes(), 1);
}

#[test]
fn test_soil_profile_targets_soil_nodes() {
    let mut modeler = stub_modeler(false);
    modeler.set_load_type(LoadControlType::SoilProfile);
    modeler
        .update_disp_profile(DispProfile::new(0.04, 50.0, 25.0, 0.0))
        .unwrap();
    modeler.build_mesh().unwrap();
    modeler.build_load().unwrap();

    let mesh = modeler.mesh().unwrap().clone();
    let domain = modeler.domain();
    let soil_tags: Vec<_> = mesh
        .piles
        .iter()
        .flat_map(|p| p.soil_nodes.iter().map(|n| n.tag))
        .collect();
    assert_eq!(domain.imposed.len(), soil_tags.len());
    assert!(domain.imposed.keys().all(|(node, dof)| *dof == DOF_X && soil_tags.contains(node)));
    assert!(domain.loaded_nodes().is_empty());

    // displacement at the first interface is half the surface value
    let at_interface = mesh.piles[0]
        .soil_nodes
        .iter()
        .find(|n| (n.z + 2.0).abs() < 1e-9)
        .unwrap();
    assert_relative_eq!(domain.imposed[&(at_interface.tag, DOF_X)], 0.02, epsilon = 1e-9);
}

#[test]
fn test_failure_statuses() {
    let mut modeler = stub_modeler(true);
    modeler.build_mesh().unwrap();
    modeler.build_load().unwrap();

    modeler.domain_mut().fail_with(SolveFailure::Singular);
    assert!(matches!(modeler.do_analysis(), Err(PileError::SolverSingular)));
    assert_eq!(modeler.get_exit_status(), ExitStatus::SingularSystem);
    assert!(modeler.get_moment().is_empty());
    assert!(modeler.extract_plot_data().is_err());
}
