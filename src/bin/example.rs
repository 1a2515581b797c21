//! Pile FEA Example - laterally loaded two-pile group
//!
//! Usage: `pile-example [problem.json]`. Without an argument a two-pile
//! group in three soil layers is analyzed.

use anyhow::Context;
use log::info;

use pile_fea::prelude::*;

fn default_problem() -> PileProblem {
    PileProblem {
        layers: vec![
            SoilLayer::sand("Medium sand", 2.0, 32.0),
            SoilLayer::clay("Soft clay", 3.0, 25.0),
            SoilLayer::sand("Dense sand", 5.0, 38.0).with_unit_weights(19.0, 21.0),
        ],
        piles: vec![
            PileSpec::circular(1.0, 8.0, 0.5, 25.0e6).with_offset(-1.0),
            PileSpec::circular(1.0, 8.0, 0.5, 25.0e6).with_offset(1.0),
        ],
        gwt_depth: 4.0,
        load: LoadCase::Force {
            p: 100.0,
            pv: 300.0,
            moment: 0.0,
        },
        settings: ModelerSettings {
            assume_rigid_head: true,
            use_toe_resistance: true,
            ..ModelerSettings::default()
        },
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let problem = match std::env::args().nth(1) {
        Some(path) => PileProblem::from_json_file(&path)
            .with_context(|| format!("reading problem file {}", path))?,
        None => default_problem(),
    };

    println!("=== Pile FEA Example ===\n");
    println!("Soil layers:");
    for layer in &problem.layers {
        println!(
            "  {:<14} {:>5.1} m  {:?}  γ={:.1} γsat={:.1}",
            layer.name, layer.thickness, layer.kind, layer.gamma, layer.gamma_sat
        );
    }
    println!("Water table: {:.1} m", problem.gwt_depth);
    println!("Load: {:?}\n", problem.load);

    let mut modeler = PileModeler::<FrameDomain>::from_problem(&problem)?;
    modeler.build_mesh()?;
    if let Some(mesh) = modeler.mesh() {
        info!("{} nodes in the model", mesh.num_nodes());
    }
    modeler.build_load()?;

    let status = modeler
        .do_analysis()
        .with_context(|| format!("analysis failed ({})", modeler.get_exit_status()))?;
    println!("Exit status: {} (code {})\n", status, status.code());

    let data = modeler.plot_data();
    for pile in 0..data.num_piles() {
        let Some(summary) = data.summary(pile) else {
            continue;
        };
        println!("Pile {}:", pile + 1);
        println!(
            "  Head displacement:  ux = {:.3} mm, uz = {:.3} mm",
            summary.head_lateral_displacement * 1000.0,
            summary.head_axial_displacement * 1000.0
        );
        println!(
            "  Max moment:         {:.2} kN·m at z = {:.2} m",
            summary.max_moment.1, summary.max_moment.0
        );
        println!(
            "  Max shear:          {:.2} kN at z = {:.2} m",
            summary.max_shear.1, summary.max_shear.0
        );
        println!("  Head axial force:   {:.2} kN\n", summary.head_axial_force);
    }

    println!("Lateral displacement, pile 1:");
    if let Some(series) = modeler.get_lateral_displacements().first() {
        for (z, ux) in &series.points {
            println!("  z = {:>7.3} m   ux = {:>9.4} mm", z, ux * 1000.0);
        }
    }
    Ok(())
}
