//! FEA Constraints Example - Half model of a symmetric truss
//!
//! Usage: fea-example [options.json]

use anyhow::{Context, Result};
use fea_constraints::prelude::*;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read options from {}", path))?;
            AnalysisOptions::from_json(&json).context("invalid analysis options")?
        }
        None => AnalysisOptions::default().with_logging(),
    };

    println!("=== FEA Constraints Example: Symmetric King-Post Truss ===\n");

    // Left half of the truss; the right half is mirrored about x = 3
    //
    //            N3
    //           / |
    //          /  |
    //         /   |
    //       N1 -- N2
    //       ^     :
    //     Pinned  symmetry line
    //
    let span = 6.0;
    let rise = 2.0;

    let mut domain = Domain::new();
    domain.add_node(Node::planar(1, 0.0, 0.0))?;
    domain.add_node(Node::planar(2, span / 2.0, 0.0).with_lumped_mass(50.0))?;
    domain.add_node(Node::planar(3, span / 2.0, rise).with_lumped_mass(80.0))?;

    let (e, a, rho) = (200e9, 5e-4, 3.9);
    domain.add_element(Truss::new(1, 1, 2, e, a).with_rho(rho))?;
    domain.add_element(Truss::new(2, 1, 3, e, a).with_rho(rho))?;
    // Half of the king post lies on the symmetry line
    domain.add_element(Truss::new(3, 2, 3, e, a / 2.0).with_rho(rho / 2.0))?;

    domain.add_sp_constraint(SFreedomConstraint::homogeneous(1, 1, 0))?;
    domain.add_sp_constraint(SFreedomConstraint::homogeneous(2, 1, 1))?;

    let mirror = Line::through([span / 2.0, 0.0], [span / 2.0, rise]);
    domain.add_mp_constraint(MFreedomConstraint::skew(1, 2, mirror))?;
    domain.add_mp_constraint(MFreedomConstraint::skew(2, 3, mirror))?;

    let problem = EigenAnalysis::new(options.clone()).assemble(&mut domain)?;
    info!("numberer {:?}, storage {:?}", options.numberer, options.storage);

    println!("Equations: {}", problem.num_eqn());
    for mp in domain.mp_constraints() {
        println!(
            "Constraint {} on node {}: constrained {:?}, retained {:?}",
            mp.tag(),
            mp.constrained_node_tag(),
            mp.constrained_dofs(),
            mp.retained_dofs()
        );
    }

    let k = problem.stiffness();
    let m = problem.mass();
    println!("\nStiffness diagonal:");
    for i in 0..k.nrows() {
        println!("  K[{:2}] = {:12.4e}   M[{:2}] = {:10.4}", i, k[(i, i)], i, m[(i, i)]);
    }

    problem.teardown(&mut domain);
    println!("\n=== Assembly Complete ===");
    Ok(())
}
