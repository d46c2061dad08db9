//! Benchmarks for constrained eigen assembly

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fea_constraints::prelude::*;

/// Left half of a Pratt truss with `panels` panels; the mid-span nodes sit
/// on the symmetry line
fn create_half_truss(panels: usize) -> Domain {
    let mut domain = Domain::new();

    let panel_width = 3.0;
    let depth = 2.5;
    let (e, a, rho) = (200e9, 2e-3, 15.7);

    // Bottom chord nodes 1.., top chord nodes 1001..
    for i in 0..=panels {
        let x = i as f64 * panel_width;
        let bottom = Node::planar(i as i32 + 1, x, 0.0).with_lumped_mass(100.0);
        let top = Node::planar(i as i32 + 1001, x, depth).with_lumped_mass(100.0);
        domain.add_node(bottom).unwrap();
        domain.add_node(top).unwrap();
    }

    let mut tag = 1;
    for i in 0..panels {
        let (b0, b1) = (i as i32 + 1, i as i32 + 2);
        let (t0, t1) = (b0 + 1000, b1 + 1000);
        for (n1, n2) in [(b0, b1), (t0, t1), (b0, t0), (b0, t1)] {
            domain
                .add_element(Truss::new(tag, n1, n2, e, a).with_rho(rho))
                .unwrap();
            tag += 1;
        }
    }
    let (b_mid, t_mid) = (panels as i32 + 1, panels as i32 + 1001);
    domain
        .add_element(Truss::new(tag, b_mid, t_mid, e, a / 2.0).with_rho(rho / 2.0))
        .unwrap();

    domain.add_sp_constraint(SFreedomConstraint::homogeneous(1, 1, 0)).unwrap();
    domain.add_sp_constraint(SFreedomConstraint::homogeneous(2, 1, 1)).unwrap();

    let mirror = Line::with_normal([1.0, 0.0]);
    domain.add_mp_constraint(MFreedomConstraint::skew(1, b_mid, mirror)).unwrap();
    domain.add_mp_constraint(MFreedomConstraint::skew(2, t_mid, mirror)).unwrap();

    domain
}

fn benchmark_small_truss(c: &mut Criterion) {
    let mut domain = create_half_truss(4);
    c.bench_function("half_truss_4panel_dense", |b| {
        b.iter(|| {
            let problem = EigenAnalysis::new(AnalysisOptions::default())
                .assemble(&mut domain)
                .unwrap();
            black_box(problem.stiffness());
            problem.teardown(&mut domain);
        })
    });
}

fn benchmark_large_truss_sparse(c: &mut Criterion) {
    let mut domain = create_half_truss(60);
    let options = AnalysisOptions::default()
        .with_numberer(NumbererType::Rcm)
        .with_storage(SoeStorage::Sparse);
    c.bench_function("half_truss_60panel_rcm_sparse", |b| {
        b.iter(|| {
            let problem = EigenAnalysis::new(options.clone())
                .assemble(&mut domain)
                .unwrap();
            black_box(problem.num_eqn());
            problem.teardown(&mut domain);
        })
    });
}

fn benchmark_identity_mass(c: &mut Criterion) {
    let mut domain = create_half_truss(20);
    c.bench_function("half_truss_20panel_identity_mass", |b| {
        b.iter(|| {
            let problem = EigenAnalysis::new(AnalysisOptions::standard())
                .assemble(&mut domain)
                .unwrap();
            black_box(problem.mass());
            problem.teardown(&mut domain);
        })
    });
}

criterion_group!(
    benches,
    benchmark_small_truss,
    benchmark_large_truss_sparse,
    benchmark_identity_mass,
);

criterion_main!(benches);
