use criterion::{black_box, criterion_group, criterion_main, Criterion};
use faer::Mat;
use faer::linalg::solvers::SolveCore;
use kryls::solver::{BiCgStabSolver, CgSolver, GmresSolver, IterativeLinearSystemSolver, MinresSolver};
use kryls::{CsrMatrix, LsProblem, PC};

/// 5-point Laplacian on a k × k grid, with an optional upwind convection term.
fn laplacian_2d(k: usize, convection: f64) -> Vec<(usize, usize, f64)> {
    let idx = |i: usize, j: usize| i * k + j;
    let mut t = Vec::new();
    for i in 0..k {
        for j in 0..k {
            let row = idx(i, j);
            t.push((row, row, 4.0));
            if i > 0 {
                t.push((row, idx(i - 1, j), -1.0 - convection));
            }
            if i + 1 < k {
                t.push((row, idx(i + 1, j), -1.0));
            }
            if j > 0 {
                t.push((row, idx(i, j - 1), -1.0));
            }
            if j + 1 < k {
                t.push((row, idx(i, j + 1), -1.0));
            }
        }
    }
    t
}

fn bench_spd(c: &mut Criterion) {
    let k = 20;
    let n = k * k;
    let triplets = laplacian_2d(k, 0.0);
    let b: Vec<f64> = (0..n).map(|i| (i as f64).cos()).collect();
    let sparse = LsProblem::new(CsrMatrix::from_triplets(n, n, &triplets), b.clone()).unwrap();
    let mut dense_a = Mat::from_fn(n, n, |_, _| 0.0);
    for &(i, j, v) in &triplets {
        dense_a[(i, j)] = v;
    }
    let x0 = vec![0.0; n];

    c.bench_function("cg csr", |ben| {
        let solver = CgSolver::new(1e-8, 1000);
        ben.iter(|| solver.solve(black_box(&sparse)).unwrap().search(black_box(&x0)).unwrap())
    });

    c.bench_function("cg+ssor csr", |ben| {
        let solver = CgSolver::new(1e-8, 1000).with_pc(PC::Ssor { omega: 1.5 });
        ben.iter(|| solver.solve(black_box(&sparse)).unwrap().search(black_box(&x0)).unwrap())
    });

    c.bench_function("minres csr", |ben| {
        let solver = MinresSolver::new(1e-8, 1000);
        ben.iter(|| solver.solve(black_box(&sparse)).unwrap().search(black_box(&x0)).unwrap())
    });

    c.bench_function("faer raw LU", |ben| {
        ben.iter(|| {
            let factor = faer::linalg::solvers::FullPivLu::new(dense_a.as_ref());
            let mut y = b.clone();
            let y_mat = faer::MatMut::from_column_major_slice_mut(&mut y, n, 1);
            factor.solve_in_place_with_conj(faer::Conj::No, y_mat);
        })
    });
}

fn bench_nonsymmetric(c: &mut Criterion) {
    let k = 20;
    let n = k * k;
    let b: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
    let problem = LsProblem::new(CsrMatrix::from_triplets(n, n, &laplacian_2d(k, 0.5)), b).unwrap();
    let x0 = vec![0.0; n];

    c.bench_function("gmres(30)+ilu0 csr", |ben| {
        let solver = GmresSolver::new(1e-8, 1000).with_restart(30).with_pc(PC::Ilu0);
        ben.iter(|| solver.solve(black_box(&problem)).unwrap().search(black_box(&x0)).unwrap())
    });

    c.bench_function("bicgstab+jacobi csr", |ben| {
        let solver = BiCgStabSolver::new(1e-8, 1000).with_pc(PC::Jacobi);
        ben.iter(|| solver.solve(black_box(&problem)).unwrap().search(black_box(&x0)).unwrap())
    });
}

criterion_group!(benches, bench_spd, bench_nonsymmetric);
criterion_main!(benches);
