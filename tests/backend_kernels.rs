//! Backend checks: both matrix backends agree with each other and with the
//! adjoint identity, and the shared vector kernels agree with plain loops.

use approx::assert_abs_diff_eq;
use faer::Mat;
use kryls::core::wrappers::{axpy, lincomb, scaled, sub};
use kryls::{CsrMatrix, InnerProduct, MatShape, MatTransVec, MatVec, MatrixGet};
use rand::Rng;

fn random_vec(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn random_rect(m: usize, n: usize) -> Mat<f64> {
    let vals = random_vec(m * n);
    Mat::from_fn(m, n, |i, j| vals[j * m + i])
}

#[test]
fn rectangular_transpose_product() {
    let (m, n) = (7, 4);
    let a = random_rect(m, n);
    let x = random_vec(m);
    let mut y = vec![0.0; n];
    a.mattransvec(&x, &mut y);
    for j in 0..n {
        let expected: f64 = (0..m).map(|i| a[(i, j)] * x[i]).sum();
        assert_abs_diff_eq!(y[j], expected, epsilon = 1e-12);
    }
}

/// ⟨A u, v⟩ = ⟨u, Aᵀ v⟩
#[test]
fn adjoint_identity_holds() {
    let (m, n) = (6, 9);
    let a = random_rect(m, n);
    let (u, v) = (random_vec(n), random_vec(m));
    let (mut au, mut atv) = (vec![0.0; m], vec![0.0; n]);
    a.matvec(&u, &mut au);
    a.mattransvec(&v, &mut atv);
    let ip = ();
    assert_abs_diff_eq!(ip.dot(&au, &v), ip.dot(&u, &atv), epsilon = 1e-12);
}

#[test]
fn inner_product_matches_sequential_fold() {
    let x = random_vec(1000);
    let y = random_vec(1000);
    let ip = ();
    let dot = x.iter().zip(&y).fold(0.0, |acc, (a, b)| acc + a * b);
    assert_abs_diff_eq!(ip.dot(&x, &y), dot, epsilon = 1e-10);
    let norm = x.iter().fold(0.0, |acc, a| acc + a * a).sqrt();
    assert_abs_diff_eq!(ip.norm(&x), norm, epsilon = 1e-10);
    assert_eq!(ip.norm(&Vec::<f64>::new()), 0.0);
}

#[test]
fn vector_kernels_agree() {
    let n = 50;
    let (x, y) = (random_vec(n), random_vec(n));
    let (a, b) = (0.75, -2.5);

    let mut acc = scaled(b, &y);
    axpy(a, &x, &mut acc);
    let combined = lincomb(a, &x, b, &y);
    let diff = sub(&x, &y);
    for i in 0..n {
        assert_abs_diff_eq!(acc[i], combined[i], epsilon = 1e-14);
        assert_abs_diff_eq!(diff[i], x[i] - y[i], epsilon = 1e-14);
    }
}

#[test]
fn csr_matches_dense() {
    let (m, n) = (5, 8);
    let dense = Mat::from_fn(m, n, |i, j| if (i + 2 * j) % 3 == 0 { (i + j) as f64 - 3.0 } else { 0.0 });
    let triplets: Vec<(usize, usize, f64)> = (0..m)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .filter(|&(i, j)| dense[(i, j)] != 0.0)
        .map(|(i, j)| (i, j, dense[(i, j)]))
        .collect();
    let sparse = CsrMatrix::from_triplets(m, n, &triplets);
    assert_eq!((sparse.nrows(), sparse.ncols()), (m, n));
    assert_eq!(sparse.nnz(), triplets.len());
    for i in 0..m {
        for j in 0..n {
            assert_eq!(sparse.get(i, j), dense[(i, j)]);
        }
    }

    let x = random_vec(n);
    let (mut ys, mut yd) = (vec![0.0; m], vec![0.0; m]);
    sparse.matvec(&x, &mut ys);
    dense.matvec(&x, &mut yd);
    for i in 0..m {
        assert_abs_diff_eq!(ys[i], yd[i], epsilon = 1e-12);
    }

    let v = random_vec(m);
    let (mut ts, mut td) = (vec![0.0; n], vec![0.0; n]);
    sparse.mattransvec(&v, &mut ts);
    dense.mattransvec(&v, &mut td);
    for j in 0..n {
        assert_abs_diff_eq!(ts[j], td[j], epsilon = 1e-12);
    }
}
