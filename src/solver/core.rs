use crate::state::idx;
use super::boundary::{set_bnd, FieldType};
use super::parallel::{for_each_column, for_each_column_pair};
use super::params::{Relax, RelaxScheme};

/// Iterative linear solver.
/// Solves: x[i,j] = (x0[i,j] + a * (neighbors)) / c
///
/// Runs exactly `relax.iterations` sweeps with a boundary pass after each one.
/// `tmp` is only written by the Jacobi scheme.
pub fn lin_solve(
    field_type: FieldType,
    x: &mut [f64],
    x0: &[f64],
    a: f64,
    c: f64,
    relax: Relax,
    tmp: &mut [f64],
    n: usize,
) {
    let c_inv = 1.0 / c;
    for _ in 0..relax.iterations {
        match relax.scheme {
            RelaxScheme::GaussSeidel => gauss_seidel_sweep(x, x0, a, c_inv, n),
            RelaxScheme::Jacobi => {
                jacobi_sweep(tmp, x, x0, a, c_inv, n);
                x.copy_from_slice(tmp);
            }
        }
        set_bnd(field_type, x, n);
    }
}

fn gauss_seidel_sweep(x: &mut [f64], x0: &[f64], a: f64, c_inv: f64, n: usize) {
    for i in 1..(n - 1) {
        for j in 1..(n - 1) {
            let neighbors = x[idx(i - 1, j, n)]
                + x[idx(i + 1, j, n)]
                + x[idx(i, j - 1, n)]
                + x[idx(i, j + 1, n)];
            x[idx(i, j, n)] = (x0[idx(i, j, n)] + a * neighbors) * c_inv;
        }
    }
}

fn jacobi_sweep(dst: &mut [f64], src: &[f64], x0: &[f64], a: f64, c_inv: f64, n: usize) {
    for_each_column(dst, n, |i, col| {
        if i == 0 || i == n - 1 {
            col.copy_from_slice(&src[idx(i, 0, n)..idx(i + 1, 0, n)]);
            return;
        }
        col[0] = src[idx(i, 0, n)];
        col[n - 1] = src[idx(i, n - 1, n)];
        for j in 1..(n - 1) {
            let neighbors = src[idx(i - 1, j, n)]
                + src[idx(i + 1, j, n)]
                + src[idx(i, j - 1, n)]
                + src[idx(i, j + 1, n)];
            col[j] = (x0[idx(i, j, n)] + a * neighbors) * c_inv;
        }
    });
}

/// Diffusion step: spreads the field over time.
/// a = dt * diff * (N-2)^2, c = 1 + 4a
pub fn diffuse(
    field_type: FieldType,
    x: &mut [f64],
    x0: &[f64],
    diff: f64,
    dt: f64,
    relax: Relax,
    tmp: &mut [f64],
    n: usize,
) {
    let a = dt * diff * ((n - 2) as f64) * ((n - 2) as f64);
    let c = 1.0 + 4.0 * a;
    // Initialize x from x0
    x.copy_from_slice(x0);
    lin_solve(field_type, x, x0, a, c, relax, tmp, n);
}

/// Semi-Lagrangian advection: traces each cell backwards through the velocity
/// field and resamples `d0` bilinearly at the source point.
pub fn advect(
    field_type: FieldType,
    d: &mut [f64],
    d0: &[f64],
    vx: &[f64],
    vy: &[f64],
    dt: f64,
    n: usize,
) {
    let dt0 = dt * (n - 2) as f64;
    // Keep i1 = floor(x) + 1 inside the grid.
    let hi = n as f64 - 1.5;

    for_each_column(d, n, |i, col| {
        if i == 0 || i == n - 1 {
            return;
        }
        for j in 1..(n - 1) {
            let ii = idx(i, j, n);
            // Trace backwards
            let x = (i as f64 - dt0 * vx[ii]).clamp(0.5, hi);
            let y = (j as f64 - dt0 * vy[ii]).clamp(0.5, hi);

            let i0 = x.floor() as usize;
            let i1 = i0 + 1;
            let j0 = y.floor() as usize;
            let j1 = j0 + 1;
            let s1 = x - i0 as f64;
            let s0 = 1.0 - s1;
            let t1 = y - j0 as f64;
            let t0 = 1.0 - t1;

            col[j] = s0 * (t0 * d0[idx(i0, j0, n)] + t1 * d0[idx(i0, j1, n)])
                + s1 * (t0 * d0[idx(i1, j0, n)] + t1 * d0[idx(i1, j1, n)]);
        }
    });
    set_bnd(field_type, d, n);
}

/// Pressure projection: enforces incompressibility (divergence-free velocity field).
/// `p` and `div` are scratch; their previous contents are discarded.
pub fn project(
    vx: &mut [f64],
    vy: &mut [f64],
    p: &mut [f64],
    div: &mut [f64],
    relax: Relax,
    tmp: &mut [f64],
    n: usize,
) {
    let h = 1.0 / n as f64;

    // Calculate divergence
    {
        let (vx, vy) = (&*vx, &*vy);
        for_each_column_pair(div, p, n, |i, div_col, p_col| {
            if i == 0 || i == n - 1 {
                return;
            }
            for j in 1..(n - 1) {
                div_col[j] = -0.5
                    * h
                    * (vx[idx(i + 1, j, n)] - vx[idx(i - 1, j, n)]
                        + vy[idx(i, j + 1, n)] - vy[idx(i, j - 1, n)]);
                p_col[j] = 0.0;
            }
        });
    }
    set_bnd(FieldType::Scalar, div, n);
    set_bnd(FieldType::Scalar, p, n);

    // Solve for pressure
    lin_solve(FieldType::Scalar, p, div, 1.0, 4.0, relax, tmp, n);

    // Subtract pressure gradient from velocity
    {
        let p = &*p;
        for_each_column_pair(vx, vy, n, |i, vx_col, vy_col| {
            if i == 0 || i == n - 1 {
                return;
            }
            for j in 1..(n - 1) {
                vx_col[j] -= 0.5 * (p[idx(i + 1, j, n)] - p[idx(i - 1, j, n)]) / h;
                vy_col[j] -= 0.5 * (p[idx(i, j + 1, n)] - p[idx(i, j - 1, n)]) / h;
            }
        });
    }
    set_bnd(FieldType::Vx, vx, n);
    set_bnd(FieldType::Vy, vy, n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::diagnostics::compute_max_divergence;
    use crate::solver::parallel::should_parallel;

    const N: usize = 16;

    fn relax(scheme: RelaxScheme) -> Relax {
        Relax { iterations: 16, scheme }
    }

    const SCHEMES: [RelaxScheme; 2] = [RelaxScheme::GaussSeidel, RelaxScheme::Jacobi];

    #[test]
    fn test_lin_solve_converges() {
        for scheme in SCHEMES {
            let mut x = vec![0.0; N * N];
            let mut x0 = vec![0.0; N * N];
            let mut tmp = vec![0.0; N * N];
            let mid = N / 2;
            x0[idx(mid, mid, N)] = 100.0;
            x.copy_from_slice(&x0);

            lin_solve(FieldType::Scalar, &mut x, &x0, 1.0, 5.0, Relax { iterations: 20, scheme }, &mut tmp, N);

            let center = x[idx(mid, mid, N)];
            let neighbor = x[idx(mid + 1, mid, N)];
            assert!(center > 0.0, "{:?}: center should still be positive", scheme);
            assert!(neighbor > 0.0, "{:?}: neighbors should get some value", scheme);
            assert!(center > neighbor, "{:?}: center should be larger than neighbor", scheme);
        }
    }

    #[test]
    fn test_lin_solve_zero_coupling_is_identity() {
        // a = 0, c = 1: every interior cell becomes its source value
        for scheme in SCHEMES {
            let x0: Vec<f64> = (0..N * N).map(|k| (k as f64 * 0.37).sin()).collect();
            let mut x = vec![9.0; N * N];
            let mut tmp = vec![0.0; N * N];
            for iterations in [1, 3, 16] {
                lin_solve(FieldType::Scalar, &mut x, &x0, 0.0, 1.0, Relax { iterations, scheme }, &mut tmp, N);
                for i in 1..(N - 1) {
                    for j in 1..(N - 1) {
                        assert_eq!(x[idx(i, j, N)], x0[idx(i, j, N)], "{:?} at ({}, {})", scheme, i, j);
                    }
                }
            }
        }
    }

    #[test]
    fn test_lin_solve_boundary_after_every_sweep() {
        for scheme in SCHEMES {
            let mut x = vec![0.0; N * N];
            let mut x0 = vec![0.0; N * N];
            let mut tmp = vec![0.0; N * N];
            x0[idx(1, 5, N)] = 10.0;
            lin_solve(FieldType::Vx, &mut x, &x0, 1.0, 5.0, Relax { iterations: 1, scheme }, &mut tmp, N);
            assert_eq!(x[idx(0, 5, N)], -x[idx(1, 5, N)]);
            assert!(x[idx(1, 5, N)] > 0.0);
        }
    }

    #[test]
    fn test_diffuse_smooths() {
        for scheme in SCHEMES {
            let mut x0 = vec![0.0; N * N];
            let mut x = vec![0.0; N * N];
            let mut tmp = vec![0.0; N * N];
            let mid = N / 2;
            x0[idx(mid, mid, N)] = 100.0;

            diffuse(FieldType::Scalar, &mut x, &x0, 0.1, 0.1, relax(scheme), &mut tmp, N);

            let center = x[idx(mid, mid, N)];
            let neighbor = x[idx(mid + 1, mid, N)];
            assert!(center < 100.0, "Center should be less than original spike");
            assert!(neighbor > 0.0, "Neighbors should gain some value");
        }
    }

    #[test]
    fn test_diffuse_zero_rate_is_identity() {
        let x0: Vec<f64> = (0..N * N).map(|k| k as f64).collect();
        let mut x = vec![0.0; N * N];
        let mut tmp = vec![0.0; N * N];
        diffuse(FieldType::Scalar, &mut x, &x0, 0.0, 0.1, relax(RelaxScheme::GaussSeidel), &mut tmp, N);
        for i in 1..(N - 1) {
            for j in 1..(N - 1) {
                assert_eq!(x[idx(i, j, N)], x0[idx(i, j, N)]);
            }
        }
    }

    #[test]
    fn test_advect_zero_velocity_preserves() {
        let mut d0 = vec![0.0; N * N];
        let mut d = vec![0.0; N * N];
        let vx = vec![0.0; N * N];
        let vy = vec![0.0; N * N];

        for i in 0..N {
            for j in 0..N {
                d0[idx(i, j, N)] = (i * N + 3 * j) as f64 / N as f64;
            }
        }

        advect(FieldType::Scalar, &mut d, &d0, &vx, &vy, 0.1, N);

        for i in 1..(N - 1) {
            for j in 1..(N - 1) {
                let orig = d0[idx(i, j, N)];
                let advected = d[idx(i, j, N)];
                assert!(
                    (orig - advected).abs() < 1e-12,
                    "Zero velocity should preserve field at ({}, {}): {} vs {}",
                    i, j, orig, advected
                );
            }
        }
    }

    #[test]
    fn test_advect_uniform_field_unchanged() {
        let d0 = vec![5.0; N * N];
        let mut d = vec![0.0; N * N];
        let vx = vec![0.01; N * N];
        let vy = vec![-0.02; N * N];

        advect(FieldType::Scalar, &mut d, &d0, &vx, &vy, 0.1, N);

        for (k, &val) in d.iter().enumerate() {
            assert!(
                (val - 5.0).abs() < 1e-9,
                "Uniform field should stay uniform: got {} at index {}",
                val, k
            );
        }
    }

    #[test]
    fn test_advect_shifts_by_whole_cells() {
        // dt0 * vx = 1 cell: every interior cell pulls from its left neighbor
        let mut d0 = vec![0.0; N * N];
        let mut d = vec![0.0; N * N];
        let dt = 0.1;
        let cells_per_unit = dt * (N - 2) as f64;
        let vx = vec![1.0 / cells_per_unit; N * N];
        let vy = vec![0.0; N * N];
        d0[idx(5, 7, N)] = 1.0;

        advect(FieldType::Scalar, &mut d, &d0, &vx, &vy, dt, N);

        assert!((d[idx(6, 7, N)] - 1.0).abs() < 1e-9, "got {}", d[idx(6, 7, N)]);
        assert!(d[idx(5, 7, N)].abs() < 1e-9);
    }

    #[test]
    fn test_advect_clamps_far_backtrace() {
        let d0 = vec![1.0; N * N];
        let mut d = vec![0.0; N * N];
        // Backtrace lands far outside the grid on both sides
        let vx = vec![50.0; N * N];
        let vy = vec![-50.0; N * N];

        advect(FieldType::Scalar, &mut d, &d0, &vx, &vy, 0.1, N);

        for &val in &d {
            assert!((val - 1.0).abs() < 1e-9, "Clamped sample should stay in range: {}", val);
        }
    }

    #[test]
    fn test_advect_smallest_grid() {
        let n = 3;
        let d0 = vec![2.0; n * n];
        let mut d = vec![0.0; n * n];
        let vx = vec![-100.0; n * n];
        let vy = vec![100.0; n * n];
        advect(FieldType::Scalar, &mut d, &d0, &vx, &vy, 1.0, n);
        assert!(d.iter().all(|&v| (v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_project_uniform_velocity_is_noop() {
        for scheme in SCHEMES {
            let mut vx = vec![0.3; N * N];
            let mut vy = vec![-0.7; N * N];
            let mut p = vec![1.0; N * N];
            let mut div = vec![1.0; N * N];
            let mut tmp = vec![0.0; N * N];

            project(&mut vx, &mut vy, &mut p, &mut div, relax(scheme), &mut tmp, N);

            for i in 1..(N - 1) {
                for j in 1..(N - 1) {
                    assert!((div[idx(i, j, N)]).abs() < 1e-12);
                    assert!((vx[idx(i, j, N)] - 0.3).abs() < 1e-9, "{:?}: vx changed at ({}, {})", scheme, i, j);
                    assert!((vy[idx(i, j, N)] + 0.7).abs() < 1e-9, "{:?}: vy changed at ({}, {})", scheme, i, j);
                }
            }
        }
    }

    #[test]
    fn test_project_reduces_divergence() {
        for scheme in SCHEMES {
            let mut vx = vec![0.0; N * N];
            let mut vy = vec![0.0; N * N];
            let mut p = vec![0.0; N * N];
            let mut div = vec![0.0; N * N];
            let mut tmp = vec![0.0; N * N];

            let c = (N / 2) as f64;
            let sigma = (N * N) as f64 / 32.0;
            for i in 1..(N - 1) {
                for j in 1..(N - 1) {
                    let dx = i as f64 - c;
                    let dy = j as f64 - c;
                    let g = (-(dx * dx + dy * dy) / sigma).exp();
                    vx[idx(i, j, N)] = dx * 0.01 * g;
                    vy[idx(i, j, N)] = dy * 0.01 * g;
                }
            }

            let before = compute_max_divergence(&vx, &vy, N);
            assert!(before > 0.0, "Should have some initial divergence");

            project(&mut vx, &mut vy, &mut p, &mut div, Relax { iterations: 40, scheme }, &mut tmp, N);

            let after = compute_max_divergence(&vx, &vy, N);
            assert!(
                after < before,
                "{:?}: divergence should be reduced: before={}, after={}",
                scheme, before, after
            );
        }
    }

    #[test]
    fn test_schemes_agree_without_coupling() {
        // Deterministic schemes give identical results when no neighbor feeds back
        let x0: Vec<f64> = (0..N * N).map(|k| k as f64).collect();
        let mut gs = vec![0.0; N * N];
        let mut jac = vec![0.0; N * N];
        let mut tmp = vec![0.0; N * N];
        lin_solve(FieldType::Scalar, &mut gs, &x0, 0.0, 2.0, relax(RelaxScheme::GaussSeidel), &mut tmp, N);
        lin_solve(FieldType::Scalar, &mut jac, &x0, 0.0, 2.0, relax(RelaxScheme::Jacobi), &mut tmp, N);
        assert_eq!(gs, jac);
    }

    /// Jacobi solve plus projection on a grid big enough for the rayon path,
    /// run inside a pool of `threads` workers.
    fn jacobi_on_pool(threads: usize, n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
        pool.install(|| {
            assert!(should_parallel(n * n), "{} threads: grid {} must take the parallel path", threads, n);
            let jacobi = Relax { iterations: 16, scheme: RelaxScheme::Jacobi };
            let mut tmp = vec![0.0; n * n];

            let x0: Vec<f64> = (0..n * n).map(|k| ((k * 7919) % 1000) as f64 * 0.01).collect();
            let mut x = x0.clone();
            lin_solve(FieldType::Scalar, &mut x, &x0, 1.0, 5.0, jacobi, &mut tmp, n);

            let mut vx: Vec<f64> = (0..n * n).map(|k| ((k * 31) % 17) as f64 * 0.1 - 0.8).collect();
            let mut vy: Vec<f64> = (0..n * n).map(|k| ((k * 13) % 23) as f64 * 0.05 - 0.5).collect();
            let mut p = vec![0.0; n * n];
            let mut div = vec![0.0; n * n];
            project(&mut vx, &mut vy, &mut p, &mut div, jacobi, &mut tmp, n);
            (x, vx, vy)
        })
    }

    #[test]
    fn test_jacobi_same_result_for_any_thread_count() {
        let n = 200;
        let single = jacobi_on_pool(1, n);
        let many = jacobi_on_pool(8, n);
        assert!(single.0 == many.0, "lin_solve differs between 1 and 8 threads");
        assert!(single.1 == many.1, "projected vx differs between 1 and 8 threads");
        assert!(single.2 == many.2, "projected vy differs between 1 and 8 threads");
    }
}
