use crate::state::idx;

/// Sum of a scalar field over interior cells (edge cells only mirror them).
pub fn compute_total_density(density: &[f64], n: usize) -> f64 {
    let mut sum = 0.0;
    for i in 1..(n - 1) {
        for j in 1..(n - 1) {
            sum += density[idx(i, j, n)];
        }
    }
    sum
}

/// Compute volume-averaged kinetic energy: KE = 0.5 * <vx² + vy²>.
pub fn compute_kinetic_energy(vx: &[f64], vy: &[f64], n: usize) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 1..(n - 1) {
        for j in 1..(n - 1) {
            let ii = idx(i, j, n);
            sum += vx[ii] * vx[ii] + vy[ii] * vy[ii];
            count += 1;
        }
    }
    if count > 0 { 0.5 * sum / count as f64 } else { 0.0 }
}

/// Largest central-difference divergence magnitude over interior cells,
/// in cell units: 0.5 * |dvx/di + dvy/dj|.
pub fn compute_max_divergence(vx: &[f64], vy: &[f64], n: usize) -> f64 {
    let mut max = 0.0_f64;
    for i in 1..(n - 1) {
        for j in 1..(n - 1) {
            let d = 0.5
                * (vx[idx(i + 1, j, n)] - vx[idx(i - 1, j, n)]
                    + vy[idx(i, j + 1, n)] - vy[idx(i, j - 1, n)]);
            max = max.max(d.abs());
        }
    }
    max
}
