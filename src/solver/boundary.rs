use crate::state::idx;

/// Field type for boundary condition dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Density, pressure, divergence: edges copy their inward neighbor.
    Scalar,
    /// Horizontal velocity: negated on the left/right walls.
    Vx,
    /// Vertical velocity: negated on the top/bottom walls.
    Vy,
}

impl FieldType {
    fn sign_x(self) -> f64 {
        if self == FieldType::Vx { -1.0 } else { 1.0 }
    }

    fn sign_y(self) -> f64 {
        if self == FieldType::Vy { -1.0 } else { 1.0 }
    }
}

/// Boundary condition handler for the closed box.
///   - `FieldType::Scalar`: Neumann (copy neighbor) on all walls
///   - `FieldType::Vx`: negate at left/right walls (no penetration)
///   - `FieldType::Vy`: negate at top/bottom walls (no penetration)
/// Corners take the mean of their two edge neighbors.
pub fn set_bnd(field_type: FieldType, x: &mut [f64], n: usize) {
    debug_assert_eq!(x.len(), n * n);
    let sy = field_type.sign_y();
    let sx = field_type.sign_x();

    // Pass 1: rows y=0 and y=N-1
    for i in 0..n {
        x[idx(i, 0, n)] = sy * x[idx(i, 1, n)];
        x[idx(i, n - 1, n)] = sy * x[idx(i, n - 2, n)];
    }

    // Pass 2: columns x=0 and x=N-1
    for j in 0..n {
        x[idx(0, j, n)] = sx * x[idx(1, j, n)];
        x[idx(n - 1, j, n)] = sx * x[idx(n - 2, j, n)];
    }

    let last = n - 1;
    x[idx(0, 0, n)] = 0.5 * (x[idx(1, 0, n)] + x[idx(0, 1, n)]);
    x[idx(0, last, n)] = 0.5 * (x[idx(1, last, n)] + x[idx(0, last - 1, n)]);
    x[idx(last, 0, n)] = 0.5 * (x[idx(last - 1, 0, n)] + x[idx(last, 1, n)]);
    x[idx(last, last, n)] = 0.5 * (x[idx(last - 1, last, n)] + x[idx(last, last - 1, n)]);
}
