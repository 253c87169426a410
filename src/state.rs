use crate::error::{FluidError, FluidResult};

/// Smallest grid that still has one interior cell per axis.
pub const MIN_N: usize = 3;

/// Convert 2D coordinates to a flat index.
/// x is the outer stride: cells sharing an x are contiguous.
#[inline(always)]
pub const fn idx(x: usize, y: usize, n: usize) -> usize {
    y + x * n
}

/// Inverse of [`idx`].
#[inline(always)]
pub const fn coord(index: usize, n: usize) -> (usize, usize) {
    (index / n, index % n)
}

/// Reject coordinates outside `[0, n)` on either axis.
pub fn check_coord(x: usize, y: usize, n: usize) -> FluidResult<()> {
    if x >= n || y >= n {
        return Err(FluidError::InvalidCoordinate { x, y, n });
    }
    Ok(())
}

/// Field buffers for one simulation. Allocated once, zeroed, mutated in place.
pub struct SimState {
    pub n: usize,
    pub density: Vec<f64>,
    /// Scratch for the density phase (diffused density before advection).
    pub density0: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    /// Scratch for the velocity phase; doubles as pressure/divergence storage.
    pub vx0: Vec<f64>,
    pub vy0: Vec<f64>,
    /// Back buffer for Jacobi relaxation.
    pub relax_tmp: Vec<f64>,
}

impl SimState {
    pub fn new(n: usize) -> FluidResult<Self> {
        if n < MIN_N {
            return Err(FluidError::InvalidGridSize { n });
        }
        let size = n * n;
        Ok(Self {
            n,
            density: vec![0.0; size],
            density0: vec![0.0; size],
            vx: vec![0.0; size],
            vy: vec![0.0; size],
            vx0: vec![0.0; size],
            vy0: vec![0.0; size],
            relax_tmp: vec![0.0; size],
        })
    }

    /// Zero every buffer, keeping the allocations.
    pub fn clear(&mut self) {
        for buf in [
            &mut self.density,
            &mut self.density0,
            &mut self.vx,
            &mut self.vy,
            &mut self.vx0,
            &mut self.vy0,
            &mut self.relax_tmp,
        ] {
            buf.fill(0.0);
        }
    }
}
