use serde::Deserialize;

use crate::error::{FluidError, FluidResult};

/// How a relaxation sweep reads its neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxScheme {
    /// Sequential in-place sweep: each cell sees neighbors already updated in
    /// the same sweep. Deterministic, converges fastest per iteration.
    #[default]
    GaussSeidel,
    /// Double-buffered sweep: each cell sees only the previous sweep. Runs
    /// columns in parallel and is deterministic for any thread count.
    Jacobi,
}

/// Fixed-cost relaxation settings for one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relax {
    pub iterations: usize,
    pub scheme: RelaxScheme,
}

/// Solver parameters for the fluid simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams {
    pub dt: f64,
    pub diff: f64,
    pub visc: f64,
    pub diffuse_iter: usize,
    pub project_iter: usize,
    pub relax: RelaxScheme,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            dt: 0.05,
            diff: 1e-7,
            visc: 1e-7,
            diffuse_iter: 16,
            project_iter: 16,
            relax: RelaxScheme::GaussSeidel,
        }
    }
}

impl SolverParams {
    /// Parameters with the default iteration counts and scheme.
    pub fn new(dt: f64, diff: f64, visc: f64) -> Self {
        Self { dt, diff, visc, ..Self::default() }
    }

    pub fn with_relax(mut self, relax: RelaxScheme) -> Self {
        self.relax = relax;
        self
    }

    pub fn diffuse_relax(&self) -> Relax {
        Relax { iterations: self.diffuse_iter, scheme: self.relax }
    }

    pub fn project_relax(&self) -> Relax {
        Relax { iterations: self.project_iter, scheme: self.relax }
    }

    /// Check every precondition the solver relies on.
    pub fn validate(&self) -> FluidResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(FluidError::InvalidTimestep { dt: self.dt });
        }
        check_rate("diffusion rate", self.diff)?;
        check_rate("viscosity", self.visc)?;
        if self.diffuse_iter == 0 {
            return Err(FluidError::InvalidIterations { name: "diffusion" });
        }
        if self.project_iter == 0 {
            return Err(FluidError::InvalidIterations { name: "projection" });
        }
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> FluidResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(FluidError::InvalidRate { name, value });
    }
    Ok(())
}
