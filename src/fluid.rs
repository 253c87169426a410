use crate::error::{FluidError, FluidResult};
use crate::solver::{self, diagnostics, SolverParams};
use crate::state::{check_coord, idx, SimState};

/// A running simulation: the field buffers plus the parameters that advance them.
///
/// All mutation goes through `&mut self`, so perturbations can only land
/// between steps. Injection methods validate before writing; a rejected call
/// leaves every buffer untouched.
pub struct Fluid {
    state: SimState,
    params: SolverParams,
}

impl Fluid {
    /// Create an `n`×`n` grid with default iteration counts and relaxation scheme.
    pub fn new(n: usize, dt: f64, diffusion: f64, viscosity: f64) -> FluidResult<Self> {
        Self::with_params(n, SolverParams::new(dt, diffusion, viscosity))
    }

    pub fn with_params(n: usize, params: SolverParams) -> FluidResult<Self> {
        params.validate()?;
        let state = SimState::new(n)?;
        log::info!(
            "fluid grid {n}x{n}: dt={} diff={} visc={} iters={}/{} relax={:?}",
            params.dt, params.diff, params.visc, params.diffuse_iter, params.project_iter, params.relax,
        );
        Ok(Self { state, params })
    }

    pub fn size(&self) -> usize {
        self.state.n
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Current density, indexed by [`idx`](crate::state::idx).
    pub fn density(&self) -> &[f64] {
        &self.state.density
    }

    pub fn vx(&self) -> &[f64] {
        &self.state.vx
    }

    pub fn vy(&self) -> &[f64] {
        &self.state.vy
    }

    /// Value of the density at one cell.
    pub fn density_at(&self, x: usize, y: usize) -> FluidResult<f64> {
        check_coord(x, y, self.state.n)?;
        Ok(self.state.density[idx(x, y, self.state.n)])
    }

    /// Velocity `(vx, vy)` at one cell.
    pub fn velocity_at(&self, x: usize, y: usize) -> FluidResult<(f64, f64)> {
        check_coord(x, y, self.state.n)?;
        let ii = idx(x, y, self.state.n);
        Ok((self.state.vx[ii], self.state.vy[ii]))
    }

    pub fn add_density(&mut self, x: usize, y: usize, amount: f64) -> FluidResult<()> {
        check_coord(x, y, self.state.n)?;
        check_finite("density amount", amount)?;
        self.state.density[idx(x, y, self.state.n)] += amount;
        Ok(())
    }

    pub fn add_velocity(&mut self, x: usize, y: usize, dx: f64, dy: f64) -> FluidResult<()> {
        check_coord(x, y, self.state.n)?;
        check_finite("velocity x", dx)?;
        check_finite("velocity y", dy)?;
        let ii = idx(x, y, self.state.n);
        self.state.vx[ii] += dx;
        self.state.vy[ii] += dy;
        Ok(())
    }

    /// Lower every positive density cell by `amount`, flooring at zero.
    pub fn fade_density(&mut self, amount: f64) -> FluidResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(FluidError::InvalidRate { name: "fade amount", value: amount });
        }
        for d in self.state.density.iter_mut().filter(|d| **d > 0.0) {
            *d = (*d - amount).max(0.0);
        }
        Ok(())
    }

    /// Advance one full tick: velocity phase, then density phase.
    pub fn step(&mut self) {
        solver::fluid_step(&mut self.state, &self.params);
        self.log_diagnostics("step");
    }

    /// Density phase only, using whatever velocity is stored.
    ///
    /// Not physically consistent on its own: density is carried by a stale (or
    /// zero) velocity field. Meant for isolated testing and benchmarking; use
    /// [`step`](Self::step) for simulation.
    pub fn density_step(&mut self) {
        solver::density_step(&mut self.state, &self.params);
        self.log_diagnostics("density_step");
    }

    /// Velocity phase only. Density is left where it is, so this is likewise
    /// meant for testing and benchmarking rather than simulation.
    pub fn velocity_step(&mut self) {
        solver::velocity_step(&mut self.state, &self.params);
        self.log_diagnostics("velocity_step");
    }

    /// Zero all fields, keeping grid size and parameters.
    pub fn reset(&mut self) {
        self.state.clear();
        log::debug!("fluid reset");
    }

    fn log_diagnostics(&self, phase: &str) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        let n = self.state.n;
        log::debug!(
            "{phase}: mass={:.4} ke={:.4e} max_div={:.4e}",
            diagnostics::compute_total_density(&self.state.density, n),
            diagnostics::compute_kinetic_energy(&self.state.vx, &self.state.vy, n),
            diagnostics::compute_max_divergence(&self.state.vx, &self.state.vy, n),
        );
    }
}

fn check_finite(name: &'static str, value: f64) -> FluidResult<()> {
    if !value.is_finite() {
        return Err(FluidError::NonFiniteValue { name, value });
    }
    Ok(())
}
