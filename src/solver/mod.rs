mod boundary;
mod core;
pub mod diagnostics;
mod parallel;
mod params;

// Re-export public API
pub use boundary::{set_bnd, FieldType};
pub use self::core::{advect, diffuse, lin_solve, project};
pub use params::{Relax, RelaxScheme, SolverParams};

use crate::state::SimState;

/// Velocity phase: diffuse, project, self-advect, project.
///
/// On return `vx`/`vy` hold the new velocity; `vx0`/`vy0` hold scratch.
pub fn velocity_step(state: &mut SimState, params: &SolverParams) {
    let dt = params.dt;
    let n = state.n;
    let diffuse_relax = params.diffuse_relax();
    let project_relax = params.project_relax();

    // 1. Diffuse velocity into the scratch buffers
    diffuse(FieldType::Vx, &mut state.vx0, &state.vx, params.visc, dt, diffuse_relax, &mut state.relax_tmp, n);
    diffuse(FieldType::Vy, &mut state.vy0, &state.vy, params.visc, dt, diffuse_relax, &mut state.relax_tmp, n);

    // 2. Project; vx/vy are free to serve as pressure and divergence
    project(&mut state.vx0, &mut state.vy0, &mut state.vx, &mut state.vy, project_relax, &mut state.relax_tmp, n);

    // 3. Advect velocity along itself
    advect(FieldType::Vx, &mut state.vx, &state.vx0, &state.vx0, &state.vy0, dt, n);
    advect(FieldType::Vy, &mut state.vy, &state.vy0, &state.vx0, &state.vy0, dt, n);

    // 4. Project again; the scratch buffers are free now
    project(&mut state.vx, &mut state.vy, &mut state.vx0, &mut state.vy0, project_relax, &mut state.relax_tmp, n);
}

/// Density phase: diffuse, then advect along the stored velocity.
pub fn density_step(state: &mut SimState, params: &SolverParams) {
    let dt = params.dt;
    let n = state.n;

    diffuse(FieldType::Scalar, &mut state.density0, &state.density, params.diff, dt, params.diffuse_relax(), &mut state.relax_tmp, n);
    advect(FieldType::Scalar, &mut state.density, &state.density0, &state.vx, &state.vy, dt, n);
}

/// Full fluid simulation step: velocity phase, then density phase carried by
/// the velocity that phase produced.
pub fn fluid_step(state: &mut SimState, params: &SolverParams) {
    velocity_step(state, params);
    density_step(state, params);
}
