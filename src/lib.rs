pub mod config;
pub mod error;
pub mod fluid;
pub mod input;
pub mod renderer;
pub mod solver;
pub mod state;

pub use config::Config;
pub use error::{ConfigError, FluidError, FluidResult};
pub use fluid::Fluid;
pub use input::Brush;
pub use solver::{RelaxScheme, SolverParams};
