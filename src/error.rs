use thiserror::Error;

/// Result type for grid construction and field injection.
pub type FluidResult<T> = Result<T, FluidError>;

/// Precondition violations rejected at the call boundary.
///
/// Every check runs before a buffer is touched, so a failed call leaves the
/// simulation exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    #[error("grid size {n} is too small: need at least 3 cells per side")]
    InvalidGridSize { n: usize },

    #[error("cell ({x}, {y}) is outside the {n}x{n} grid")]
    InvalidCoordinate { x: usize, y: usize, n: usize },

    #[error("timestep must be finite and > 0, got {dt}")]
    InvalidTimestep { dt: f64 },

    #[error("{name} must be finite and >= 0, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("{name} iteration count must be >= 1")]
    InvalidIterations { name: &'static str },

    #[error("{name} must be finite, got {value}")]
    NonFiniteValue { name: &'static str, value: f64 },
}

/// Errors from reading `dyeflow.yaml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("config value {field} is out of range: {value}")]
    Invalid { field: &'static str, value: f64 },
    #[error("invalid physics settings: {0}")]
    Physics(#[from] FluidError),
}
