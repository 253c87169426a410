use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, FluidError};
use crate::renderer::ColorMap;
use crate::solver::{RelaxScheme, SolverParams};

pub const CONFIG_FILE: &str = "dyeflow.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub physics: PhysicsConfig,
    pub display: DisplayConfig,
    pub brush: BrushConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Cells per side, boundary included.
    pub size: usize,
    pub dt: f64,
    pub diff: f64,
    pub visc: f64,
    pub diffuse_iter: usize,
    pub project_iter: usize,
    pub relax: RelaxScheme,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
    pub steps_per_frame: usize,
    /// Density removed from every positive cell before each frame's steps.
    pub fade: f64,
    pub colormap: ColorMap,
    /// Density drawn at full brightness.
    pub saturation: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Half-width of the square patch that receives density.
    pub radius: usize,
    pub density_min: f64,
    pub density_max: f64,
    /// Velocity added per cell of pointer displacement.
    pub velocity_scale: f64,
    pub kick: KickMode,
}

/// Where a brush stroke applies its velocity kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickMode {
    /// Every painted cell gets the kick once.
    #[default]
    Patch,
    /// The cursor cell gets the kick once per painted cell.
    Center,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            display: DisplayConfig::default(),
            brush: BrushConfig::default(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let solver = SolverParams::default();
        Self {
            size: 200,
            dt: solver.dt,
            diff: solver.diff,
            visc: solver.visc,
            diffuse_iter: solver.diffuse_iter,
            project_iter: solver.project_iter,
            relax: solver.relax,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            target_fps: 144,
            steps_per_frame: 1,
            fade: 0.5,
            colormap: ColorMap::Grayscale,
            saturation: 255.0,
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 1,
            density_min: 100.0,
            density_max: 200.0,
            velocity_scale: 2.0,
            kick: KickMode::Patch,
        }
    }
}

impl Config {
    pub fn solver_params(&self) -> SolverParams {
        SolverParams {
            dt: self.physics.dt,
            diff: self.physics.diff,
            visc: self.physics.visc,
            diffuse_iter: self.physics.diffuse_iter,
            project_iter: self.physics.project_iter,
            relax: self.physics.relax,
        }
    }

    /// Parse and validate.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_yaml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the viewer would otherwise trip over mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics.size < crate::state::MIN_N {
            return Err(FluidError::InvalidGridSize { n: self.physics.size }.into());
        }
        self.solver_params().validate()?;

        let display = &self.display;
        non_negative("display.fade", display.fade)?;
        if !display.saturation.is_finite() || display.saturation <= 0.0 {
            return Err(ConfigError::Invalid { field: "display.saturation", value: display.saturation });
        }

        let brush = &self.brush;
        non_negative("brush.density_min", brush.density_min)?;
        non_negative("brush.density_max", brush.density_max)?;
        if brush.density_max < brush.density_min {
            return Err(ConfigError::Invalid { field: "brush.density_max", value: brush.density_max });
        }
        if !brush.velocity_scale.is_finite() {
            return Err(ConfigError::Invalid { field: "brush.velocity_scale", value: brush.velocity_scale });
        }
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }
}

/// Load `dyeflow.yaml` from the working directory, falling back to defaults.
pub fn load() -> Config {
    load_from(Path::new(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        log::debug!("{} not found; using defaults", path.display());
        return Config::default();
    }
    match Config::read(path) {
        Ok(cfg) => {
            log::info!("loaded {}", path.display());
            cfg
        }
        Err(e) => {
            log::warn!("{}: {e}; using defaults", path.display());
            Config::default()
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid { field, value });
    }
    Ok(())
}
