use crate::config::{BrushConfig, KickMode};
use crate::error::{FluidError, FluidResult};
use crate::fluid::Fluid;

/// xorshift128 generator for brush jitter; seeded, so strokes replay exactly.
pub struct Xor128 {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
}

impl Xor128 {
    pub fn new(seed: u32) -> Self {
        Self {
            x: seed,
            y: seed.wrapping_mul(1812433253).wrapping_add(1),
            z: seed.wrapping_mul(1812433253).wrapping_mul(2).wrapping_add(2),
            w: seed.wrapping_mul(1812433253).wrapping_mul(3).wrapping_add(3),
        }
    }

    pub fn next(&mut self) -> u32 {
        let t = self.x ^ (self.x << 11);
        self.x = self.y;
        self.y = self.z;
        self.z = self.w;
        self.w = self.w ^ (self.w >> 19) ^ (t ^ (t >> 8));
        self.w
    }

    /// Returns a float in [0.0, 1.0)
    pub fn next_unit(&mut self) -> f64 {
        self.next() as f64 / (u32::MAX as f64 + 1.0)
    }
}

/// Turns pointer motion into density and velocity injections.
///
/// Each move paints a `(2r+1)²` patch centered on the pointer cell: every cell
/// gets a random amount of density in `[density_min, density_max)`. The
/// velocity kick is `velocity_scale` times the pointer displacement; see
/// [`KickMode`] for where it lands.
pub struct Brush {
    radius: usize,
    density_min: f64,
    density_max: f64,
    velocity_scale: f64,
    kick: KickMode,
    rng: Xor128,
    last: Option<(f64, f64)>,
}

impl Brush {
    pub fn new(config: &BrushConfig, seed: u32) -> Self {
        Self {
            radius: config.radius,
            density_min: config.density_min,
            density_max: config.density_max.max(config.density_min),
            velocity_scale: config.velocity_scale,
            kick: config.kick,
            rng: Xor128::new(seed),
            last: None,
        }
    }

    /// Feed the latest pointer position in grid coordinates (`None` when the
    /// pointer is outside the window). Paints only when the pointer moved.
    /// Returns the number of cells painted.
    pub fn track(&mut self, fluid: &mut Fluid, pos: Option<(f64, f64)>) -> FluidResult<usize> {
        let Some(pos) = pos else {
            self.last = None;
            return Ok(0);
        };
        let painted = match self.last {
            Some(prev) if prev != pos => self.stroke(fluid, prev, pos)?,
            _ => 0,
        };
        self.last = Some(pos);
        Ok(painted)
    }

    /// Paint one patch at `to`, pushed along `to - from`. Cells that fall
    /// outside the grid are skipped. Amounts are checked before any cell is
    /// written, so an error leaves the fluid unchanged.
    pub fn stroke(&mut self, fluid: &mut Fluid, from: (f64, f64), to: (f64, f64)) -> FluidResult<usize> {
        let n = fluid.size() as i64;
        let cx = to.0.floor() as i64;
        let cy = to.1.floor() as i64;
        let kick_x = (to.0 - from.0) * self.velocity_scale;
        let kick_y = (to.1 - from.1) * self.velocity_scale;
        check_finite("brush density min", self.density_min)?;
        check_finite("brush density max", self.density_max)?;
        check_finite("velocity x", kick_x)?;
        check_finite("velocity y", kick_y)?;

        let inside = |x: i64, y: i64| x >= 0 && y >= 0 && x < n && y < n;
        let r = self.radius as i64;
        let mut painted = 0;
        for x in (cx - r)..=(cx + r) {
            for y in (cy - r)..=(cy + r) {
                if !inside(x, y) {
                    continue;
                }
                let amount = self.density_min + (self.density_max - self.density_min) * self.rng.next_unit();
                fluid.add_density(x as usize, y as usize, amount)?;
                if self.kick == KickMode::Patch {
                    fluid.add_velocity(x as usize, y as usize, kick_x, kick_y)?;
                }
                painted += 1;
            }
        }
        if self.kick == KickMode::Center && inside(cx, cy) {
            let times = painted as f64;
            fluid.add_velocity(cx as usize, cy as usize, kick_x * times, kick_y * times)?;
        }
        if painted > 0 {
            log::trace!("brush at ({cx}, {cy}) painted {painted} cells, kick=({kick_x:.2}, {kick_y:.2})");
        }
        Ok(painted)
    }
}

fn check_finite(name: &'static str, value: f64) -> FluidResult<()> {
    if !value.is_finite() {
        return Err(FluidError::NonFiniteValue { name, value });
    }
    Ok(())
}
