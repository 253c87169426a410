use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use dyeflow::config::{self, Config};
use dyeflow::renderer::{self, Viewport};
use dyeflow::{Brush, Fluid};

struct Defaults;

impl Defaults {
    const HEADLESS_STEPS: usize = 100;
    const IMPULSE_DENSITY: f64 = 100.0;
    const IMPULSE_VELOCITY: f64 = 10.0;
}

/// Which part of the solver a headless run advances.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Full,
    Density,
    Velocity,
}

impl Phase {
    fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "full" => Ok(Phase::Full),
            "density" => Ok(Phase::Density),
            "velocity" => Ok(Phase::Velocity),
            other => bail!("unknown phase {other:?} (expected full, density or velocity)"),
        }
    }

    fn run(self, fluid: &mut Fluid) {
        match self {
            Phase::Full => fluid.step(),
            Phase::Density => fluid.density_step(),
            Phase::Velocity => fluid.velocity_step(),
        }
    }
}

#[derive(Debug, PartialEq)]
struct Args {
    headless: bool,
    steps: usize,
    phase: Phase,
    config: Option<PathBuf>,
    log_level: Option<String>,
}

/// Value following `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let steps = match flag_value(args, "--steps") {
        Some(s) => s.parse().with_context(|| format!("invalid --steps {s:?}"))?,
        None => Defaults::HEADLESS_STEPS,
    };
    let phase = match flag_value(args, "--phase") {
        Some(s) => Phase::parse(s)?,
        None => Phase::Full,
    };
    Ok(Args {
        headless: args.iter().any(|a| a == "--headless"),
        steps,
        phase,
        config: flag_value(args, "--config").map(PathBuf::from),
        log_level: flag_value(args, "--log-level").map(str::to_owned),
    })
}

fn init_logger(level: Option<&str>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.format_timestamp_millis().init();
}

fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&argv)?;
    init_logger(args.log_level.as_deref());

    let cfg = match &args.config {
        Some(path) => Config::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => config::load(),
    };
    let fluid = Fluid::with_params(cfg.physics.size, cfg.solver_params())?;

    if args.headless {
        run_headless(fluid, args.phase, args.steps)
    } else {
        run_gui(fluid, &cfg)
    }
}

fn run_gui(mut fluid: Fluid, cfg: &Config) -> anyhow::Result<()> {
    let display = &cfg.display;
    let (w, h) = (display.width, display.height);
    let view = Viewport::new(w, h, fluid.size());

    let mut window = Window::new("dyeflow", view.width, view.height, WindowOptions::default())
        .context("failed to create window")?;
    window.set_target_fps(display.target_fps);

    let mut brush = Brush::new(&cfg.brush, clock_seed());
    let mut framebuf = vec![0u32; view.width * view.height];
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            fluid.reset();
        }

        let pointer = window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(mx, my)| view.to_grid(mx, my));
        brush.track(&mut fluid, pointer)?;

        fluid.fade_density(display.fade)?;
        for _ in 0..display.steps_per_frame {
            fluid.step();
        }

        renderer::render_density(&mut framebuf, fluid.density(), &view, display.colormap, display.saturation);
        window
            .update_with_buffer(&framebuf, view.width, view.height)
            .context("failed to present frame")?;

        frame_count += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            window.set_title(&format!("dyeflow - {frame_count} fps"));
            frame_count = 0;
            last_fps_time = now;
        }
    }
    Ok(())
}

fn run_headless(mut fluid: Fluid, phase: Phase, steps: usize) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
        .context("failed to set Ctrl+C handler")?;

    seed_impulse(&mut fluid)?;
    let n = fluid.size();
    log::info!("headless: {steps} {phase:?} steps on a {n}x{n} grid");

    let start = Instant::now();
    let done = run_steps(&mut fluid, phase, steps, &running);
    let elapsed = start.elapsed().as_secs_f64();

    if done < steps {
        log::warn!("interrupted after {done} of {steps} steps");
    }
    let rate = if elapsed > 0.0 { done as f64 / elapsed } else { 0.0 };
    log::info!(
        "{done} steps in {:.3}s ({rate:.1} steps/s, {:.3} ms/step)",
        elapsed,
        if done > 0 { elapsed * 1000.0 / done as f64 } else { 0.0 },
    );
    Ok(())
}

/// Drop some dye and a rightward push at the grid center.
fn seed_impulse(fluid: &mut Fluid) -> anyhow::Result<()> {
    let c = fluid.size() / 2;
    fluid.add_density(c, c, Defaults::IMPULSE_DENSITY)?;
    fluid.add_velocity(c, c, Defaults::IMPULSE_VELOCITY, 0.0)?;
    Ok(())
}

/// Advance up to `steps` times, stopping early once `running` clears.
/// Returns the number of steps taken.
fn run_steps(fluid: &mut Fluid, phase: Phase, steps: usize, running: &AtomicBool) -> usize {
    let mut done = 0;
    while done < steps && running.load(Ordering::SeqCst) {
        phase.run(fluid);
        done += 1;
    }
    done
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(0x5eed)
}
