//! alpine-landscape CLI: generate the alpine height field or run the
//! day/night lighting transition headless.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use alpine_landscape::export::{
    LandscapeReport, LightingFrame, export_height_png, export_json, export_lighting_trace,
    export_noise_maps, export_slope_png,
};
use alpine_landscape::{
    HeightFieldGenerator, LandscapeConfig, LightingState, LightingStateMachine, PlaneGrid,
    SceneStateSink, ToggleKey,
};

/// Largest lattice used for the per-layer noise maps.
const MAX_NOISE_MAP_SIZE: u32 = 512;
/// Frames the simulated toggle key stays held.
const KEY_HOLD_FRAMES: f32 = 3.0;

#[derive(Parser)]
#[command(name = "alpine-landscape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; missing fields use defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the height field and export height/slope maps.
    Generate {
        /// Noise seed (random when neither this nor the config sets one).
        #[arg(short, long)]
        seed: Option<u32>,

        /// Grid cells per side.
        #[arg(long)]
        segments: Option<u32>,

        /// World height of a normalised height of 1.0.
        #[arg(long)]
        height_scale: Option<f32>,

        /// Output directory; files land in `<output>/<seed>/`.
        #[arg(short, long, default_value = "./landscapes")]
        output: PathBuf,

        /// Also export every intermediate noise layer.
        #[arg(long)]
        noise_maps: bool,
    },
    /// Run the lighting state machine at a fixed frame rate.
    Simulate {
        /// Frames per second.
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Seconds to simulate (defaults to one transition plus half a second).
        #[arg(long)]
        seconds: Option<f32>,

        /// Times (seconds) at which the toggle key is pressed.
        #[arg(long = "toggle-at", default_value = "0")]
        toggle_at: Vec<f32>,

        /// Override the transition duration in seconds.
        #[arg(long)]
        duration: Option<f32>,

        /// Write every pushed frame to this JSON file.
        #[arg(long)]
        trace: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => LandscapeConfig::load(path)?,
        None => LandscapeConfig::default(),
    };

    match cli.command {
        Commands::Generate {
            seed,
            segments,
            height_scale,
            output,
            noise_maps,
        } => {
            if let Some(s) = seed {
                config.seed = Some(s);
            }
            if let Some(s) = segments {
                config.terrain.segments = s;
            }
            if let Some(h) = height_scale {
                config.terrain.height_scale = h;
            }
            config.validate()?;
            generate(&config, &output, noise_maps)
        }
        Commands::Simulate {
            fps,
            seconds,
            toggle_at,
            duration,
            trace,
        } => {
            if let Some(d) = duration {
                config.lighting.transition_duration = d;
            }
            simulate(&config, fps, seconds, &toggle_at, trace.as_deref())
        }
    }
}

// ── generate ──────────────────────────────────────────────────────────────────

fn generate(config: &LandscapeConfig, output: &Path, noise_maps: bool) -> Result<()> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let terrain = &config.terrain;
    info!(
        "generating {0}x{0} alpine grid ({1} x {2}, height scale {3}), seed {seed}",
        terrain.vertices_per_side(),
        terrain.width,
        terrain.depth,
        terrain.height_scale
    );

    let generator = HeightFieldGenerator::new(terrain.clone(), seed);
    let mut grid = PlaneGrid::from_config(terrain);
    let field = generator.generate(&mut grid)?;

    let dir = output.join(seed.to_string());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    export_height_png(&field, &dir.join("height.png"))?;
    export_slope_png(&field, &dir.join("slope.png"))?;
    export_json(
        &LandscapeReport::new(seed, terrain, &field),
        &dir.join("landscape.json"),
    )?;
    if noise_maps {
        let size = (terrain.vertices_per_side() as u32).min(MAX_NOISE_MAP_SIZE);
        export_noise_maps(&generator, size, &dir)?;
    }

    info!("landscape generated → {}", dir.display());
    Ok(())
}

// ── simulate ──────────────────────────────────────────────────────────────────

/// Stands in for the renderer: keeps the latest pushed state and clock.
#[derive(Default)]
struct RecordingSink {
    elapsed: f32,
    latest: Option<LightingState>,
}

impl SceneStateSink for RecordingSink {
    fn apply(&mut self, state: &LightingState) {
        self.latest = Some(state.clone());
    }

    fn advance_time(&mut self, elapsed: f32) {
        self.elapsed = elapsed;
    }
}

fn simulate(
    config: &LandscapeConfig,
    fps: u32,
    seconds: Option<f32>,
    toggle_at: &[f32],
    trace: Option<&Path>,
) -> Result<()> {
    let fps = fps.max(1);
    let dt = 1.0 / fps as f32;
    let total = seconds.unwrap_or(config.lighting.transition_duration.max(0.0) + 0.5);
    let frame_count = (total * fps as f32).ceil() as u32;

    let mut machine = LightingStateMachine::new(&config.lighting);
    let mut key = ToggleKey::new();
    let mut sink = RecordingSink::default();
    let mut frames = Vec::new();

    machine.sync(&mut sink);
    info!(
        "simulating {total:.2}s at {fps} fps, starting {:?}, toggles at {toggle_at:?}",
        machine.transition().current
    );

    for frame in 1..=frame_count {
        let time = frame as f32 * dt;
        let pressed = toggle_at
            .iter()
            .any(|&t| time >= t && time < t + KEY_HOLD_FRAMES * dt);
        if key.drive(pressed, &mut machine) {
            info!("t={time:.3}s toggle → target {:?}", machine.transition().target);
        }

        if machine.update(dt, time, &mut sink) {
            let Some(state) = sink.latest.take() else {
                continue;
            };
            let value = machine.current_value();
            info!(
                "t={:.3}s value={value:.3} sun={:.3} stars={:.3} exposure={:.3}",
                sink.elapsed, state.sun_intensity, state.star_intensity, state.exposure
            );
            frames.push(LightingFrame { time, value, state });
        }
    }

    info!(
        "finished: day={} night={} value={:.3} ({} frames pushed)",
        machine.is_day(),
        machine.is_night(),
        machine.current_value(),
        frames.len()
    );

    if let Some(path) = trace {
        export_lighting_trace(&frames, path)?;
    }
    Ok(())
}
