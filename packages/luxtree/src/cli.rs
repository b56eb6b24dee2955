use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::blend::MorphState;
use crate::config::SceneConfig;
use crate::input::InputScript;
use crate::particle::ParticleKind;
use crate::perf_profiling;
use crate::scene::TreeScene;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless and report progress
    Simulate {
        /// Scene configuration JSON (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Input script JSON with toggle events and a pointer path
        #[arg(long)]
        input: Option<PathBuf>,

        /// Frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Duration in seconds (defaults to the input script length, or 5s)
        #[arg(long)]
        duration: Option<f32>,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,

        /// Log frame timings and buffer stats
        #[arg(long)]
        profile: bool,
    },
    /// Simulate, then write one group's instance buffers to disk
    Dump {
        /// Group to dump (foliage, cube_accents, ribbon, garland, ornaments, hearts, dots)
        #[arg(long)]
        group: String,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        /// Scene configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of frames to simulate before dumping
        #[arg(long, default_value_t = 120)]
        frames: usize,

        /// Scatter the tree for the whole run
        #[arg(long)]
        scattered: bool,
    },
    /// Print the default scene configuration as JSON
    Config,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            input,
            fps,
            duration,
            seed,
            json,
            profile,
        } => {
            perf_profiling::set_profiling_enabled(profile);
            simulate(config.as_deref(), input.as_deref(), fps, duration, seed, json)?;
        }
        Commands::Dump {
            group,
            out,
            config,
            frames,
            scattered,
        } => {
            dump(&group, &out, config.as_deref(), frames, scattered)?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&SceneConfig::default())?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path),
        None => Ok(SceneConfig::default()),
    }
}

fn simulate(
    config_path: Option<&Path>,
    input_path: Option<&Path>,
    fps: f32,
    duration_limit: Option<f32>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(fps > 0.0, "--fps must be positive");

    let mut config = load_config(config_path)?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let script = match input_path {
        Some(path) => InputScript::load(path)?,
        None => InputScript::default(),
    };

    let script_duration = script.duration();
    let run_duration = duration_limit.unwrap_or(if script_duration > 0.0 { script_duration } else { 5.0 });
    let total_frames = (run_duration * fps).ceil() as usize;
    let dt = 1.0 / fps;

    let mut scene = TreeScene::new(config);
    log::info!("Simulating {} frames at {} fps", total_frames, fps);

    let report_every = (fps.round() as usize).max(1);
    for i in 0..total_frames {
        let frame = script.frame(i, dt);
        if let Some(enabled) = script.accents_at(frame.elapsed) {
            scene.set_accents_enabled(enabled);
        }
        scene.update(&frame);

        if (i + 1) % report_every == 0 {
            let summary = scene.summary();
            log::info!(
                "t={:.2}s state={:?} progress={:.3} mean_home_offset={:.3}",
                summary.elapsed,
                summary.state,
                summary.progress,
                summary.mean_home_offset
            );
        }
    }

    let summary = scene.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} frames, {:.2}s, {:?}, progress {:.4}, {} particles, mean home offset {:.3}",
            summary.frame,
            summary.elapsed,
            summary.state,
            summary.progress,
            summary.total_particles,
            summary.mean_home_offset
        );
    }
    Ok(())
}

fn dump(group_name: &str, out_dir: &Path, config_path: Option<&Path>, frames: usize, scattered: bool) -> Result<()> {
    let kind = ParticleKind::from_name(group_name)
        .with_context(|| format!("Unknown group '{}'", group_name))?;
    let config = load_config(config_path)?;
    let state = if scattered { MorphState::Scattered } else { MorphState::Assembled };

    let mut scene = TreeScene::new(config);
    let dt = 1.0 / 60.0;
    let script = InputScript::default();
    for i in 0..frames {
        let mut frame = script.frame(i, dt);
        frame.state = state;
        scene.update(&frame);
    }

    let group = scene
        .group(kind)
        .with_context(|| format!("Group '{}' missing from scene", group_name))?;
    let buffer = group
        .buffer()
        .with_context(|| format!("Group '{}' has no instance buffer", group_name))?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let transforms_path = out_dir.join(format!("{}_transforms.bin", kind.name()));
    fs::write(&transforms_path, buffer.transform_bytes())
        .with_context(|| format!("Failed to write {}", transforms_path.display()))?;
    if let Some(bytes) = buffer.color_bytes() {
        let colors_path = out_dir.join(format!("{}_colors.bin", kind.name()));
        fs::write(&colors_path, bytes)
            .with_context(|| format!("Failed to write {}", colors_path.display()))?;
    }

    println!(
        "Wrote {} instances of '{}' to {:?}",
        buffer.capacity(),
        kind.name(),
        out_dir
    );
    Ok(())
}
