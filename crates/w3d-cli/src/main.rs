mod log_host;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use w3d_core::{Vec3, W3dConfig, W3dError};
use w3d_ir::{Project, ProjectSettings};
use w3d_runtime::{FrameInput, Runtime};

use crate::log_host::LogHost;

#[derive(Parser)]
#[command(
    name = "w3d",
    version,
    about = "Writing3D: validate and play interactive 3D scenes",
    long_about = "Writing3D plays declarative, time-driven 3D scenes.\nValidate a project, or play it headlessly and watch the mutation requests it makes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file and report every problem
    Check {
        /// Path to the project JSON file
        #[arg()]
        file: PathBuf,
    },

    /// Play a project headlessly with a fixed viewer pose
    Play {
        /// Path to the project JSON file
        #[arg()]
        file: PathBuf,

        /// Path to a w3d.toml configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seconds of scene time to play (overrides [playback].seconds)
        #[arg(long)]
        seconds: Option<f64>,

        /// Ticks per second (overrides [playback].fps)
        #[arg(long)]
        fps: Option<u32>,

        /// Viewer head position as x,y,z (default: the project's viewer rig)
        #[arg(long, value_parser = parse_vec3)]
        viewer: Option<Vec3>,

        /// Gaze direction as x,y,z
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,-1")]
        look: Vec3,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display version and the built-in reference frames
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::Play {
            config: Some(path), ..
        } => load_config(path)?,
        _ => W3dConfig::default(),
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Check { file } => cmd_check(&file),
        Commands::Play {
            file,
            config: _,
            seconds,
            fps,
            viewer,
            look,
            json,
        } => {
            let mut config = config;
            if let Some(seconds) = seconds {
                config.playback.seconds = seconds;
            }
            if let Some(fps) = fps {
                config.playback.fps = fps;
            }
            cmd_play(&file, &config, viewer, look, json)
        }
        Commands::Info => cmd_info(),
    }
}

fn load_config(path: &Path) -> Result<W3dConfig> {
    W3dConfig::load_from_file(path)
        .with_context(|| format!("failed to load config: {}", path.display()))
}

fn load_project(file: &Path) -> Result<Project> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    Project::from_json(&source)
        .with_context(|| format!("failed to parse project JSON: {}", file.display()))
}

/// Parse `x,y,z` into a vector.
fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,z but got '{}'", s));
    }
    let mut xyz = [0.0f32; 3];
    for (slot, part) in xyz.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f32>()
            .map_err(|e| format!("bad component '{}': {}", part, e))?;
        if !slot.is_finite() {
            return Err(format!("component '{}' is not finite", part));
        }
    }
    Ok(Vec3::from_array(xyz))
}

fn problem_list(errors: Vec<W3dError>) -> String {
    errors
        .into_iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n  ")
}

fn cmd_check(file: &Path) -> Result<()> {
    println!("Checking {}", file.display());

    let project = load_project(file)?;
    println!("   parse OK");

    w3d_ir::validate_project(&project).map_err(|errors| {
        anyhow::anyhow!(
            "{} problem(s):\n  {}",
            errors.len(),
            problem_list(errors)
        )
    })?;
    println!("   validate OK");

    println!();
    println!(
        "   {} entities, {} groups, {} sounds, {} triggers, {} timelines",
        project.entities.len(),
        project.groups.len(),
        project.sounds.len(),
        project.triggers.len(),
        project.timelines.len()
    );
    println!("   No errors found.");
    Ok(())
}

#[derive(Debug, Serialize)]
struct PlaySummary {
    project: String,
    seconds: f64,
    ticks: u64,
    dispatched: usize,
    truncated_ticks: u64,
    active_transitions: usize,
    requests: std::collections::BTreeMap<&'static str, u64>,
    elapsed_ms: f64,
}

fn cmd_play(
    file: &Path,
    config: &W3dConfig,
    viewer: Option<Vec3>,
    look: Vec3,
    json: bool,
) -> Result<()> {
    let playback = &config.playback;
    if playback.fps == 0 {
        anyhow::bail!("fps must be at least 1");
    }
    if !(playback.seconds.is_finite() && playback.seconds >= 0.0) {
        anyhow::bail!("seconds must be non-negative, got {}", playback.seconds);
    }

    let project = load_project(file)?;
    let mut runtime = Runtime::new(&project, &config.runtime).map_err(|e| match e {
        W3dError::Validation(errors) => anyhow::anyhow!(
            "{} failed validation:\n  {}",
            file.display(),
            problem_list(errors)
        ),
        other => anyhow::Error::new(other).context("failed to bind project"),
    })?;
    let mut host = LogHost::new(runtime.bound());

    let started = Instant::now();
    let first = runtime.start(&mut host);
    let eye = viewer.unwrap_or_else(|| runtime.viewer_transform().position);
    tracing::info!(
        "playing {} for {}s at {} fps, viewer at ({}, {}, {}) looking ({}, {}, {})",
        file.display(),
        playback.seconds,
        playback.fps,
        eye.x,
        eye.y,
        eye.z,
        look.x,
        look.y,
        look.z
    );

    let dt = 1.0 / playback.fps as f64;
    let ticks = (playback.seconds * playback.fps as f64).round() as u64;
    let mut dispatched = first.dispatched;
    let mut truncated_ticks = u64::from(first.truncated);
    let mut last = first;
    for _ in 0..ticks {
        let input = FrameInput::new(dt).with_viewer(eye, look);
        last = runtime.tick(&input, &mut host);
        dispatched += last.dispatched;
        truncated_ticks += u64::from(last.truncated);
    }

    let summary = PlaySummary {
        project: project.id.clone(),
        seconds: last.time,
        ticks,
        dispatched,
        truncated_ticks,
        active_transitions: last.active_transitions,
        requests: host.counts().clone(),
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!();
    println!("Played {} ({})", file.display(), summary.project);
    println!("   Scene time:   {:.3}s over {} ticks", summary.seconds, ticks);
    println!("   Dispatched:   {} action list(s)", summary.dispatched);
    if summary.truncated_ticks > 0 {
        println!(
            "   Truncated:    {} tick(s) hit max_cascade",
            summary.truncated_ticks
        );
    }
    println!("   Transitions:  {} still running", summary.active_transitions);
    println!("   Requests:     {}", host.total());
    for (kind, count) in &summary.requests {
        println!("      {:<10} {}", kind, count);
    }
    println!("   Wall time:    {:.1}ms", summary.elapsed_ms);
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("Writing3D runtime");
    println!("   Version:   {}", env!("CARGO_PKG_VERSION"));
    println!("   Input:     project JSON");
    println!();
    println!("   Reference frames:");
    println!("      {:<8} (0, 0, 0)", w3d_ir::CENTER);
    for frame in ProjectSettings::default_frames() {
        let p = frame.placement.position;
        println!(
            "      {:<8} ({}, {}, {}) relative to {}",
            frame.name, p.x, p.y, p.z, frame.placement.relative_to
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vec3() {
        assert_eq!(parse_vec3("1,2,3"), Ok(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_vec3(" 0, -1.5 ,0 "), Ok(Vec3::new(0.0, -1.5, 0.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,x,3").is_err());
        assert!(parse_vec3("1,inf,3").is_err());
    }

    #[test]
    fn test_cli_parses_play() {
        let cli = Cli::try_parse_from([
            "w3d", "play", "scene.json", "--fps", "30", "--viewer", "0,1.6,2",
        ])
        .unwrap();
        match cli.command {
            Commands::Play {
                fps, viewer, look, ..
            } => {
                assert_eq!(fps, Some(30));
                assert_eq!(viewer, Some(Vec3::new(0.0, 1.6, 2.0)));
                assert_eq!(look, Vec3::NEG_Z);
            }
            _ => panic!("expected play"),
        }
    }
}
