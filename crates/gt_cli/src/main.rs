use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gt_renderer::{Camera, CameraConfig, RenderConfig, Renderer, Scene};
use serde::{Deserialize, Serialize};

const USAGE: &str = "usage: gridtrace <scene.obj> [job.json]";

/// Everything a render job needs besides the scene itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct JobConfig {
    camera: CameraConfig,
    render: RenderConfig,
    /// Snapshot path; overwritten at every checkpoint
    output: Option<PathBuf>,
}

impl JobConfig {
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from("render.png"))
    }
}

/// Read a job file, or fall back to defaults when none is given.
fn load_job(path: Option<&Path>) -> Result<JobConfig> {
    let Some(path) = path else {
        log::info!("No job file given, using defaults");
        return Ok(JobConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read job file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid job file {}", path.display()))
}

fn run(scene_path: &Path, job: &JobConfig) -> Result<()> {
    let mesh = gt_core::load_obj(scene_path)
        .with_context(|| format!("failed to load scene {}", scene_path.display()))?;
    let scene = Scene::new(mesh, job.render.desired_cells).context("failed to build scene grid")?;

    let camera = Camera::new(&job.camera);
    let renderer = Renderer::new(scene, camera, job.render.clone())?;

    let output = job.output_path();
    let mut write_error = None;
    renderer.render(|checkpoint| {
        match checkpoint.snapshot().save(&output) {
            Ok(()) => {
                log::info!(
                    "Saved {} ({}/{} samples)",
                    output.display(),
                    checkpoint.rounds,
                    checkpoint.total_rounds
                );
                ControlFlow::Continue(())
            }
            Err(e) => {
                write_error = Some(e);
                ControlFlow::Break(())
            }
        }
    })?;

    if let Some(e) = write_error {
        return Err(e.into());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1);
    let Some(scene_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let job_path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!(USAGE);
    }

    log::info!("Starting gridtrace on {}", scene_path.display());
    let job = load_job(job_path.as_deref())?;
    run(&scene_path, &job)
}
