//! Waterfront demo for the tidewater engine.
//!
//! Windowed by default; `--headless` drives the same frame loop against a CPU fence and
//! a recording backend.

mod app;
mod cli;
mod scene_setup;
mod shapes;
mod textures;

use anyhow::{Context, Result};
use clap::Parser;
use tidewater_engine::device::GpuInit;
use tidewater_engine::frame::CpuFence;
use tidewater_engine::logging::{init_logging, LoggingConfig};
use tidewater_engine::orchestrator::{FrameOrchestrator, RecordingBackend};
use tidewater_engine::time::FrameTime;
use tidewater_engine::window::{Runtime, RuntimeConfig};

use crate::app::{orbit_camera, DemoApp};
use crate::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    if args.headless {
        return run_headless(&args);
    }

    let app = DemoApp::new(args).context("failed to assemble demo scene")?;
    let mut app = Runtime::run(RuntimeConfig::default(), GpuInit::default(), app)?;

    match app.take_failure() {
        Some(e) => Err(e.context("frame loop aborted")),
        None => Ok(()),
    }
}

/// Fixed 60 Hz steps with no GPU; reports what the frame loop did.
fn run_headless(args: &Args) -> Result<()> {
    const DT: f32 = 1.0 / 60.0;
    let frames = if args.frames > 0 { args.frames } else { 600 };

    let demo = scene_setup::build(args.ring_size, &args.wave_config(), &args.disturbance_config())?;
    let mut orchestrator = FrameOrchestrator::new(
        &args.orchestrator_config(),
        demo.scene,
        Some(demo.waves),
        CpuFence::immediate(),
    )?;
    orchestrator.add_texture_scroll(demo.water, scene_setup::WATER_SCROLL)?;

    let mut backend = RecordingBackend::default();
    let mut disturbances = 0;
    let mut draws = 0;
    for i in 0..frames {
        let total = DT * (i + 1) as f32;
        let time = FrameTime::fixed(DT, total, i);
        let report = orchestrator.run_frame(&time, &orbit_camera(total), &mut backend)?;
        disturbances += report.disturbance.is_some() as u32;
        draws += report.draw_calls;

        // Keep memory flat on long runs.
        backend.frames.clear();
        backend.calls.clear();
    }
    orchestrator.shutdown()?;

    log::info!(
        "headless: {frames} frames, {draws} draws, {disturbances} disturbances, last fence {}",
        orchestrator.ring().last_issued()
    );
    Ok(())
}
