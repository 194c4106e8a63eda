use anyhow::{Context, Result};
use glam::Vec3;
use tidewater_engine::core::{App, AppControl, FrameCtx};
use tidewater_engine::device::Gpu;
use tidewater_engine::frame::QueueFence;
use tidewater_engine::orchestrator::{FrameOrchestrator, FrameReport};
use tidewater_engine::render::SceneRenderer;
use tidewater_engine::scene::Camera;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::cli::Args;
use crate::scene_setup::{self, DemoScene, WATER_SCROLL};

/// Camera azimuth speed (radians per second).
const ORBIT_SPEED: f32 = 0.05;

/// Orbiting camera over the scene, moving with simulated time.
pub fn orbit_camera(total_time: f32) -> Camera {
    Camera::orbit(
        1.5 * std::f32::consts::PI + ORBIT_SPEED * total_time,
        0.3 * std::f32::consts::PI,
        70.0,
        Vec3::new(0.0, 2.0, 0.0),
    )
}

struct Running {
    orchestrator: FrameOrchestrator<QueueFence>,
    renderer: SceneRenderer,
}

/// Windowed demo: builds GPU resources on the first frame, then runs one orchestrated
/// frame per redraw.
pub struct DemoApp {
    args: Args,
    pending: Option<DemoScene>,
    running: Option<Running>,
    frames: u64,
    failure: Option<anyhow::Error>,
    title_stale: bool,
}

impl DemoApp {
    pub fn new(args: Args) -> Result<Self> {
        let demo = scene_setup::build(
            args.ring_size,
            &args.wave_config(),
            &args.disturbance_config(),
        )?;
        Ok(Self {
            args,
            pending: Some(demo),
            running: None,
            frames: 0,
            failure: None,
            title_stale: true,
        })
    }

    /// The error that stopped the loop, if any.
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    fn ensure_running(&mut self, gpu: &Gpu<'_>) -> Result<&mut Running> {
        if self.running.is_none() {
            let demo = self
                .pending
                .take()
                .context("demo scene already consumed")?;

            let mut orchestrator = FrameOrchestrator::new(
                &self.args.orchestrator_config(),
                demo.scene,
                Some(demo.waves),
                gpu.fence(),
            )?;
            orchestrator.add_texture_scroll(demo.water, WATER_SCROLL)?;

            let mut renderer = SceneRenderer::new(
                gpu.device(),
                gpu.queue(),
                gpu.surface_format(),
                orchestrator.scene(),
                orchestrator.ring().slots(),
                &demo.textures,
            )?;
            let fog = orchestrator.lighting().fog_color;
            renderer.set_clear_color(fog.to_array());

            let adapter = gpu.adapter_info();
            log::info!(
                "rendering on {} ({:?}, {:?})",
                adapter.name,
                adapter.backend,
                adapter.device_type
            );

            self.running = Some(Running {
                orchestrator,
                renderer,
            });
        }
        self.running.as_mut().context("renderer not initialised")
    }

    fn frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<FrameReport> {
        let camera = orbit_camera(ctx.time.total);
        let running = self.ensure_running(ctx.gpu)?;

        let mut frame = running
            .renderer
            .begin_frame(ctx.gpu)
            .notify_before_present(ctx.window);
        let report = running
            .orchestrator
            .run_frame(&ctx.time, &camera, &mut frame)?;
        Ok(report)
    }

    fn wireframe(&self) -> bool {
        match &self.running {
            Some(r) => r.orchestrator.wireframe(),
            None => self.args.wireframe,
        }
    }

    fn toggle_wireframe(&mut self) {
        match &mut self.running {
            Some(r) => {
                let on = !r.orchestrator.wireframe();
                r.orchestrator.set_wireframe(on);
            }
            None => self.args.wireframe = !self.args.wireframe,
        }
        self.title_stale = true;
    }

    fn title(&self) -> String {
        let mode = if self.wireframe() { "wireframe" } else { "solid" };
        format!("tidewater ({}x{} waves, {mode})", self.args.rows, self.args.cols)
    }
}

impl App for DemoApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => AppControl::Exit,
            PhysicalKey::Code(KeyCode::Digit1) => {
                self.toggle_wireframe();
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        match self.frame(ctx) {
            Ok(report) => {
                self.frames += 1;
                if self.title_stale {
                    ctx.runtime.set_title(self.title());
                    self.title_stale = false;
                }
                if let Some(d) = report.disturbance {
                    log::trace!("frame {}: disturbance {:?}", self.frames, d);
                }
                if self.args.frames > 0 && self.frames >= self.args.frames {
                    log::info!("rendered {} frames, exiting", self.frames);
                    return AppControl::Exit;
                }
                AppControl::Continue
            }
            Err(e) => {
                log::error!("frame {} failed: {e:#}", self.frames);
                self.failure = Some(e);
                AppControl::Exit
            }
        }
    }

    fn on_shutdown(&mut self) {
        let Some(running) = &mut self.running else {
            return;
        };
        if let Err(e) = running.orchestrator.shutdown() {
            log::error!("GPU drain failed: {e}");
            if self.failure.is_none() {
                self.failure = Some(e.into());
            }
        }
        self.running = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_orbits_over_time() {
        let a = orbit_camera(0.0);
        let b = orbit_camera(10.0);
        assert_ne!(a.eye, b.eye);
        assert!(((a.eye - a.target).length() - 70.0).abs() < 1e-3);
        assert_eq!(a.target, b.target);
    }
}
