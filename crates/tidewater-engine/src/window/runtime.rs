use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::Window;

use crate::core::{App as CoreApp, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// Window configuration for the single render window.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tidewater".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            resizable: true,
        }
    }
}

/// Requests an app can make from inside `on_frame`; applied once the callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit: bool,
    title: Option<String>,
}

impl RuntimeCtx {
    pub fn exit(&mut self) {
        self.exit = true;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }
}

/// Event-loop driver: one window, one GPU context, one redraw per loop iteration.
pub struct Runtime;

impl Runtime {
    /// Runs until the app asks to exit or the window closes, then hands the app back.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<A>
    where
        A: CoreApp + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            config,
            gpu_init,
            app,
            target: None,
            minimized: false,
            exiting: false,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(state.app)
    }
}

/// Window and the surface that borrows it, dropped together.
#[self_referencing]
struct RenderTarget {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl RenderTarget {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size)
            .with_resizable(config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        RenderTargetTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.with_gpu_mut(|gpu| gpu.resize(size));
    }
}

/// Calls `on_shutdown` while `target` is still alive, then drops it.
///
/// Returns `false` if the target was already released.
fn release_target<A: CoreApp, T>(app: &mut A, target: &mut Option<T>) -> bool {
    let Some(target) = target.take() else {
        return false;
    };
    app.on_shutdown();
    drop(target);
    true
}

struct RuntimeState<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    target: Option<RenderTarget>,
    minimized: bool,
    exiting: bool,
}

impl<A: CoreApp> RuntimeState<A> {
    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        event_loop.exit();
    }

    fn close(&mut self) {
        release_target(&mut self.app, &mut self.target);
    }

    fn track_size(&mut self, size: PhysicalSize<u32>) {
        let minimized = size.width == 0 || size.height == 0;
        if minimized != self.minimized {
            log::debug!("window {}", if minimized { "minimized" } else { "restored" });
            self.minimized = minimized;
        }
        if let Some(target) = &mut self.target {
            target.resize(size);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(target) = &mut self.target else {
            return;
        };

        let mut runtime = RuntimeCtx::default();
        let app = &mut self.app;
        let control = target.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                time,
                runtime: &mut runtime,
            };
            app.on_frame(&mut ctx)
        });

        if let Some(title) = runtime.title.take() {
            target.with_window(|w| w.set_title(&title));
        }
        if control == AppControl::Exit || runtime.exit {
            self.exit(event_loop);
        }
    }
}

impl<A: CoreApp + 'static> ApplicationHandler for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.target.is_some() {
            return;
        }

        match RenderTarget::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(target) => {
                target.with_window(|w| w.request_redraw());
                self.target = Some(target);
            }
            Err(e) => {
                log::error!("failed to open render window: {e:#}");
                self.exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            event_loop.exit();
            return;
        }

        // The wave field animates every frame; idle only while minimized.
        if self.minimized {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(target) = &self.target {
            target.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.exiting || self.target.is_none() {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close();
                self.exit(event_loop);
            }
            WindowEvent::Resized(size) => self.track_size(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self
                    .target
                    .as_ref()
                    .map(|t| t.with_window(|w| w.inner_size()))
                {
                    self.track_size(size);
                }
            }
            WindowEvent::RedrawRequested if !self.minimized => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.close();
    }
}
