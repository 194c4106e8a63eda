use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Whether the runtime keeps looping after a callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// What the window runtime drives.
///
/// The runtime owns the window and the GPU context; the app owns everything it renders
/// and gets one `on_frame` per redraw. Redraws stop while the window is minimized.
pub trait App {
    /// Raw window input, before the runtime handles close/resize itself.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// The surface and device are dropped right after this returns; wait for in-flight
    /// frames here.
    fn on_shutdown(&mut self) {}
}
