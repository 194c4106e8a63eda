use winit::window::Window;

use crate::device::Gpu;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Everything `App::on_frame` gets for one redraw.
///
/// `'a` spans the callback; `'w` is the window borrow held by the surface inside `Gpu`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}
