//! The contract between the window runtime and whatever it renders.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
