//! The winit event loop, the render window and its GPU context.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
