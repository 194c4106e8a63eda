//! Tidewater engine crate.
//!
//! A fence-synchronised frame-resource ring feeding a layered scene renderer, with a
//! damped wave-equation height field animated on the CPU every frame.

pub mod core;
pub mod device;
pub mod logging;
pub mod time;
pub mod window;

pub mod frame;
pub mod orchestrator;
pub mod render;
pub mod scene;
pub mod waves;

mod error;

pub use error::{RenderError, RenderResult};
