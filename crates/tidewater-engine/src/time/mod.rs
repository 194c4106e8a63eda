//! Frame timing.
//!
//! One `FrameClock` per render loop; `tick()` once per frame yields the clamped delta
//! and the accumulated simulation time that drive the orchestrator.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
