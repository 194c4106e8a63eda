//! Frame orchestration.
//!
//! Responsibilities:
//! - run the per-frame stage sequence against a `FrameRing`
//! - feed wave vertices, texture scrolls and constants into the current slot
//! - hand layer batches to a `FrameBackend` (GPU or recording)

mod animation;
mod backend;
mod frame_loop;
mod stage;

pub use animation::TextureScroll;
pub use backend::{BackendCall, FrameBackend, LayerBatch, RecordedFrame, RecordingBackend};
pub use frame_loop::{FrameOrchestrator, FrameReport, OrchestratorConfig};
pub use stage::FrameStage;
