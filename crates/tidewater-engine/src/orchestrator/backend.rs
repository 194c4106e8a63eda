use glam::Vec2;

use crate::error::{RenderError, RenderResult};
use crate::frame::FrameSlot;
use crate::render::PipelineKey;
use crate::scene::{DrawCall, DrawLayer};

/// All draws of one layer, bound to the layer's pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerBatch {
    pub layer: DrawLayer,
    pub pipeline: PipelineKey,
    pub draws: Vec<DrawCall>,
}

/// GPU side of one frame, driven by `FrameOrchestrator::run_frame`.
///
/// Calls arrive in order `upload`, `record`, `submit`, `present`, exactly once each.
pub trait FrameBackend {
    /// Render target extent in physical pixels.
    fn render_target_size(&self) -> Vec2;

    /// Copies the slot's pending CPU writes to its GPU buffers.
    fn upload(&mut self, slot_index: usize, slot: &mut FrameSlot) -> RenderResult<()>;

    /// Records draws for every batch, in the given order, reading slot `slot_index`.
    fn record(&mut self, slot_index: usize, batches: &[LayerBatch]) -> RenderResult<()>;

    /// Hands recorded commands to the GPU queue.
    fn submit(&mut self) -> RenderResult<()>;

    /// Presents the frame. `Ok(false)` means presentation was skipped.
    fn present(&mut self) -> RenderResult<bool>;
}

/// GPU-free backend that remembers what it was asked to do.
///
/// Used for headless runs and tests.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    pub size: Vec2,
    /// Presents report `false` while set.
    pub skip_present: bool,
    pub calls: Vec<BackendCall>,
    pub frames: Vec<RecordedFrame>,
}

/// One backend call, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Upload(usize),
    Record(usize),
    Submit,
    Present,
}

/// What `record` saw for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFrame {
    pub slot_index: usize,
    pub uploaded_bytes: usize,
    pub batches: Vec<LayerBatch>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new(Vec2::new(1280.0, 720.0))
    }
}

impl RecordingBackend {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            skip_present: false,
            calls: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl FrameBackend for RecordingBackend {
    fn render_target_size(&self) -> Vec2 {
        self.size
    }

    fn upload(&mut self, slot_index: usize, slot: &mut FrameSlot) -> RenderResult<()> {
        self.calls.push(BackendCall::Upload(slot_index));

        let mut bytes = 0;
        for range in [
            slot.pass_constants.take_dirty(),
            slot.object_constants.take_dirty(),
            slot.material_constants.take_dirty(),
            slot.wave_vertices.take_dirty(),
        ]
        .into_iter()
        .flatten()
        {
            bytes += range.len();
        }

        self.frames.push(RecordedFrame {
            slot_index,
            uploaded_bytes: bytes,
            batches: Vec::new(),
        });
        Ok(())
    }

    fn record(&mut self, slot_index: usize, batches: &[LayerBatch]) -> RenderResult<()> {
        self.calls.push(BackendCall::Record(slot_index));
        let frame = self
            .frames
            .last_mut()
            .filter(|f| f.slot_index == slot_index)
            .ok_or_else(|| RenderError::Device(format!("record for slot {slot_index} before upload")))?;
        frame.batches = batches.to_vec();
        Ok(())
    }

    fn submit(&mut self) -> RenderResult<()> {
        self.calls.push(BackendCall::Submit);
        Ok(())
    }

    fn present(&mut self) -> RenderResult<bool> {
        self.calls.push(BackendCall::Present);
        Ok(!self.skip_present)
    }
}
