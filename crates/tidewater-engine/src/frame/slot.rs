use crate::render::{MaterialConstants, ObjectConstants, PassConstants, Vertex};

use super::UploadBuffer;

/// Record counts a slot is sized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotCapacity {
    pub objects: usize,
    pub materials: usize,
    /// Wave vertices; zero when the scene has no dynamic mesh.
    pub dynamic_vertices: usize,
}

/// One set of per-frame CPU-writable buffers plus the fence value that guards it.
///
/// The CPU may only write here after the GPU has retired `fence`.
#[derive(Debug)]
pub struct FrameSlot {
    pub object_constants: UploadBuffer<ObjectConstants>,
    pub pass_constants: UploadBuffer<PassConstants>,
    pub material_constants: UploadBuffer<MaterialConstants>,
    pub wave_vertices: UploadBuffer<Vertex>,
    pub(crate) fence: u64,
}

impl FrameSlot {
    pub fn new(capacity: SlotCapacity) -> Self {
        Self {
            object_constants: UploadBuffer::constant(capacity.objects),
            pass_constants: UploadBuffer::constant(1),
            material_constants: UploadBuffer::constant(capacity.materials),
            wave_vertices: UploadBuffer::vertex(capacity.dynamic_vertices),
            fence: 0,
        }
    }

    /// Fence value most recently assigned to this slot (0 = never submitted).
    pub fn fence_value(&self) -> u64 {
        self.fence
    }

    pub fn capacity(&self) -> SlotCapacity {
        SlotCapacity {
            objects: self.object_constants.len(),
            materials: self.material_constants.len(),
            dynamic_vertices: self.wave_vertices.len(),
        }
    }
}
