use glam::Mat4;

use super::{DrawLayer, GeometryRef, MaterialHandle};

/// Index of a render item in its `Scene`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub(crate) u32);

impl ItemHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A drawable instance: geometry range, material and transforms.
#[derive(Debug, Clone)]
pub struct RenderItem {
    pub(crate) world: Mat4,
    pub(crate) tex_transform: Mat4,
    pub(crate) geometry: GeometryRef,
    pub(crate) material: MaterialHandle,
    pub(crate) layer: DrawLayer,
    /// Slot in the per-frame object buffer.
    pub(crate) object_index: u32,
    /// Ring slots still holding stale constants.
    pub(crate) frames_dirty: u32,
}

impl RenderItem {
    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn tex_transform(&self) -> Mat4 {
        self.tex_transform
    }

    pub fn geometry(&self) -> GeometryRef {
        self.geometry
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn layer(&self) -> DrawLayer {
        self.layer
    }

    pub fn object_index(&self) -> u32 {
        self.object_index
    }

    pub fn frames_dirty(&self) -> u32 {
        self.frames_dirty
    }
}
