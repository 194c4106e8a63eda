use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};

use crate::error::{RenderError, RenderResult};
use crate::frame::FrameSlot;
use crate::render::MaterialConstants;

/// Index of a material in its `MaterialStore`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

impl MaterialHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Surface parameters shared by any number of render items.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse_albedo: Vec4,
    pub fresnel_r0: Vec3,
    pub roughness: f32,
    /// Texture-space transform (scroll/tile).
    pub transform: Mat4,
    /// Texture bound with this material.
    pub texture_index: u32,
    cb_index: u32,
    frames_dirty: u32,
}

impl Material {
    pub fn new(name: impl Into<String>, texture_index: u32) -> Self {
        Self {
            name: name.into(),
            diffuse_albedo: Vec4::ONE,
            fresnel_r0: Vec3::splat(0.01),
            roughness: 0.25,
            transform: Mat4::IDENTITY,
            texture_index,
            cb_index: 0,
            frames_dirty: 0,
        }
    }

    pub fn with_albedo(mut self, albedo: Vec4) -> Self {
        self.diffuse_albedo = albedo;
        self
    }

    pub fn with_fresnel(mut self, fresnel_r0: Vec3, roughness: f32) -> Self {
        self.fresnel_r0 = fresnel_r0;
        self.roughness = roughness;
        self
    }

    /// Slot of this material in the per-frame material buffer.
    pub fn cb_index(&self) -> u32 {
        self.cb_index
    }

    pub fn frames_dirty(&self) -> u32 {
        self.frames_dirty
    }
}

/// Owning table of materials, indexed in insertion order.
#[derive(Debug)]
pub struct MaterialStore {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialHandle>,
    ring_size: u32,
}

impl MaterialStore {
    pub(crate) fn new(ring_size: u32) -> Self {
        Self {
            materials: Vec::new(),
            by_name: HashMap::new(),
            ring_size,
        }
    }

    /// Adds a material; it is written to every ring slot over the next frames.
    pub fn insert(&mut self, mut material: Material) -> RenderResult<MaterialHandle> {
        if self.by_name.contains_key(&material.name) {
            return Err(RenderError::config(format!(
                "duplicate material '{}'",
                material.name
            )));
        }

        let handle = MaterialHandle(self.materials.len() as u32);
        material.cb_index = handle.0;
        material.frames_dirty = self.ring_size;

        self.by_name.insert(material.name.clone(), handle);
        self.materials.push(material);
        Ok(handle)
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.index())
    }

    pub fn handle(&self, name: &str) -> Option<MaterialHandle> {
        self.by_name.get(name).copied()
    }

    /// `(constant_buffer_index, texture_index)` for `name`.
    pub fn resolve(&self, name: &str) -> Option<(u32, u32)> {
        let m = self.get(self.handle(name)?)?;
        Some((m.cb_index, m.texture_index))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn mark_dirty(&mut self, handle: MaterialHandle) -> RenderResult<()> {
        let ring_size = self.ring_size;
        self.get_mut(handle)?.frames_dirty = ring_size;
        Ok(())
    }

    pub fn set_transform(&mut self, handle: MaterialHandle, transform: Mat4) -> RenderResult<()> {
        self.get_mut(handle)?.transform = transform;
        self.mark_dirty(handle)
    }

    /// Writes every dirty material into `slot` and counts it down. Returns the write count.
    pub fn refresh(&mut self, slot: &mut FrameSlot) -> RenderResult<usize> {
        let mut writes = 0;
        for m in self.materials.iter_mut().filter(|m| m.frames_dirty > 0) {
            slot.material_constants
                .copy_data(m.cb_index as usize, &MaterialConstants::from_material(m))?;
            m.frames_dirty -= 1;
            writes += 1;
        }
        Ok(writes)
    }

    fn get_mut(&mut self, handle: MaterialHandle) -> RenderResult<&mut Material> {
        self.materials
            .get_mut(handle.index())
            .ok_or_else(|| RenderError::config(format!("unknown material {}", handle.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SlotCapacity;

    fn slot(materials: usize) -> FrameSlot {
        FrameSlot::new(SlotCapacity {
            objects: 0,
            materials,
            dynamic_vertices: 0,
        })
    }

    #[test]
    fn resolves_indices_in_insertion_order() {
        let mut s = MaterialStore::new(3);
        s.insert(Material::new("grass", 0)).unwrap();
        s.insert(Material::new("water", 1)).unwrap();
        s.insert(Material::new("bricks", 1)).unwrap();

        assert_eq!(s.resolve("water"), Some((1, 1)));
        assert_eq!(s.resolve("bricks"), Some((2, 1)));
        assert_eq!(s.resolve("lava"), None);
        assert!(s.insert(Material::new("grass", 3)).is_err());
    }

    #[test]
    fn refresh_counts_down_per_slot() {
        let mut s = MaterialStore::new(2);
        let h = s.insert(Material::new("water", 0)).unwrap();
        let (mut a, mut b) = (slot(1), slot(1));

        assert_eq!(s.refresh(&mut a).unwrap(), 1);
        assert_eq!(s.refresh(&mut b).unwrap(), 1);
        assert_eq!(s.refresh(&mut a).unwrap(), 0);

        let moved = Mat4::from_translation(Vec3::new(0.5, 0.25, 0.0));
        s.set_transform(h, moved).unwrap();
        assert_eq!(s.get(h).unwrap().frames_dirty(), 2);

        s.refresh(&mut a).unwrap();
        s.refresh(&mut b).unwrap();
        for slot in [&a, &b] {
            let c = slot.material_constants.get(0).unwrap();
            assert_eq!(c.transform, moved.to_cols_array_2d());
        }
    }

    #[test]
    fn refresh_fails_when_slot_too_small() {
        let mut s = MaterialStore::new(1);
        s.insert(Material::new("a", 0)).unwrap();
        s.insert(Material::new("b", 0)).unwrap();
        assert!(matches!(
            s.refresh(&mut slot(1)),
            Err(RenderError::ResourceExhaustion(_))
        ));
    }
}
