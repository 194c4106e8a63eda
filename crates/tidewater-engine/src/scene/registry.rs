use glam::Mat4;

use crate::error::{RenderError, RenderResult};
use crate::frame::{FrameSlot, SlotCapacity};
use crate::render::ObjectConstants;

use super::{
    DrawLayer, GeometryRef, ItemHandle, MaterialHandle, MaterialStore, MeshId, MeshTable,
    RenderItem, SubmeshRange,
};

/// Everything needed to issue one draw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub item: ItemHandle,
    pub mesh: MeshId,
    pub range: SubmeshRange,
    pub object_index: u32,
    pub material_index: u32,
    pub texture_index: u32,
}

/// Render items grouped into draw layers, plus the meshes and materials they reference.
///
/// Every mutation sets the affected record's dirty counter to the ring size; each
/// `refresh_*` call writes dirty records into one slot and counts them down, so every
/// slot's copy is refreshed exactly once.
#[derive(Debug)]
pub struct Scene {
    ring_size: u32,
    items: Vec<RenderItem>,
    layers: [Vec<ItemHandle>; DrawLayer::COUNT],
    materials: MaterialStore,
    meshes: MeshTable,
}

impl Scene {
    pub fn new(ring_size: usize) -> RenderResult<Self> {
        if ring_size == 0 {
            return Err(RenderError::config("scene ring size must be at least 1"));
        }
        let ring_size = ring_size as u32;
        Ok(Self {
            ring_size,
            items: Vec::new(),
            layers: Default::default(),
            materials: MaterialStore::new(ring_size),
            meshes: MeshTable::new(),
        })
    }

    pub fn ring_size(&self) -> usize {
        self.ring_size as usize
    }

    pub fn meshes(&self) -> &MeshTable {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut MeshTable {
        &mut self.meshes
    }

    pub fn materials(&self) -> &MaterialStore {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialStore {
        &mut self.materials
    }

    /// Record counts a frame slot needs to hold this scene.
    pub fn slot_capacity(&self) -> SlotCapacity {
        SlotCapacity {
            objects: self.items.len(),
            materials: self.materials.len(),
            dynamic_vertices: self.meshes.dynamic().map_or(0, |(_, n)| n),
        }
    }

    // ── items ─────────────────────────────────────────────────────────────

    /// Appends an item to `layer`. It takes the next object index and starts dirty.
    pub fn add_item(
        &mut self,
        layer: DrawLayer,
        geometry: GeometryRef,
        material: MaterialHandle,
        world: Mat4,
        tex_transform: Mat4,
    ) -> RenderResult<ItemHandle> {
        if self.meshes.get(geometry.mesh).is_none() {
            return Err(RenderError::config(format!(
                "unknown mesh {}",
                geometry.mesh.index()
            )));
        }
        if self.materials.get(material).is_none() {
            return Err(RenderError::config(format!(
                "unknown material {}",
                material.index()
            )));
        }

        let handle = ItemHandle(self.items.len() as u32);
        self.items.push(RenderItem {
            world,
            tex_transform,
            geometry,
            material,
            layer,
            object_index: handle.0,
            frames_dirty: self.ring_size,
        });
        self.layers[layer.index()].push(handle);
        Ok(handle)
    }

    pub fn item(&self, handle: ItemHandle) -> Option<&RenderItem> {
        self.items.get(handle.index())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn mark_dirty(&mut self, handle: ItemHandle) -> RenderResult<()> {
        let ring_size = self.ring_size;
        self.item_mut(handle)?.frames_dirty = ring_size;
        Ok(())
    }

    pub fn set_world(&mut self, handle: ItemHandle, world: Mat4) -> RenderResult<()> {
        self.item_mut(handle)?.world = world;
        self.mark_dirty(handle)
    }

    pub fn set_tex_transform(&mut self, handle: ItemHandle, tex_transform: Mat4) -> RenderResult<()> {
        self.item_mut(handle)?.tex_transform = tex_transform;
        self.mark_dirty(handle)
    }

    fn item_mut(&mut self, handle: ItemHandle) -> RenderResult<&mut RenderItem> {
        self.items
            .get_mut(handle.index())
            .ok_or_else(|| RenderError::config(format!("unknown render item {}", handle.0)))
    }

    // ── per-slot refresh ──────────────────────────────────────────────────

    /// Writes dirty items' transforms into `slot`. Returns the number of records written.
    pub fn refresh_constants(&mut self, slot: &mut FrameSlot) -> RenderResult<usize> {
        let mut writes = 0;
        for item in self.items.iter_mut().filter(|i| i.frames_dirty > 0) {
            let c = ObjectConstants::new(item.world, item.tex_transform);
            slot.object_constants
                .copy_data(item.object_index as usize, &c)?;
            item.frames_dirty -= 1;
            writes += 1;
        }
        Ok(writes)
    }

    /// Same as `refresh_constants`, for materials.
    pub fn refresh_materials(&mut self, slot: &mut FrameSlot) -> RenderResult<usize> {
        self.materials.refresh(slot)
    }

    // ── layers ────────────────────────────────────────────────────────────

    /// Items of `layer` in insertion order.
    pub fn layer(&self, layer: DrawLayer) -> &[ItemHandle] {
        &self.layers[layer.index()]
    }

    pub fn draw_calls(&self, layer: DrawLayer) -> Vec<DrawCall> {
        self.layer(layer)
            .iter()
            .filter_map(|&h| {
                let item = self.item(h)?;
                let material = self.materials.get(item.material)?;
                Some(DrawCall {
                    item: h,
                    mesh: item.geometry.mesh,
                    range: item.geometry.range,
                    object_index: item.object_index,
                    material_index: material.cb_index(),
                    texture_index: material.texture_index,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Vertex;
    use crate::scene::{GeometryProvider, Material, Mesh, MeshVertices};
    use glam::{Vec2, Vec3};

    fn scene(ring: usize) -> (Scene, GeometryRef, MaterialHandle) {
        let mut s = Scene::new(ring).unwrap();
        let v = vec![Vertex::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO); 3];
        s.meshes_mut()
            .insert(Mesh::new("tri", MeshVertices::Static(v), vec![0, 1, 2]))
            .unwrap();
        let geo = s.meshes().resolve("tri").unwrap();
        let mat = s.materials_mut().insert(Material::new("m", 0)).unwrap();
        (s, geo, mat)
    }

    fn slots(s: &Scene, n: usize) -> Vec<FrameSlot> {
        (0..n).map(|_| FrameSlot::new(s.slot_capacity())).collect()
    }

    // ── items ─────────────────────────────────────────────────────────────

    #[test]
    fn add_item_assigns_sequential_indices() {
        let (mut s, geo, mat) = scene(3);
        let a = s
            .add_item(DrawLayer::Opaque, geo, mat, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        let b = s
            .add_item(DrawLayer::Transparent, geo, mat, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();

        assert_eq!(s.item(a).unwrap().object_index(), 0);
        assert_eq!(s.item(b).unwrap().object_index(), 1);
        assert_eq!(s.item(a).unwrap().frames_dirty(), 3);
        assert_eq!(s.layer(DrawLayer::Transparent), &[b]);
    }

    #[test]
    fn rejects_zero_ring() {
        assert!(Scene::new(0).is_err());
    }

    // ── dirty counters ────────────────────────────────────────────────────

    #[test]
    fn dirty_item_written_once_per_slot() {
        let (mut s, geo, mat) = scene(3);
        let h = s
            .add_item(DrawLayer::Opaque, geo, mat, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        let mut slots = slots(&s, 3);

        for slot in &mut slots {
            assert_eq!(s.refresh_constants(slot).unwrap(), 1);
        }
        assert_eq!(s.item(h).unwrap().frames_dirty(), 0);

        let world = Mat4::from_translation(Vec3::new(4.0, 0.0, -2.0));
        s.set_world(h, world).unwrap();

        for (n, slot) in slots.iter_mut().enumerate() {
            s.refresh_constants(slot).unwrap();
            assert_eq!(s.item(h).unwrap().frames_dirty(), 2 - n as u32);
        }
        for slot in &slots {
            let c = slot.object_constants.get(0).unwrap();
            assert_eq!(c.world, world.to_cols_array_2d());
        }
    }

    #[test]
    fn clean_refresh_writes_nothing() {
        let (mut s, geo, mat) = scene(2);
        s.add_item(DrawLayer::Opaque, geo, mat, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        let mut slots = slots(&s, 2);
        for slot in &mut slots {
            s.refresh_constants(slot).unwrap();
        }

        let before = slots[0].object_constants.write_count();
        slots[0].object_constants.take_dirty();
        assert_eq!(s.refresh_constants(&mut slots[0]).unwrap(), 0);
        assert_eq!(slots[0].object_constants.write_count(), before);
        assert!(slots[0].object_constants.take_dirty().is_none());
    }

    // ── draw calls ────────────────────────────────────────────────────────

    #[test]
    fn draw_calls_follow_insertion_order() {
        let (mut s, geo, _) = scene(1);
        let water = s.materials_mut().insert(Material::new("water", 4)).unwrap();

        let a = s
            .add_item(DrawLayer::Opaque, geo, water, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        s.add_item(DrawLayer::AlphaTested, geo, water, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        let c = s
            .add_item(DrawLayer::Opaque, geo, water, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();

        let calls = s.draw_calls(DrawLayer::Opaque);
        assert_eq!(calls.iter().map(|c| c.item).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(calls[1].object_index, 2);
        assert_eq!(calls[1].material_index, 1);
        assert_eq!(calls[1].texture_index, 4);
        assert_eq!(calls[0].range.index_count, 3);
        assert!(s.draw_calls(DrawLayer::AlphaTestedSprites).is_empty());
    }

    #[test]
    fn slot_capacity_counts_records() {
        let (mut s, geo, mat) = scene(3);
        s.meshes_mut()
            .insert(Mesh::new("waves", MeshVertices::Dynamic { count: 64 }, vec![]))
            .unwrap();
        s.add_item(DrawLayer::Opaque, geo, mat, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();

        let cap = s.slot_capacity();
        assert_eq!(cap.objects, 1);
        assert_eq!(cap.materials, 1);
        assert_eq!(cap.dynamic_vertices, 64);
    }
}
