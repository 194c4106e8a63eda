use glam::Vec2;

use crate::error::{RenderError, RenderResult};
use crate::frame::{Fence, FenceCounter, FrameRing, FrameRingConfig};
use crate::render::{PassConstants, PassTiming, PipelineKey};
use crate::scene::{Camera, DrawLayer, Lighting, MaterialHandle, MeshId, Scene};
use crate::time::FrameTime;
use crate::waves::{Disturbance, WaveSimulation};

use super::{FrameBackend, FrameStage, LayerBatch, TextureScroll};

/// Frame loop configuration.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub ring: FrameRingConfig,
    /// Draw the opaque layer in wireframe.
    pub wireframe: bool,
}

/// What happened during one `run_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub slot_index: usize,
    pub fence_value: u64,
    pub object_writes: usize,
    pub material_writes: usize,
    pub draw_calls: usize,
    pub disturbance: Option<Disturbance>,
    pub presented: bool,
}

/// Drives the per-frame pipeline: wait for a slot, simulate, refresh constants,
/// record, submit, present, signal.
///
/// Single-threaded; frames never overlap on the CPU.
pub struct FrameOrchestrator<F: Fence> {
    ring: FrameRing<F>,
    scene: Scene,
    waves: Option<(WaveSimulation, MeshId)>,
    scrolls: Vec<TextureScroll>,
    lighting: Lighting,
    fences: FenceCounter,
    wireframe: bool,
    stage: FrameStage,
}

impl<F: Fence> FrameOrchestrator<F> {
    /// Builds the frame ring for `scene` and takes ownership of both.
    ///
    /// A scene with a dynamic mesh needs a wave simulation whose vertex count matches.
    pub fn new(
        config: &OrchestratorConfig,
        scene: Scene,
        waves: Option<WaveSimulation>,
        fence: F,
    ) -> RenderResult<Self> {
        if scene.ring_size() != config.ring.slot_count {
            return Err(RenderError::config(format!(
                "scene built for {} ring slots, ring has {}",
                scene.ring_size(),
                config.ring.slot_count
            )));
        }

        let waves = match (scene.meshes().dynamic(), waves) {
            (Some((mesh, count)), Some(sim)) => {
                if sim.field().vertex_count() != count {
                    return Err(RenderError::config(format!(
                        "wave mesh has {count} vertices, simulation has {}",
                        sim.field().vertex_count()
                    )));
                }
                Some((sim, mesh))
            }
            (None, None) => None,
            (Some(_), None) => {
                return Err(RenderError::config("dynamic mesh without a wave simulation"));
            }
            (None, Some(_)) => {
                return Err(RenderError::config("wave simulation without a dynamic mesh"));
            }
        };

        let capacity = scene.slot_capacity();
        let ring = FrameRing::new(&config.ring, capacity, fence)?;

        log::info!(
            "frame ring: {} slots, {} objects, {} materials, {} wave vertices",
            ring.slot_count(),
            capacity.objects,
            capacity.materials,
            capacity.dynamic_vertices
        );

        Ok(Self {
            ring,
            scene,
            waves,
            scrolls: Vec::new(),
            lighting: Lighting::default(),
            fences: FenceCounter::default(),
            wireframe: config.wireframe,
            stage: FrameStage::Idle,
        })
    }

    pub fn ring(&self) -> &FrameRing<F> {
        &self.ring
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn waves(&self) -> Option<&WaveSimulation> {
        self.waves.as_ref().map(|(sim, _)| sim)
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        if self.wireframe != enabled {
            log::info!("wireframe {}", if enabled { "on" } else { "off" });
        }
        self.wireframe = enabled;
    }

    /// Scrolls `material`'s texture transform by `velocity` texture units per second.
    pub fn add_texture_scroll(&mut self, material: MaterialHandle, velocity: Vec2) -> RenderResult<()> {
        if self.scene.materials().get(material).is_none() {
            return Err(RenderError::config(format!(
                "unknown material {}",
                material.index()
            )));
        }
        self.scrolls.push(TextureScroll::new(material, velocity));
        Ok(())
    }

    /// Runs one frame to completion.
    ///
    /// Any error is fatal for the loop; the orchestrator returns to `Idle` either way.
    pub fn run_frame<B: FrameBackend>(
        &mut self,
        time: &FrameTime,
        camera: &Camera,
        backend: &mut B,
    ) -> RenderResult<FrameReport> {
        let result = self.run_stages(time, camera, backend);
        self.stage = FrameStage::Idle;
        result
    }

    fn enter(&mut self, stage: FrameStage) {
        log::trace!("frame stage: {}", stage.name());
        self.stage = stage;
    }

    fn run_stages<B: FrameBackend>(
        &mut self,
        time: &FrameTime,
        camera: &Camera,
        backend: &mut B,
    ) -> RenderResult<FrameReport> {
        self.enter(FrameStage::WaitForSlot);
        let slot_index = self.ring.acquire_next()?;

        self.enter(FrameStage::UpdateSimulation);
        let disturbance = self.update_simulation(time)?;

        self.enter(FrameStage::UpdateConstants);
        let slot = self.ring.current_slot_mut();
        let object_writes = self.scene.refresh_constants(slot)?;
        let material_writes = self.scene.refresh_materials(slot)?;

        let pass = PassConstants::build(
            camera,
            &self.lighting,
            backend.render_target_size(),
            PassTiming {
                total: time.total,
                delta: time.dt,
            },
        );
        slot.pass_constants.copy_data(0, &pass)?;

        self.enter(FrameStage::RecordCommands);
        backend.upload(slot_index, self.ring.current_slot_mut())?;
        let batches = self.batches();
        let draw_calls = batches.iter().map(|b| b.draws.len()).sum();
        backend.record(slot_index, &batches)?;

        self.enter(FrameStage::Submit);
        backend.submit()?;

        self.enter(FrameStage::Present);
        let presented = backend.present()?;
        if !presented {
            log::debug!("frame {} not presented", time.frame_index);
        }

        self.enter(FrameStage::SignalFence);
        let fence_value = self.fences.next_value();
        self.ring.finish_frame(fence_value)?;

        Ok(FrameReport {
            slot_index,
            fence_value,
            object_writes,
            material_writes,
            draw_calls,
            disturbance,
            presented,
        })
    }

    fn update_simulation(&mut self, time: &FrameTime) -> RenderResult<Option<Disturbance>> {
        for scroll in &mut self.scrolls {
            if let Some(transform) = scroll.advance(time.dt) {
                self.scene
                    .materials_mut()
                    .set_transform(scroll.material, transform)?;
            }
        }

        let Some((sim, _)) = self.waves.as_mut() else {
            return Ok(None);
        };
        let disturbance = sim.advance(time.total, time.dt);
        sim.write_vertices(&mut self.ring.current_slot_mut().wave_vertices)?;
        Ok(disturbance)
    }

    fn batches(&self) -> Vec<LayerBatch> {
        DrawLayer::ALL
            .iter()
            .filter_map(|&layer| {
                let draws = self.scene.draw_calls(layer);
                (!draws.is_empty()).then(|| LayerBatch {
                    layer,
                    pipeline: PipelineKey::for_layer(layer, self.wireframe),
                    draws,
                })
            })
            .collect()
    }

    /// Waits for the GPU to retire every submitted frame.
    ///
    /// Call before releasing GPU buffers.
    pub fn shutdown(&mut self) -> RenderResult<()> {
        self.ring.drain()?;
        self.stage = FrameStage::Idle;
        log::info!(
            "frame loop drained after {} frames",
            self.fences.last()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::CpuFence;
    use crate::orchestrator::{BackendCall, RecordingBackend};
    use crate::render::Vertex;
    use crate::scene::{GeometryProvider, Material, Mesh, MeshVertices};
    use crate::waves::{DisturbanceConfig, WaveConfig};
    use glam::{Mat4, Vec3};

    fn scene_with_waves(ring: usize) -> (Scene, WaveSimulation) {
        let waves = WaveConfig {
            rows: 16,
            cols: 16,
            ..WaveConfig::default()
        };
        let sim = WaveSimulation::new(
            &waves,
            &DisturbanceConfig {
                seed: Some(11),
                ..DisturbanceConfig::default()
            },
        )
        .unwrap();

        let mut s = Scene::new(ring).unwrap();
        s.meshes_mut()
            .insert(Mesh::new(
                "waves",
                MeshVertices::Dynamic { count: 256 },
                sim.field().indices(),
            ))
            .unwrap();
        s.meshes_mut()
            .insert(Mesh::new(
                "box",
                MeshVertices::Static(vec![Vertex::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO); 3]),
                vec![0, 1, 2],
            ))
            .unwrap();
        let water = s.materials_mut().insert(Material::new("water", 0)).unwrap();
        let bricks = s.materials_mut().insert(Material::new("bricks", 0)).unwrap();

        let wave_geo = s.meshes().resolve("waves").unwrap();
        let box_geo = s.meshes().resolve("box").unwrap();

        s.add_item(DrawLayer::Opaque, box_geo, bricks, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        s.add_item(DrawLayer::Transparent, wave_geo, water, Mat4::IDENTITY, Mat4::IDENTITY)
            .unwrap();
        (s, sim)
    }

    fn orchestrator(ring: usize) -> FrameOrchestrator<CpuFence> {
        let (scene, sim) = scene_with_waves(ring);
        let config = OrchestratorConfig {
            ring: FrameRingConfig {
                slot_count: ring,
                ..FrameRingConfig::default()
            },
            wireframe: false,
        };
        FrameOrchestrator::new(&config, scene, Some(sim), CpuFence::immediate()).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn rejects_ring_size_mismatch() {
        let (scene, sim) = scene_with_waves(2);
        let config = OrchestratorConfig::default();
        assert!(matches!(
            FrameOrchestrator::new(&config, scene, Some(sim), CpuFence::immediate()),
            Err(RenderError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_missing_simulation() {
        let (scene, _) = scene_with_waves(3);
        assert!(
            FrameOrchestrator::new(&OrchestratorConfig::default(), scene, None, CpuFence::new())
                .is_err()
        );
    }

    // ── frame cycle ───────────────────────────────────────────────────────

    #[test]
    fn stages_call_backend_in_order() {
        let mut o = orchestrator(3);
        let mut backend = RecordingBackend::default();

        let report = o
            .run_frame(&FrameTime::fixed(0.016, 0.016, 0), &Camera::default(), &mut backend)
            .unwrap();

        assert_eq!(
            backend.calls,
            vec![
                BackendCall::Upload(0),
                BackendCall::Record(0),
                BackendCall::Submit,
                BackendCall::Present
            ]
        );
        assert_eq!(report.slot_index, 0);
        assert_eq!(report.fence_value, 1);
        assert_eq!(report.object_writes, 2);
        assert_eq!(report.material_writes, 2);
        assert_eq!(report.draw_calls, 2);
        assert!(report.presented);
        assert_eq!(o.stage(), FrameStage::Idle);
    }

    #[test]
    fn layers_are_batched_in_fixed_order() {
        let mut o = orchestrator(3);
        o.set_wireframe(true);
        let mut backend = RecordingBackend::default();
        o.run_frame(&FrameTime::fixed(0.016, 0.016, 0), &Camera::default(), &mut backend)
            .unwrap();

        let frame = backend.last_frame().unwrap();
        let layers: Vec<_> = frame.batches.iter().map(|b| b.layer).collect();
        assert_eq!(layers, vec![DrawLayer::Opaque, DrawLayer::Transparent]);
        assert_eq!(frame.batches[0].pipeline, PipelineKey::OpaqueWireframe);
        assert_eq!(frame.batches[1].pipeline, PipelineKey::Transparent);
    }

    #[test]
    fn skipped_present_still_signals() {
        let mut o = orchestrator(2);
        let mut backend = RecordingBackend {
            skip_present: true,
            ..RecordingBackend::default()
        };

        let report = o
            .run_frame(&FrameTime::fixed(0.016, 0.016, 0), &Camera::default(), &mut backend)
            .unwrap();
        assert!(!report.presented);
        assert_eq!(o.ring().last_issued(), 1);
    }

    #[test]
    fn wave_vertices_uploaded_every_frame() {
        let mut o = orchestrator(3);
        let mut backend = RecordingBackend::default();
        let camera = Camera::default();

        let mut total = 0.0;
        for i in 0..4 {
            total += 0.016;
            o.run_frame(&FrameTime::fixed(0.016, total, i), &camera, &mut backend)
                .unwrap();
        }

        // Fourth frame: constants settled, only pass + wave vertices remain.
        let last = backend.last_frame().unwrap();
        let expected = size_of::<PassConstants>() + 256 * size_of::<Vertex>();
        assert_eq!(last.uploaded_bytes, expected);
    }

    #[test]
    fn scroll_marks_material_dirty_each_frame() {
        let mut o = orchestrator(3);
        let water = o.scene().materials().handle("water").unwrap();
        o.add_texture_scroll(water, Vec2::new(0.1, 0.02)).unwrap();

        let mut backend = RecordingBackend::default();
        let camera = Camera::default();
        let mut reports = Vec::new();
        for i in 0..5 {
            let t = 0.016 * (i + 1) as f32;
            reports.push(o.run_frame(&FrameTime::fixed(0.016, t, i), &camera, &mut backend).unwrap());
        }

        // Bricks settle after three frames; water keeps moving.
        assert_eq!(reports[0].material_writes, 2);
        assert_eq!(reports[4].material_writes, 1);
        assert_eq!(o.scene().materials().get(water).unwrap().frames_dirty(), 2);
    }

    #[test]
    fn disturbance_fires_on_schedule() {
        let mut o = orchestrator(3);
        let mut backend = RecordingBackend::default();
        let camera = Camera::default();

        let r = o
            .run_frame(&FrameTime::fixed(0.1, 0.1, 0), &camera, &mut backend)
            .unwrap();
        assert!(r.disturbance.is_none());

        let r = o
            .run_frame(&FrameTime::fixed(0.2, 0.3, 1), &camera, &mut backend)
            .unwrap();
        assert!(r.disturbance.is_some());
    }

    #[test]
    fn shutdown_drains_ring() {
        let (scene, sim) = scene_with_waves(3);
        let fence = CpuFence::new();
        let gpu = fence.completer();
        let config = OrchestratorConfig {
            ring: FrameRingConfig {
                slot_count: 3,
                wait_timeout: Some(std::time::Duration::from_millis(20)),
            },
            wireframe: false,
        };
        let mut o = FrameOrchestrator::new(&config, scene, Some(sim), fence).unwrap();
        let mut backend = RecordingBackend::default();
        o.run_frame(&FrameTime::fixed(0.016, 0.016, 0), &Camera::default(), &mut backend)
            .unwrap();

        assert!(matches!(
            o.shutdown(),
            Err(RenderError::SynchronizationTimeout { value: 1, .. })
        ));
        gpu.complete_all();
        o.shutdown().unwrap();
    }
}
