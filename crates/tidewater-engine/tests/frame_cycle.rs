use std::thread;
use std::time::{Duration, Instant};

use glam::{Mat4, Vec2, Vec3};
use tidewater_engine::frame::{CpuFence, Fence, FrameRing, FrameRingConfig};
use tidewater_engine::orchestrator::{
    BackendCall, FrameOrchestrator, FrameStage, OrchestratorConfig, RecordingBackend,
};
use tidewater_engine::render::{PipelineKey, Vertex};
use tidewater_engine::scene::{
    Camera, DrawLayer, GeometryProvider, ItemHandle, Material, Mesh, MeshVertices, Scene,
};
use tidewater_engine::time::FrameTime;
use tidewater_engine::RenderError;

fn triangle_scene(ring: usize) -> (Scene, ItemHandle) {
    let mut scene = Scene::new(ring).unwrap();
    let v = vec![Vertex::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO); 3];
    scene
        .meshes_mut()
        .insert(Mesh::new("tri", MeshVertices::Static(v), vec![0, 1, 2]))
        .unwrap();
    let geo = scene.meshes().resolve("tri").unwrap();
    let mat = scene.materials_mut().insert(Material::new("grass", 0)).unwrap();
    let item = scene
        .add_item(DrawLayer::Opaque, geo, mat, Mat4::IDENTITY, Mat4::IDENTITY)
        .unwrap();
    (scene, item)
}

fn ring_config(slots: usize, timeout: Option<Duration>) -> FrameRingConfig {
    FrameRingConfig {
        slot_count: slots,
        wait_timeout: timeout,
    }
}

// ── ring + dirty counters ──────────────────────────────────────────────────

#[test]
fn dirty_item_reaches_every_slot() {
    let (mut scene, item) = triangle_scene(3);
    let mut ring = FrameRing::new(
        &ring_config(3, None),
        scene.slot_capacity(),
        CpuFence::immediate(),
    )
    .unwrap();

    // Settle the initial dirtiness.
    let mut fence = 0;
    for _ in 0..3 {
        ring.acquire_next().unwrap();
        scene.refresh_constants(ring.current_slot_mut()).unwrap();
        fence += 1;
        ring.finish_frame(fence).unwrap();
    }

    let world = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
    scene.set_world(item, world).unwrap();

    for cycle in 0..3 {
        ring.acquire_next().unwrap();
        scene.refresh_constants(ring.current_slot_mut()).unwrap();
        fence += 1;
        ring.finish_frame(fence).unwrap();

        let left = scene.item(item).unwrap().frames_dirty();
        if cycle < 2 {
            assert!(left > 0);
        } else {
            assert_eq!(left, 0);
        }
    }

    for slot in ring.slots() {
        let c = slot.object_constants.get(0).unwrap();
        assert_eq!(c.world, world.to_cols_array_2d());
    }
}

#[test]
fn acquire_blocks_until_gpu_retires_slot() {
    let fence = CpuFence::new();
    let gpu = fence.completer();
    let (scene, _) = triangle_scene(2);
    let mut ring = FrameRing::new(
        &ring_config(2, Some(Duration::from_secs(5))),
        scene.slot_capacity(),
        fence,
    )
    .unwrap();

    assert_eq!(ring.acquire_next().unwrap(), 0);
    ring.finish_frame(1).unwrap();
    assert_eq!(ring.acquire_next().unwrap(), 1);
    ring.finish_frame(2).unwrap();

    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        gpu.complete_next()
    });

    let started = Instant::now();
    assert_eq!(ring.acquire_next().unwrap(), 0);
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(worker.join().unwrap(), Some(1));
    assert_eq!(ring.fence().completed_value(), 1);
}

#[test]
fn stalled_gpu_times_out() {
    let (scene, _) = triangle_scene(1);
    let mut ring = FrameRing::new(
        &ring_config(1, Some(Duration::from_millis(10))),
        scene.slot_capacity(),
        CpuFence::new(),
    )
    .unwrap();

    ring.acquire_next().unwrap();
    ring.finish_frame(1).unwrap();
    assert!(matches!(
        ring.acquire_next(),
        Err(RenderError::SynchronizationTimeout {
            value: 1,
            completed: 0,
            ..
        })
    ));
}

// ── orchestrator ───────────────────────────────────────────────────────────

#[test]
fn orchestrated_frames_cycle_slots() {
    let (scene, item) = triangle_scene(3);
    let config = OrchestratorConfig {
        ring: ring_config(3, Some(Duration::from_secs(1))),
        wireframe: false,
    };
    let mut o = FrameOrchestrator::new(&config, scene, None, CpuFence::immediate()).unwrap();
    let mut backend = RecordingBackend::default();
    let camera = Camera::default();

    let mut slots = Vec::new();
    for i in 0..5u64 {
        let t = FrameTime::fixed(0.016, 0.016 * (i + 1) as f32, i);
        let report = o.run_frame(&t, &camera, &mut backend).unwrap();
        assert_eq!(report.fence_value, i + 1);
        assert_eq!(o.stage(), FrameStage::Idle);
        slots.push(report.slot_index);
    }

    assert_eq!(slots, vec![0, 1, 2, 0, 1]);
    assert_eq!(o.scene().item(item).unwrap().frames_dirty(), 0);
    assert_eq!(backend.calls.len(), 20);
    assert_eq!(backend.calls[16], BackendCall::Upload(1));
}

#[test]
fn wireframe_toggle_switches_opaque_pipeline() {
    let (scene, _) = triangle_scene(2);
    let config = OrchestratorConfig {
        ring: ring_config(2, None),
        wireframe: true,
    };
    let mut o = FrameOrchestrator::new(&config, scene, None, CpuFence::immediate()).unwrap();
    let mut backend = RecordingBackend::default();
    let camera = Camera::default();

    o.run_frame(&FrameTime::fixed(0.016, 0.016, 0), &camera, &mut backend)
        .unwrap();
    assert_eq!(
        backend.last_frame().unwrap().batches[0].pipeline,
        PipelineKey::OpaqueWireframe
    );

    o.set_wireframe(false);
    o.run_frame(&FrameTime::fixed(0.016, 0.032, 1), &camera, &mut backend)
        .unwrap();
    assert_eq!(
        backend.last_frame().unwrap().batches[0].pipeline,
        PipelineKey::Opaque
    );
}

#[test]
fn frame_error_leaves_orchestrator_idle() {
    let (scene, _) = triangle_scene(1);
    let config = OrchestratorConfig {
        ring: ring_config(1, Some(Duration::from_millis(5))),
        wireframe: false,
    };
    let mut o = FrameOrchestrator::new(&config, scene, None, CpuFence::new()).unwrap();
    let mut backend = RecordingBackend::default();
    let camera = Camera::default();

    o.run_frame(&FrameTime::fixed(0.016, 0.016, 0), &camera, &mut backend)
        .unwrap();
    let err = o
        .run_frame(&FrameTime::fixed(0.016, 0.032, 1), &camera, &mut backend)
        .unwrap_err();

    assert!(matches!(err, RenderError::SynchronizationTimeout { .. }));
    assert_eq!(o.stage(), FrameStage::Idle);
    assert_eq!(backend.calls.len(), 4);
}

#[test]
fn stalled_slot_reaches_backend_only_after_retry() {
    let (scene, _) = triangle_scene(2);
    let config = OrchestratorConfig {
        ring: ring_config(2, Some(Duration::from_millis(5))),
        wireframe: false,
    };
    let fence = CpuFence::new();
    let gpu = fence.completer();
    let mut o = FrameOrchestrator::new(&config, scene, None, fence).unwrap();
    let mut backend = RecordingBackend::default();
    let camera = Camera::default();

    for i in 0..2u64 {
        let t = FrameTime::fixed(0.016, 0.016 * (i + 1) as f32, i);
        o.run_frame(&t, &camera, &mut backend).unwrap();
    }

    let t = FrameTime::fixed(0.016, 0.048, 2);
    assert!(o.run_frame(&t, &camera, &mut backend).is_err());
    assert_eq!(backend.calls.len(), 8);
    assert_eq!(o.ring().current_index(), 1);

    gpu.complete_next();
    let report = o.run_frame(&t, &camera, &mut backend).unwrap();
    assert_eq!(report.slot_index, 0);
    assert_eq!(report.fence_value, 3);
    assert_eq!(backend.calls[8], BackendCall::Upload(0));
}
