use glam::Vec2;
use winit::window::Window;

use crate::device::{Gpu, GpuFrame};
use crate::error::{RenderError, RenderResult};
use crate::frame::{CONSTANT_BUFFER_ALIGNMENT, FrameSlot};
use crate::orchestrator::{FrameBackend, LayerBatch};
use crate::scene::Scene;

use super::mesh::{GpuMesh, GpuVertices, upload_meshes};
use super::pipelines::{DEPTH_FORMAT, PipelineSet, SceneLayouts};
use super::slot_buffers::SlotGpuBuffers;
use super::texture::{TextureData, TextureTable};

struct DepthTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

/// GPU resources for one scene: pipelines, per-slot buffers, meshes and textures.
///
/// Built once after the scene and frame ring exist; the mesh and material tables must
/// not grow afterwards.
pub struct SceneRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: PipelineSet,
    slots: Vec<SlotGpuBuffers>,
    meshes: Vec<GpuMesh>,
    textures: TextureTable,
    depth: Option<DepthTarget>,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        scene: &Scene,
        slots: &[FrameSlot],
        textures: &[TextureData],
    ) -> RenderResult<Self> {
        if let Some(m) = scene
            .materials()
            .iter()
            .find(|m| m.texture_index as usize >= textures.len())
        {
            return Err(RenderError::config(format!(
                "material '{}' uses texture {} but only {} are loaded",
                m.name,
                m.texture_index,
                textures.len()
            )));
        }

        let layouts = SceneLayouts::new(device);
        let pipelines = PipelineSet::new(device, &layouts, color_format);
        let slot_buffers = slots
            .iter()
            .enumerate()
            .map(|(i, slot)| SlotGpuBuffers::new(device, &layouts, slot, i))
            .collect();
        let meshes = upload_meshes(device, scene.meshes());
        let textures = TextureTable::new(device, queue, &layouts.texture, textures);

        log::info!(
            "scene renderer: {} slots, {} meshes, {} textures",
            slots.len(),
            meshes.len(),
            textures.len()
        );

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            pipelines,
            slots: slot_buffers,
            meshes,
            textures,
            depth: None,
            clear_color: wgpu::Color {
                r: 0.7,
                g: 0.7,
                b: 0.7,
                a: 1.0,
            },
        })
    }

    /// Background colour; match it to the fog colour so distant geometry fades out.
    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: rgba[0] as f64,
            g: rgba[1] as f64,
            b: rgba[2] as f64,
            a: rgba[3] as f64,
        };
    }

    /// Opens a command encoder for one frame on `gpu`'s surface.
    ///
    /// The surface texture is acquired in `record`, after the frame slot is free. A frame
    /// without a surface texture still uploads, submits and signals; it just records no
    /// draws and reports nothing presented.
    pub fn begin_frame<'a, 'w>(&'a mut self, gpu: &'a mut Gpu<'w>) -> SurfaceFrame<'a, 'w> {
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tidewater frame encoder"),
            });

        let size = gpu.size();
        SurfaceFrame {
            renderer: self,
            gpu,
            target: None,
            encoder: Some(encoder),
            size: Vec2::new(size.width as f32, size.height as f32),
            window: None,
        }
    }

    fn ensure_depth(&mut self, size: (u32, u32)) {
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tidewater depth"),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("depth target resized to {}x{}", size.0, size.1);
        self.depth = Some(DepthTarget { view, size });
    }
}

/// One in-flight frame on the real GPU.
pub struct SurfaceFrame<'a, 'w> {
    renderer: &'a mut SceneRenderer,
    gpu: &'a mut Gpu<'w>,
    target: Option<GpuFrame>,
    encoder: Option<wgpu::CommandEncoder>,
    size: Vec2,
    window: Option<&'a Window>,
}

impl<'a> SurfaceFrame<'a, '_> {
    /// Calls `pre_present_notify` on `window` right before presenting.
    pub fn notify_before_present(mut self, window: &'a Window) -> Self {
        self.window = Some(window);
        self
    }

    fn acquire_target(&mut self) -> RenderResult<()> {
        if self.target.is_some() {
            return Ok(());
        }
        self.target = self.gpu.acquire_frame()?;
        if let Some(t) = &self.target {
            self.renderer.ensure_depth(t.size());
        }
        Ok(())
    }
}

fn dynamic_offset(index: u32) -> u32 {
    index * CONSTANT_BUFFER_ALIGNMENT as u32
}

impl FrameBackend for SurfaceFrame<'_, '_> {
    fn render_target_size(&self) -> Vec2 {
        self.size
    }

    fn upload(&mut self, slot_index: usize, slot: &mut FrameSlot) -> RenderResult<()> {
        let gpu = self.renderer.slots.get(slot_index).ok_or_else(|| {
            RenderError::exhausted(format!("no GPU buffers for frame slot {slot_index}"))
        })?;
        let bytes = gpu.upload(&self.renderer.queue, slot);
        log::trace!("slot {slot_index}: uploaded {bytes} bytes");
        Ok(())
    }

    fn record(&mut self, slot_index: usize, batches: &[LayerBatch]) -> RenderResult<()> {
        self.acquire_target()?;
        let (Some(target), Some(encoder)) = (&self.target, self.encoder.as_mut()) else {
            return Ok(());
        };
        let renderer = &mut *self.renderer;
        let depth = renderer
            .depth
            .as_ref()
            .ok_or_else(|| RenderError::Device("depth target missing".into()))?;
        let slot = renderer.slots.get(slot_index).ok_or_else(|| {
            RenderError::exhausted(format!("no GPU buffers for frame slot {slot_index}"))
        })?;

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tidewater scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(renderer.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_bind_group(0, &slot.pass_bind_group, &[]);

        for batch in batches {
            let Some(pipeline) = renderer.pipelines.get(batch.pipeline) else {
                return Err(RenderError::Device(format!(
                    "no pipeline for '{}'",
                    batch.pipeline.name()
                )));
            };
            pass.set_pipeline(pipeline);

            for draw in &batch.draws {
                let mesh = renderer.meshes.get(draw.mesh.index()).ok_or_else(|| {
                    RenderError::exhausted(format!("mesh {} not uploaded", draw.mesh.index()))
                })?;
                let texture = renderer.textures.get(draw.texture_index).ok_or_else(|| {
                    RenderError::exhausted(format!("texture {} not loaded", draw.texture_index))
                })?;

                pass.set_bind_group(1, &slot.object_bind_group, &[dynamic_offset(draw.object_index)]);
                pass.set_bind_group(
                    2,
                    &slot.material_bind_group,
                    &[dynamic_offset(draw.material_index)],
                );
                pass.set_bind_group(3, texture, &[]);

                let range = draw.range;
                match &mesh.vertices {
                    GpuVertices::Sprites(vbo) => {
                        pass.set_vertex_buffer(0, vbo.slice(..));
                        let first = range.base_vertex.max(0) as u32;
                        pass.draw(0..4, first..first + range.vertex_count);
                        continue;
                    }
                    GpuVertices::Static(vbo) => pass.set_vertex_buffer(0, vbo.slice(..)),
                    GpuVertices::Dynamic => {
                        let vbo = slot.wave_vbo().ok_or_else(|| {
                            RenderError::exhausted("dynamic mesh drawn without a wave buffer")
                        })?;
                        pass.set_vertex_buffer(0, vbo.slice(..));
                    }
                }

                match &mesh.indices {
                    Some(ibo) => {
                        pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(
                            range.start_index..range.start_index + range.index_count,
                            range.base_vertex,
                            0..1,
                        );
                    }
                    None => {
                        let first = range.base_vertex.max(0) as u32;
                        pass.draw(first..first + range.vertex_count, 0..1);
                    }
                }
            }
        }

        Ok(())
    }

    fn submit(&mut self) -> RenderResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| RenderError::Device("frame submitted twice".into()))?;
        self.renderer
            .queue
            .submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn present(&mut self) -> RenderResult<bool> {
        let Some(target) = self.target.take() else {
            return Ok(false);
        };
        if let Some(window) = self.window {
            window.pre_present_notify();
        }
        drop(target.view);
        target.surface_texture.present();
        Ok(true)
    }
}
