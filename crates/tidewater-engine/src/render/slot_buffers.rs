use std::num::NonZeroU64;

use bytemuck::Pod;

use crate::frame::{FrameSlot, SlotCapacity, UploadBuffer};

use super::{MaterialConstants, ObjectConstants, PassConstants, Vertex};
use super::pipelines::SceneLayouts;

/// GPU copy of one frame slot: uniform buffers, the wave vertex buffer and their bind groups.
pub(crate) struct SlotGpuBuffers {
    pass_ubo: wgpu::Buffer,
    object_ubo: wgpu::Buffer,
    material_ubo: wgpu::Buffer,
    wave_vbo: Option<wgpu::Buffer>,

    pub pass_bind_group: wgpu::BindGroup,
    pub object_bind_group: wgpu::BindGroup,
    pub material_bind_group: wgpu::BindGroup,
}

impl SlotGpuBuffers {
    pub fn new(
        device: &wgpu::Device,
        layouts: &SceneLayouts,
        slot: &FrameSlot,
        index: usize,
    ) -> Self {
        let SlotCapacity {
            dynamic_vertices, ..
        } = slot.capacity();

        let pass_ubo = uniform_buffer(device, &slot.pass_constants, "pass", index);
        let object_ubo = uniform_buffer(device, &slot.object_constants, "object", index);
        let material_ubo = uniform_buffer(device, &slot.material_constants, "material", index);

        let wave_vbo = (dynamic_vertices > 0).then(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("tidewater slot {index} wave vbo")),
                size: slot.wave_vertices.byte_len() as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let pass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("tidewater slot {index} pass bg")),
            layout: &layouts.pass,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: pass_ubo.as_entire_binding(),
            }],
        });

        let object_bind_group = record_bind_group::<ObjectConstants>(
            device,
            &layouts.object,
            &object_ubo,
            &format!("tidewater slot {index} object bg"),
        );
        let material_bind_group = record_bind_group::<MaterialConstants>(
            device,
            &layouts.material,
            &material_ubo,
            &format!("tidewater slot {index} material bg"),
        );

        Self {
            pass_ubo,
            object_ubo,
            material_ubo,
            wave_vbo,
            pass_bind_group,
            object_bind_group,
            material_bind_group,
        }
    }

    /// Copies every range written since the previous upload into the GPU buffers.
    ///
    /// Returns the number of bytes queued.
    pub fn upload(&self, queue: &wgpu::Queue, slot: &mut FrameSlot) -> u64 {
        let mut bytes = 0;
        bytes += write_dirty::<PassConstants>(queue, &self.pass_ubo, &mut slot.pass_constants);
        bytes += write_dirty::<ObjectConstants>(queue, &self.object_ubo, &mut slot.object_constants);
        bytes +=
            write_dirty::<MaterialConstants>(queue, &self.material_ubo, &mut slot.material_constants);
        if let Some(vbo) = &self.wave_vbo {
            bytes += write_dirty::<Vertex>(queue, vbo, &mut slot.wave_vertices);
        }
        bytes
    }

    pub fn wave_vbo(&self) -> Option<&wgpu::Buffer> {
        self.wave_vbo.as_ref()
    }
}

fn uniform_buffer<T: Pod>(
    device: &wgpu::Device,
    data: &UploadBuffer<T>,
    what: &str,
    index: usize,
) -> wgpu::Buffer {
    // Empty tables still need a bindable buffer of at least one record.
    let size = data.byte_len().max(data.stride()).max(size_of::<T>()) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("tidewater slot {index} {what} ubo")),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Binds a single record window; the draw picks the record through a dynamic offset.
fn record_bind_group<T: Pod>(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(size_of::<T>() as u64),
            }),
        }],
    })
}

fn write_dirty<T: Pod>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, data: &mut UploadBuffer<T>) -> u64 {
    let Some(range) = data.take_dirty() else { return 0 };

    // write_buffer needs 4-byte aligned offsets and sizes.
    let start = range.start & !3;
    let end = ((range.end + 3) & !3).min(data.byte_len());
    if start >= end {
        return 0;
    }

    queue.write_buffer(buffer, start as u64, &data.as_bytes()[start..end]);
    (end - start) as u64
}
