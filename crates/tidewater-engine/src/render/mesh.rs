use wgpu::util::DeviceExt;

use crate::scene::{MeshTable, MeshVertices};

/// Where a mesh's vertex data lives on the GPU.
pub(crate) enum GpuVertices {
    Static(wgpu::Buffer),
    /// Read from the current frame slot's wave buffer.
    Dynamic,
    /// One instance per sprite record.
    Sprites(wgpu::Buffer),
}

pub(crate) struct GpuMesh {
    pub vertices: GpuVertices,
    pub indices: Option<wgpu::Buffer>,
}

/// Uploads every mesh in `table`; the result is indexed by `MeshId`.
pub(crate) fn upload_meshes(device: &wgpu::Device, table: &MeshTable) -> Vec<GpuMesh> {
    table
        .iter()
        .map(|(_, mesh)| {
            let vertices = match &mesh.vertices {
                MeshVertices::Static(v) => GpuVertices::Static(device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("tidewater {} vbo", mesh.name)),
                        contents: bytemuck::cast_slice(v),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                )),
                MeshVertices::Dynamic { .. } => GpuVertices::Dynamic,
                MeshVertices::Sprites(v) => GpuVertices::Sprites(device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("tidewater {} sprite vbo", mesh.name)),
                        contents: bytemuck::cast_slice(v),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                )),
            };

            let indices = (!mesh.indices.is_empty()).then(|| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("tidewater {} ibo", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
            });

            log::debug!(
                "uploaded mesh '{}' ({} vertices, {} indices)",
                mesh.name,
                mesh.vertices.len(),
                mesh.indices.len()
            );

            GpuMesh { vertices, indices }
        })
        .collect()
}
