use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Lit, textured mesh vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub tex_c: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x3, // normal
        2 => Float32x2  // tex_c
    ];

    pub fn new(pos: Vec3, normal: Vec3, tex_c: Vec2) -> Self {
        Self {
            pos: pos.to_array(),
            normal: normal.to_array(),
            tex_c: tex_c.to_array(),
        }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Billboard point: centre and world-space size, expanded to a quad in the vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub pos: [f32; 3],
    pub size: [f32; 2],
}

impl SpriteVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // centre
        1 => Float32x2  // size
    ];

    pub fn new(pos: Vec3, size: Vec2) -> Self {
        Self {
            pos: pos.to_array(),
            size: size.to_array(),
        }
    }

    /// One record per instance; the quad corner comes from `vertex_index`.
    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
