//! GPU-visible uniform records.
//!
//! Layouts mirror the structs in `shaders/scene.wgsl`. Matrices are stored column-major
//! (`Mat4::to_cols_array_2d`), which is what WGSL `mat4x4<f32>` expects.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::scene::{Camera, Lighting, Material};

/// Maximum number of lights in a pass.
pub const MAX_LIGHTS: usize = 16;

// ── light ─────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub strength: [f32; 3],
    /// Point/spot only.
    pub falloff_start: f32,
    /// Directional/spot only.
    pub direction: [f32; 3],
    /// Point/spot only.
    pub falloff_end: f32,
    /// Point/spot only.
    pub position: [f32; 3],
    /// Spot only.
    pub spot_power: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            strength: [0.5; 3],
            falloff_start: 1.0,
            direction: [0.0, -1.0, 0.0],
            falloff_end: 10.0,
            position: [0.0; 3],
            spot_power: 64.0,
        }
    }
}

impl Light {
    pub fn directional(direction: Vec3, strength: Vec3) -> Self {
        Self {
            direction: direction.normalize_or(Vec3::NEG_Y).to_array(),
            strength: strength.to_array(),
            ..Self::default()
        }
    }

    pub fn point(position: Vec3, strength: Vec3, falloff_start: f32, falloff_end: f32) -> Self {
        Self {
            position: position.to_array(),
            strength: strength.to_array(),
            falloff_start,
            falloff_end,
            ..Self::default()
        }
    }
}

// ── per-object ────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: [[f32; 4]; 4],
    pub tex_transform: [[f32; 4]; 4],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl ObjectConstants {
    pub fn new(world: Mat4, tex_transform: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            tex_transform: tex_transform.to_cols_array_2d(),
        }
    }
}

// ── per-material ──────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub diffuse_albedo: [f32; 4],
    pub fresnel_r0: [f32; 3],
    pub roughness: f32,
    pub transform: [[f32; 4]; 4],
}

impl MaterialConstants {
    pub fn from_material(m: &Material) -> Self {
        Self {
            diffuse_albedo: m.diffuse_albedo.to_array(),
            fresnel_r0: m.fresnel_r0.to_array(),
            roughness: m.roughness,
            transform: m.transform.to_cols_array_2d(),
        }
    }
}

// ── per-pass ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    pub view: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub eye_pos: [f32; 3],
    pub _pad0: f32,
    pub render_target_size: [f32; 2],
    pub inv_render_target_size: [f32; 2],
    pub near_z: f32,
    pub far_z: f32,
    pub total_time: f32,
    pub delta_time: f32,
    pub ambient_light: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_start: f32,
    pub fog_range: f32,
    pub directional_count: u32,
    pub point_count: u32,
    pub lights: [Light; MAX_LIGHTS],
}

/// Timing fields copied into the pass record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassTiming {
    pub total: f32,
    pub delta: f32,
}

impl PassConstants {
    /// Recomputes every camera-derived matrix and copies lighting and timing.
    ///
    /// `render_target` is in physical pixels; zero extents are clamped to 1.
    pub fn build(
        camera: &Camera,
        lighting: &Lighting,
        render_target: Vec2,
        timing: PassTiming,
    ) -> Self {
        let rt = render_target.max(Vec2::ONE);

        let view = camera.view();
        let proj = camera.proj(rt.x / rt.y);
        let view_proj = proj * view;

        let mut lights = [Light::zeroed(); MAX_LIGHTS];
        for (dst, src) in lights.iter_mut().zip(lighting.lights()) {
            *dst = *src;
        }

        Self {
            view: view.to_cols_array_2d(),
            inv_view: view.inverse().to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            inv_proj: proj.inverse().to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            eye_pos: camera.eye.to_array(),
            _pad0: 0.0,
            render_target_size: rt.to_array(),
            inv_render_target_size: rt.recip().to_array(),
            near_z: camera.near,
            far_z: camera.far,
            total_time: timing.total,
            delta_time: timing.delta,
            ambient_light: lighting.ambient.to_array(),
            fog_color: lighting.fog_color.to_array(),
            fog_start: lighting.fog_start,
            fog_range: lighting.fog_range,
            directional_count: lighting.directional_count() as u32,
            point_count: lighting.point_count() as u32,
            lights,
        }
    }

    pub fn view_proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }

    pub fn ambient(&self) -> Vec4 {
        Vec4::from_array(self.ambient_light)
    }
}
