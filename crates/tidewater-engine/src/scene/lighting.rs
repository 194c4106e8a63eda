use glam::{Vec3, Vec4};

use crate::error::{RenderError, RenderResult};
use crate::render::{Light, MAX_LIGHTS};

/// Scene-wide lighting and fog.
///
/// Directional lights are packed before point lights in the pass record.
#[derive(Debug, Clone)]
pub struct Lighting {
    pub ambient: Vec4,
    pub fog_color: Vec4,
    /// Distance at which fog starts.
    pub fog_start: f32,
    /// Distance over which fog reaches full strength.
    pub fog_range: f32,
    directional: Vec<Light>,
    point: Vec<Light>,
}

impl Default for Lighting {
    /// One key light plus three coloured point lights along the x axis.
    fn default() -> Self {
        Self {
            ambient: Vec4::new(0.25, 0.25, 0.35, 1.0),
            fog_color: Vec4::new(0.7, 0.7, 0.7, 1.0),
            fog_start: 5.0,
            fog_range: 150.0,
            directional: vec![Light::directional(
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::splat(0.6),
            )],
            point: vec![
                Light::point(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 1.0, 10.0),
                Light::point(Vec3::new(-4.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 1.0, 10.0),
                Light::point(Vec3::new(4.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 1.0, 10.0),
            ],
        }
    }
}

impl Lighting {
    /// Ambient and fog only.
    pub fn unlit() -> Self {
        Self {
            directional: Vec::new(),
            point: Vec::new(),
            ..Self::default()
        }
    }

    pub fn directional_count(&self) -> usize {
        self.directional.len()
    }

    pub fn point_count(&self) -> usize {
        self.point.len()
    }

    /// Directional lights first, then point lights.
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.directional.iter().chain(self.point.iter())
    }

    pub fn push_directional(&mut self, light: Light) -> RenderResult<()> {
        self.check_capacity()?;
        self.directional.push(light);
        Ok(())
    }

    pub fn push_point(&mut self, light: Light) -> RenderResult<()> {
        self.check_capacity()?;
        self.point.push(light);
        Ok(())
    }

    fn check_capacity(&self) -> RenderResult<()> {
        if self.directional.len() + self.point.len() >= MAX_LIGHTS {
            return Err(RenderError::exhausted(format!(
                "a pass holds at most {MAX_LIGHTS} lights"
            )));
        }
        Ok(())
    }
}
