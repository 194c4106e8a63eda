use glam::{Mat4, Vec2};

use crate::scene::MaterialHandle;

/// Scrolls a material's texture transform at a constant rate.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureScroll {
    pub material: MaterialHandle,
    /// Texture units per second.
    pub velocity: Vec2,
    offset: Vec2,
}

impl TextureScroll {
    pub fn new(material: MaterialHandle, velocity: Vec2) -> Self {
        Self {
            material,
            velocity,
            offset: Vec2::ZERO,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Advances by `dt` and returns the new transform, or `None` when nothing moved.
    pub fn advance(&mut self, dt: f32) -> Option<Mat4> {
        let step = self.velocity * dt;
        if step == Vec2::ZERO || !step.is_finite() {
            return None;
        }

        // Wrap into [0, 1).
        let moved = self.offset + step;
        self.offset = moved - moved.floor();

        Some(Mat4::from_translation(self.offset.extend(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Scene};

    fn handle() -> MaterialHandle {
        let mut s = Scene::new(1).unwrap();
        s.materials_mut().insert(Material::new("water", 0)).unwrap()
    }

    #[test]
    fn scroll_wraps_into_unit_range() {
        let mut s = TextureScroll::new(handle(), Vec2::new(0.5, -0.25));
        s.advance(1.0).unwrap();
        assert_eq!(s.offset(), Vec2::new(0.5, 0.75));

        let m = s.advance(1.0).unwrap();
        assert_eq!(s.offset(), Vec2::new(0.0, 0.5));
        assert_eq!(m.w_axis.truncate(), glam::Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn still_scroll_reports_nothing() {
        let mut s = TextureScroll::new(handle(), Vec2::ZERO);
        assert!(s.advance(0.016).is_none());

        let mut s = TextureScroll::new(handle(), Vec2::new(0.1, 0.02));
        assert!(s.advance(0.0).is_none());
    }
}
