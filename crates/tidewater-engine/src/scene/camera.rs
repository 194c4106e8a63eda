use glam::{Mat4, Vec3};

/// Left-handed perspective camera (+z forward, depth 0..1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view (radians).
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::orbit(1.5 * std::f32::consts::PI, 0.2 * std::f32::consts::PI, 80.0, Vec3::ZERO)
    }
}

impl Camera {
    /// Places the eye on a sphere around `target`.
    ///
    /// `theta` is the azimuth in the xz-plane, `phi` the angle from +y.
    pub fn orbit(theta: f32, phi: f32, radius: f32, target: Vec3) -> Self {
        let phi = phi.clamp(0.1, std::f32::consts::PI - 0.1);
        let eye = target
            + radius * Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());

        Self {
            eye,
            target,
            up: Vec3::Y,
            fov_y: 0.25 * std::f32::consts::PI,
            near: 1.0,
            far: 1000.0,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye, self.target, self.up)
    }

    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_keeps_radius() {
        let c = Camera::orbit(0.3, 1.0, 25.0, Vec3::new(1.0, 2.0, 3.0));
        assert!(((c.eye - c.target).length() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn target_is_in_front_of_eye() {
        let c = Camera::default();
        let p = c.view().transform_point3(c.target);
        assert!(p.z > 0.0);
        assert!(p.x.abs() < 1e-3 && p.y.abs() < 1e-3);
    }
}
