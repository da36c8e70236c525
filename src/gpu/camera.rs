//! Fixed perspective camera looking at the sculpture.

use glam::{Mat4, Vec3};

/// Perspective camera on the +z axis looking at the origin.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Camera position in world units.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 15.0),
            target: Vec3::ZERO,
            fov_y: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Combined projection and view for a surface of the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y.to_radians(), aspect, self.near, self.far);
        proj * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
