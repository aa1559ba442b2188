//! Fixed-eye camera with a music-driven roll about the view axis.

use glam::{Mat4, Vec3};

use crate::params::RenderConfig;

/// The camera never translates: it sits on +Z looking at the ring center,
/// and the only animated degree of freedom is the roll the director eases
/// toward the loudness-derived target.
pub struct CameraRig {
    eye: Vec3,
    roll: f32,
}

impl CameraRig {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, config.camera_z),
            roll: 0.0,
        }
    }

    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll;
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Assemble the view-projection matrix for rendering.
    pub fn view_proj(&self, config: &RenderConfig) -> Mat4 {
        // Rolling the camera by θ shows the world rotated by -θ
        let view = Mat4::from_rotation_z(-self.roll) * Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(
            config.fov_degrees.to_radians(),
            config.aspect_ratio(),
            config.near_plane,
            config.far_plane,
        );
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_proj_matrix_is_well_formed() {
        let config = RenderConfig::default();
        let rig = CameraRig::new(&config);
        let view_proj = rig.view_proj(&config);

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(rig.eye().z > 0.0);
    }

    #[test]
    fn test_roll_changes_the_view() {
        let config = RenderConfig::default();
        let mut rig = CameraRig::new(&config);
        let level = rig.view_proj(&config);

        rig.set_roll(0.5);
        assert_ne!(rig.view_proj(&config), level);
    }

    #[test]
    fn test_ring_center_projects_to_screen_center() {
        let config = RenderConfig::default();
        let rig = CameraRig::new(&config);
        let clip = rig.view_proj(&config) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);

        // The look-at target stays centered regardless of roll
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
