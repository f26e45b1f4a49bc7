use flagline_scene::CameraPose;
use glam::{Mat4, Vec3};

/// Fixed perspective camera framing the flag line.
///
/// The pose never changes at runtime; only the aspect ratio reacts to
/// window resizes.
pub struct SceneCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl SceneCamera {
    pub fn from_pose(pose: &CameraPose, width: u32, height: u32) -> Self {
        Self {
            eye: pose.eye,
            target: pose.target,
            fov: pose.fov_degrees.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            near: pose.near,
            far: pose.far,
        }
    }

    /// Update the aspect ratio after a window resize.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::from_pose(&CameraPose::default(), 16, 9)
    }
}
