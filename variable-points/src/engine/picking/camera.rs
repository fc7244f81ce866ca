use bevy::prelude::*;

/// Camera matrices the picker needs, detached from the ECS so picks can be
/// computed off the main schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickCamera {
    world_from_view: Mat4,
    clip_from_view: Mat4,
}

impl PickCamera {
    pub fn new(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_view,
            clip_from_view,
        }
    }

    pub fn from_camera(camera: &Camera, transform: &GlobalTransform) -> Self {
        Self::new(transform.compute_matrix(), camera.clip_from_view())
    }

    /// Inverse of the camera world matrix.
    pub fn view_from_world(&self) -> Mat4 {
        self.world_from_view.inverse()
    }

    pub fn clip_from_world(&self) -> Mat4 {
        self.clip_from_view * self.view_from_world()
    }

    /// World-space viewing direction (the camera's local -Z).
    pub fn forward(&self) -> Vec3 {
        (-self.world_from_view.z_axis.truncate()).normalize_or_zero()
    }
}
