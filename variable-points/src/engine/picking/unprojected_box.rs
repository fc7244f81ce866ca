use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;
use constants::picking::MAX_PICK_DISTANCE;

use super::PickFrame;

/// Unprojected bounding-box test.
///
/// The point's sprite is described in NDC by its centre plus per-axis
/// half-extents of `size / width` and `size / height`. Two opposite corners are
/// unprojected into world space and their per-axis min/max forms an AABB that
/// the ray is tested against. Unprojection does not preserve axis order in
/// general, so under camera roll the box is looser than the sprite.
pub(super) fn test_point(frame: &PickFrame, ray: Ray3d, position: Vec3, size: f32) -> Option<Vec3> {
    let clip = frame.clip_from_local * position.extend(1.0);
    // Behind the camera the divide mirrors the sprite to the wrong side.
    if clip.w <= 0.0 {
        return None;
    }
    let screen_position = clip.truncate() / clip.w;

    let extents = Vec3::new(size / frame.screen_width, size / frame.screen_height, 0.0);
    let a = frame.world_from_clip.project_point3(screen_position + extents);
    let b = frame.world_from_clip.project_point3(screen_position - extents);

    let aabb = Aabb3d {
        min: a.min(b).into(),
        max: a.max(b).into(),
    };
    let distance = RayCast3d::from_ray(ray, MAX_PICK_DISTANCE).aabb_intersection_at(&aabb)?;
    Some(ray.get_point(distance))
}
