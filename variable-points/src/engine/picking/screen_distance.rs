use bevy::prelude::*;

use super::PickFrame;

/// Plane + screen-distance test.
///
/// The disk is modelled as lying on a plane through the point's world position
/// that faces the camera. The ray is intersected with that plane and the hit is
/// projected back to NDC, where its offset from the projected point is scaled
/// by the squared screen dimensions and compared against `size²`.
///
/// An NDC delta multiplied by the screen size is twice the pixel delta, so
/// `size²` bounds a pixel radius of `size / 2`, the radius of the drawn disk.
pub(super) fn test_point(frame: &PickFrame, ray: Ray3d, position: Vec3, size: f32) -> Option<Vec3> {
    let screen_position = frame.clip_from_local.project_point3(position);
    let world_position = frame.world_from_local.transform_point3(position);

    let normal = Dir3::new(frame.facing).ok()?;
    let distance = ray.intersect_plane(world_position, InfinitePlane3d { normal })?;
    let plane_hit = ray.get_point(distance);

    let offset = frame.clip_from_world.project_point3(plane_hit) - screen_position;
    let pixel_dist_sq = offset.x * offset.x * frame.screen_width_sq()
        + offset.y * offset.y * frame.screen_height_sq();

    (pixel_dist_sq <= size * size).then_some(plane_hit)
}
