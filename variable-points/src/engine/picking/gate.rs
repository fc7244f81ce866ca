use bevy::math::bounding::{BoundingSphere, RayCast3d};
use bevy::prelude::*;
use constants::picking::MAX_PICK_DISTANCE;

/// Cheap rejection test run before any per-point work.
///
/// The local-space sphere is moved into world space (centre transformed,
/// radius scaled by the largest axis scale) and inflated by `threshold`. A
/// `false` answer means no point of the cloud can be hit as long as every
/// disk's world-space radius stays within `threshold`.
pub fn may_intersect(
    ray: Ray3d,
    bounding_sphere: &BoundingSphere,
    world_from_local: &Mat4,
    threshold: f32,
) -> bool {
    let centre = world_from_local.transform_point3(bounding_sphere.center.into());
    let radius = bounding_sphere.radius() * max_scale_on_axis(world_from_local) + threshold;

    RayCast3d::from_ray(ray, MAX_PICK_DISTANCE)
        .sphere_intersection_at(&BoundingSphere::new(centre, radius))
        .is_some()
}

/// Largest length among the transform's basis vectors.
pub fn max_scale_on_axis(matrix: &Mat4) -> f32 {
    matrix
        .x_axis
        .truncate()
        .length_squared()
        .max(matrix.y_axis.truncate().length_squared())
        .max(matrix.z_axis.truncate().length_squared())
        .sqrt()
}
