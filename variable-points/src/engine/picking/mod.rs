//! Screen-space picking for variable point clouds.
//!
//! A pick runs per renderer instance:
//!
//! 1. validate the request (camera present, screen size known);
//! 2. reject the ray early with the bounding volume gate;
//! 3. visit candidate points (index buffer order, else buffer order) and run
//!    the instance's [`PickStrategy`] on each;
//! 4. append a [`PointHit`] for every accepted point.
//!
//! Matrices are gathered once per call into a stack-local [`PickFrame`], so
//! concurrent picks never share scratch state.

/// Camera matrices detached from the ECS.
pub mod camera;

/// Bounding-sphere rejection test.
pub mod gate;

mod screen_distance;
mod unprojected_box;

use bevy::prelude::*;
use constants::picking::DEFAULT_PICK_THRESHOLD;
use serde::{Deserialize, Serialize};

use super::geometry::PointCloudGeometry;
use super::points::VariablePoints;
pub use camera::PickCamera;
pub use gate::may_intersect;

/// Per-point intersection test used by a renderer instance.
///
/// The two tests disagree near disk boundaries and agree for rays through the
/// exact centre of a point's projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum PickStrategy {
    /// Camera-facing plane through the point, hit measured in screen pixels.
    #[default]
    ScreenDistance,
    /// Sprite corners unprojected into a world-space box.
    UnprojectedBox,
}

impl PickStrategy {
    /// World-space hit point of `ray` on the disk of a point at local
    /// `position` with pixel diameter `size`, if any.
    pub fn test_point(self, frame: &PickFrame, ray: Ray3d, position: Vec3, size: f32) -> Option<Vec3> {
        // A zero-size disk is neither drawn nor pickable.
        if size <= 0.0 {
            return None;
        }
        match self {
            Self::ScreenDistance => screen_distance::test_point(frame, ray, position, size),
            Self::UnprojectedBox => unprojected_box::test_point(frame, ray, position, size),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::ScreenDistance => Self::UnprojectedBox,
            Self::UnprojectedBox => Self::ScreenDistance,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ScreenDistance => "screen distance",
            Self::UnprojectedBox => "unprojected box",
        }
    }
}

/// Matrices and screen constants shared by every point test of one pick call.
#[derive(Debug, Clone, Copy)]
pub struct PickFrame {
    pub world_from_local: Mat4,
    pub clip_from_world: Mat4,
    pub clip_from_local: Mat4,
    pub world_from_clip: Mat4,
    /// Negated camera forward: the normal of every disk plane.
    pub facing: Vec3,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl PickFrame {
    pub fn new(camera: &PickCamera, world_from_local: Mat4, width: u32, height: u32) -> Self {
        let clip_from_world = camera.clip_from_world();
        Self {
            world_from_local,
            clip_from_world,
            clip_from_local: clip_from_world * world_from_local,
            world_from_clip: clip_from_world.inverse(),
            facing: -camera.forward(),
            screen_width: width as f32,
            screen_height: height as f32,
        }
    }

    pub fn screen_width_sq(&self) -> f32 {
        self.screen_width * self.screen_width
    }

    pub fn screen_height_sq(&self) -> f32 {
        self.screen_height * self.screen_height
    }
}

/// One picked point.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PointHit {
    /// World units from the ray origin to `point`.
    pub distance: f32,
    /// World-space intersection.
    pub point: Vec3,
    /// Index into the geometry's attribute buffers.
    pub index: u32,
    /// Renderer instance the point belongs to.
    pub object: Entity,
}

/// Order hits nearest first.
pub fn sort_hits(hits: &mut [PointHit]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

/// Run the strategy over every candidate point, appending accepted points.
pub(crate) fn scan_points(
    strategy: PickStrategy,
    frame: &PickFrame,
    ray: Ray3d,
    geometry: &PointCloudGeometry,
    object: Entity,
    hits: &mut Vec<PointHit>,
) {
    for index in geometry.candidate_indices() {
        let position = geometry.position(index);
        let size = geometry.size(index);
        if let Some(point) = strategy.test_point(frame, ray, position, size) {
            hits.push(PointHit {
                distance: ray.origin.distance(point),
                point,
                index,
                object,
            });
        }
    }
}

/// A world-space pick request: the ray, the camera it was cast from and the
/// gate tolerance.
#[derive(Debug, Clone, Copy)]
pub struct PointRaycaster {
    pub ray: Ray3d,
    pub camera: Option<PickCamera>,
    /// World units added to each cloud's bounding sphere. Unset or
    /// non-positive values fall back to [`DEFAULT_PICK_THRESHOLD`].
    pub threshold: Option<f32>,
}

impl PointRaycaster {
    pub fn new(ray: Ray3d) -> Self {
        Self {
            ray,
            camera: None,
            threshold: None,
        }
    }

    pub fn with_camera(mut self, camera: PickCamera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn effective_threshold(&self) -> f32 {
        self.threshold
            .filter(|threshold| *threshold > 0.0)
            .unwrap_or(DEFAULT_PICK_THRESHOLD)
    }

    /// Pick across several renderer instances and return every hit, nearest
    /// first. Instances that are misconfigured are logged and skipped.
    pub fn intersect_points<'a>(
        &self,
        instances: impl IntoIterator<Item = (Entity, &'a VariablePoints, &'a PointCloudGeometry, Mat4)>,
    ) -> Vec<PointHit> {
        let mut hits = Vec::new();
        for (entity, points, geometry, world_from_local) in instances {
            points.raycast(entity, geometry, world_from_local, self, &mut hits);
        }
        sort_hits(&mut hits);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::shaders::VariablePointsMaterial;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;
    use std::f32::consts::FRAC_PI_4;

    const WIDTH: u32 = 800;
    const HEIGHT: u32 = 600;

    fn projection() -> Mat4 {
        Mat4::perspective_infinite_reverse_rh(FRAC_PI_4, WIDTH as f32 / HEIGHT as f32, 0.1)
    }

    fn camera_at(world_from_view: Mat4) -> PickCamera {
        PickCamera::new(world_from_view, projection())
    }

    fn ray_towards(origin: Vec3, target: Vec3) -> Ray3d {
        Ray3d {
            origin,
            direction: Dir3::new(target - origin).unwrap(),
        }
    }

    fn renderer(strategy: PickStrategy) -> VariablePoints {
        VariablePoints::new(Handle::<VariablePointsMaterial>::default(), WIDTH, HEIGHT)
            .with_strategy(strategy)
    }

    fn ungated_hits(
        strategy: PickStrategy,
        camera: &PickCamera,
        ray: Ray3d,
        geometry: &PointCloudGeometry,
    ) -> Vec<PointHit> {
        let frame = PickFrame::new(camera, Mat4::IDENTITY, WIDTH, HEIGHT);
        let mut hits = Vec::new();
        scan_points(strategy, &frame, ray, geometry, Entity::PLACEHOLDER, &mut hits);
        hits
    }

    #[test]
    fn zero_size_is_never_hit() {
        let camera = camera_at(Mat4::IDENTITY);
        let geometry = PointCloudGeometry::new(
            vec![[0.0, 0.0, -10.0]],
            vec![0.0],
            vec![[1.0, 1.0, 1.0]],
        );
        let ray = ray_towards(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        for strategy in [PickStrategy::ScreenDistance, PickStrategy::UnprojectedBox] {
            assert!(ungated_hits(strategy, &camera, ray, &geometry).is_empty());
        }
    }

    #[test]
    fn screen_distance_pick_radius_matches_drawn_disk() {
        // At depth 10 with a 45° vertical fov, one pixel spans
        // 2 * 10 * tan(22.5°) / 600 world units.
        let pixel = 2.0 * 10.0 * (FRAC_PI_4 / 2.0).tan() / HEIGHT as f32;
        let camera = camera_at(Mat4::IDENTITY);
        let geometry = PointCloudGeometry::new(
            vec![[0.0, 0.0, -10.0]],
            vec![20.0],
            vec![[1.0, 1.0, 1.0]],
        );

        let inside = ray_towards(Vec3::ZERO, Vec3::new(0.0, 9.0 * pixel, -10.0));
        let outside = ray_towards(Vec3::ZERO, Vec3::new(0.0, 11.0 * pixel, -10.0));
        assert_eq!(
            ungated_hits(PickStrategy::ScreenDistance, &camera, inside, &geometry).len(),
            1
        );
        assert!(ungated_hits(PickStrategy::ScreenDistance, &camera, outside, &geometry).is_empty());
    }

    #[test]
    fn unprojected_box_ignores_points_behind_camera() {
        let camera = camera_at(Mat4::IDENTITY);
        let geometry = PointCloudGeometry::new(
            vec![[0.0, 0.0, 10.0]],
            vec![50.0],
            vec![[1.0, 1.0, 1.0]],
        );
        let ray = ray_towards(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(ungated_hits(PickStrategy::UnprojectedBox, &camera, ray, &geometry).is_empty());
    }

    #[test]
    fn strategies_agree_through_exact_centre() {
        let world_from_view = Transform::from_xyz(3.0, 4.0, 12.0)
            .looking_at(Vec3::new(1.0, -1.0, -2.0), Vec3::Y)
            .compute_matrix();
        let camera = camera_at(world_from_view);
        let target = Vec3::new(1.0, -1.0, -2.0);
        let geometry = PointCloudGeometry::new(vec![target.to_array()], vec![12.0], vec![[0.0; 3]]);
        let ray = ray_towards(Vec3::new(3.0, 4.0, 12.0), target);

        let a = ungated_hits(PickStrategy::ScreenDistance, &camera, ray, &geometry);
        let b = ungated_hits(PickStrategy::UnprojectedBox, &camera, ray, &geometry);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);

        let expected = Vec3::new(3.0, 4.0, 12.0).distance(target);
        assert!((a[0].distance - expected).abs() < 1e-3);
        // The box is axis aligned, so for an oblique camera its near face sits
        // in front of the disk plane.
        assert!(b[0].distance <= a[0].distance + 1e-3);
        assert!(expected - b[0].distance < 0.15);
    }

    #[test]
    fn gate_never_rejects_a_hittable_ray() {
        let mut rng = StdRng::seed_from_u64(7);
        let threshold = DEFAULT_PICK_THRESHOLD;

        for _ in 0..200 {
            let eye = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(5.0..15.0),
            );
            let camera = camera_at(
                Transform::from_translation(eye)
                    .looking_at(Vec3::ZERO, Vec3::Y)
                    .compute_matrix(),
            );

            let count = rng.gen_range(1..20);
            let positions: Vec<[f32; 3]> = (0..count)
                .map(|_| {
                    [
                        rng.gen_range(-3.0..3.0),
                        rng.gen_range(-3.0..3.0),
                        rng.gen_range(-3.0..3.0),
                    ]
                })
                .collect();
            // Small enough that every disk's world radius stays under the threshold.
            let sizes: Vec<f32> = (0..count).map(|_| rng.gen_range(0.0..8.0)).collect();
            let geometry = PointCloudGeometry::new(positions, sizes, vec![[1.0; 3]; count]);

            let aim = Vec3::new(
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-6.0..6.0),
                rng.gen_range(-6.0..6.0),
            );
            let ray = ray_towards(eye, aim);
            let sphere = geometry.bounding_sphere().unwrap();

            if !may_intersect(ray, sphere, &Mat4::IDENTITY, threshold) {
                for strategy in [PickStrategy::ScreenDistance, PickStrategy::UnprojectedBox] {
                    assert!(ungated_hits(strategy, &camera, ray, &geometry).is_empty());
                }
            }
        }
    }

    #[test]
    fn index_order_changes_order_not_set() {
        let camera = camera_at(Mat4::IDENTITY);
        let positions = vec![
            [0.0, 0.0, -10.0],
            [0.0, 0.0, -12.0],
            [0.0, 0.0, -14.0],
            [5.0, 5.0, -10.0],
        ];
        let sizes = vec![20.0; 4];
        let colours = vec![[1.0; 3]; 4];
        let ray = ray_towards(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let raycaster = PointRaycaster::new(ray).with_camera(camera);

        let forward = PointCloudGeometry::new(positions.clone(), sizes.clone(), colours.clone())
            .with_index(vec![0, 1, 2, 3]);
        let reversed = PointCloudGeometry::new(positions, sizes, colours).with_index(vec![3, 2, 1, 0]);

        for strategy in [PickStrategy::ScreenDistance, PickStrategy::UnprojectedBox] {
            let points = renderer(strategy);
            let mut a = Vec::new();
            let mut b = Vec::new();
            points.raycast(Entity::PLACEHOLDER, &forward, Mat4::IDENTITY, &raycaster, &mut a);
            points.raycast(Entity::PLACEHOLDER, &reversed, Mat4::IDENTITY, &raycaster, &mut b);

            assert_eq!(a.iter().map(|h| h.index).collect::<Vec<_>>(), vec![0, 1, 2]);
            assert_eq!(b.iter().map(|h| h.index).collect::<Vec<_>>(), vec![2, 1, 0]);
            let set_a: BTreeSet<u32> = a.iter().map(|h| h.index).collect();
            let set_b: BTreeSet<u32> = b.iter().map(|h| h.index).collect();
            assert_eq!(set_a, set_b);
        }
    }

    #[test]
    fn threshold_falls_back_when_unset_or_non_positive() {
        let ray = ray_towards(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(PointRaycaster::new(ray).effective_threshold(), DEFAULT_PICK_THRESHOLD);
        assert_eq!(
            PointRaycaster::new(ray).with_threshold(0.0).effective_threshold(),
            DEFAULT_PICK_THRESHOLD
        );
        assert_eq!(PointRaycaster::new(ray).with_threshold(2.5).effective_threshold(), 2.5);
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let mut hits: Vec<PointHit> = [3.0, 1.0, 2.0]
            .into_iter()
            .enumerate()
            .map(|(i, distance)| PointHit {
                distance,
                point: Vec3::ZERO,
                index: i as u32,
                object: Entity::PLACEHOLDER,
            })
            .collect();
        sort_hits(&mut hits);
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![1, 2, 0]);
    }
}
