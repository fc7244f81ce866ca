use bevy::prelude::*;

use super::geometry::PointCloudGeometry;
use super::picking::{PickFrame, PickStrategy, PointHit, PointRaycaster, may_intersect, scan_points};
use super::shaders::VariablePointsMaterial;
use crate::error::PickError;

/// A point cloud drawn as screen-space disks whose diameter comes from the
/// per-point size attribute.
///
/// The screen size must match the target the camera renders to, in physical
/// pixels. Picking fails until it is set.
#[derive(Component, Debug, Clone, Reflect)]
#[require(Transform, Visibility)]
pub struct VariablePoints {
    material: Handle<VariablePointsMaterial>,
    width: u32,
    height: u32,
    strategy: PickStrategy,
}

/// Geometry drawn and picked by a [`VariablePoints`] entity.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Reflect)]
pub struct PointGeometry(pub Handle<PointCloudGeometry>);

impl VariablePoints {
    pub fn new(material: Handle<VariablePointsMaterial>, width: u32, height: u32) -> Self {
        Self {
            material,
            width,
            height,
            strategy: PickStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: PickStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn material(&self) -> &Handle<VariablePointsMaterial> {
        &self.material
    }

    pub fn strategy(&self) -> PickStrategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: PickStrategy) {
        self.strategy = strategy;
    }

    pub fn screen_size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Take over another renderer's material, screen size and strategy.
    /// Geometry and transform live on separate components and are untouched.
    pub fn copy_from(&mut self, source: &Self) -> &mut Self {
        self.material = source.material.clone();
        self.width = source.width;
        self.height = source.height;
        self.strategy = source.strategy;
        self
    }

    /// Append every point of `geometry` under the ray to `hits`, in candidate
    /// order.
    ///
    /// Panics if the geometry's index buffer references a point outside its
    /// attribute buffers.
    pub fn try_raycast(
        &self,
        object: Entity,
        geometry: &PointCloudGeometry,
        world_from_local: Mat4,
        raycaster: &PointRaycaster,
        hits: &mut Vec<PointHit>,
    ) -> Result<(), PickError> {
        let camera = raycaster.camera.ok_or(PickError::MissingCamera)?;
        if self.width == 0 || self.height == 0 {
            return Err(PickError::MissingScreenSize {
                width: self.width,
                height: self.height,
            });
        }

        let Some(sphere) = geometry.bounding_sphere() else {
            return Ok(());
        };
        if !may_intersect(
            raycaster.ray,
            sphere,
            &world_from_local,
            raycaster.effective_threshold(),
        ) {
            return Ok(());
        }

        let frame = PickFrame::new(&camera, world_from_local, self.width, self.height);
        scan_points(self.strategy, &frame, raycaster.ray, geometry, object, hits);
        Ok(())
    }

    /// [`Self::try_raycast`], logging failures instead of returning them.
    pub fn raycast(
        &self,
        object: Entity,
        geometry: &PointCloudGeometry,
        world_from_local: Mat4,
        raycaster: &PointRaycaster,
        hits: &mut Vec<PointHit>,
    ) {
        if let Err(err) = self.try_raycast(object, geometry, world_from_local, raycaster, hits) {
            error!("VariablePoints: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::picking::PickCamera;

    fn cloud() -> PointCloudGeometry {
        PointCloudGeometry::new(vec![[0.0, 0.0, -10.0]], vec![20.0], vec![[1.0, 0.0, 0.0]])
    }

    fn raycaster() -> PointRaycaster {
        PointRaycaster::new(Ray3d {
            origin: Vec3::ZERO,
            direction: Dir3::NEG_Z,
        })
    }

    #[test]
    fn copy_takes_material_size_and_strategy() {
        let mut assets = Assets::<VariablePointsMaterial>::default();
        let source_material = assets.add(VariablePointsMaterial::default());
        let source = VariablePoints::new(source_material.clone(), 1024, 768)
            .with_strategy(PickStrategy::UnprojectedBox);

        let mut target = VariablePoints::new(Handle::default(), 800, 600);
        target.copy_from(&source);

        assert_eq!(target.material(), &source_material);
        assert_eq!(target.screen_size(), UVec2::new(1024, 768));
        assert_eq!(target.strategy(), PickStrategy::UnprojectedBox);
    }

    #[test]
    fn missing_camera_is_an_error() {
        let points = VariablePoints::new(Handle::default(), 800, 600);
        let mut hits = Vec::new();
        let result = points.try_raycast(
            Entity::PLACEHOLDER,
            &cloud(),
            Mat4::IDENTITY,
            &raycaster(),
            &mut hits,
        );
        assert_eq!(result, Err(PickError::MissingCamera));
        assert!(hits.is_empty());
    }

    #[test]
    fn missing_screen_size_is_an_error() {
        let points = VariablePoints::new(Handle::default(), 0, 600);
        let camera = PickCamera::new(
            Mat4::IDENTITY,
            Mat4::perspective_infinite_reverse_rh(1.0, 1.0, 0.1),
        );
        let mut hits = Vec::new();
        let result = points.try_raycast(
            Entity::PLACEHOLDER,
            &cloud(),
            Mat4::IDENTITY,
            &raycaster().with_camera(camera),
            &mut hits,
        );
        assert_eq!(
            result,
            Err(PickError::MissingScreenSize {
                width: 0,
                height: 600
            })
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_geometry_never_hits() {
        let points = VariablePoints::new(Handle::default(), 800, 600);
        let camera = PickCamera::new(
            Mat4::IDENTITY,
            Mat4::perspective_infinite_reverse_rh(1.0, 1.0, 0.1),
        );
        let mut hits = Vec::new();
        let result = points.try_raycast(
            Entity::PLACEHOLDER,
            &PointCloudGeometry::default(),
            Mat4::IDENTITY,
            &raycaster().with_camera(camera),
            &mut hits,
        );
        assert!(result.is_ok());
        assert!(hits.is_empty());
    }
}
