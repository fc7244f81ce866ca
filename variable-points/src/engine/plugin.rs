use std::collections::HashSet;

use bevy::asset::AssetEvent;
use bevy::prelude::*;
use bevy::render::view::NoFrustumCulling;
use bevy::window::PrimaryWindow;

use super::geometry::PointCloudGeometry;
use super::mesh::create_variable_points_mesh;
use super::picking::{PickCamera, PickStrategy, PointHit, PointRaycaster};
use super::points::{PointGeometry, VariablePoints};
use super::shaders::VariablePointsMaterial;

/// Renders and picks [`VariablePoints`] entities.
pub struct VariablePointsPlugin;

/// Runtime picking configuration.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct PickingSettings {
    /// World units added to each cloud's bounding sphere before per-point
    /// tests. `None` uses the default.
    pub threshold: Option<f32>,
    /// Strategy given to newly spawned clouds by applications that honour it.
    pub default_strategy: PickStrategy,
}

/// Ask for every point under a world-space ray.
#[derive(Event, Debug, Clone, Copy)]
pub struct PointPickRequest {
    pub ray: Ray3d,
}

impl PointPickRequest {
    /// Request for the ray under a cursor position in logical pixels.
    pub fn from_cursor(camera: &Camera, transform: &GlobalTransform, cursor: Vec2) -> Option<Self> {
        camera
            .viewport_to_world(transform, cursor)
            .ok()
            .map(|ray| Self { ray })
    }
}

/// Answer to one [`PointPickRequest`], nearest hit first.
#[derive(Event, Debug, Clone)]
pub struct PointsPicked {
    pub ray: Ray3d,
    pub hits: Vec<PointHit>,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariablePointsSystems {
    Sync,
    Pick,
}

impl Plugin for VariablePointsPlugin {
    fn build(&self, app: &mut App) {
        // A loader plugin for geometry files may have registered the asset already.
        if !app.world().contains_resource::<Assets<PointCloudGeometry>>() {
            app.init_asset::<PointCloudGeometry>();
        }

        app.add_plugins(MaterialPlugin::<VariablePointsMaterial> {
            prepass_enabled: false,
            shadows_enabled: false,
            ..default()
        })
        .register_type::<VariablePoints>()
        .register_type::<PointGeometry>()
        .register_type::<PickingSettings>()
        .init_resource::<PickingSettings>()
        .add_event::<PointPickRequest>()
        .add_event::<PointsPicked>()
        .configure_sets(
            Update,
            (VariablePointsSystems::Sync, VariablePointsSystems::Pick).chain(),
        )
        .add_systems(
            Update,
            (sync_point_meshes, sync_point_materials, track_screen_size)
                .in_set(VariablePointsSystems::Sync),
        )
        .add_systems(Update, pick_points.in_set(VariablePointsSystems::Pick));
    }
}

/// Rebuild the sprite mesh of every cloud whose geometry changed.
pub fn sync_point_meshes(
    mut commands: Commands,
    mut geometry_events: EventReader<AssetEvent<PointCloudGeometry>>,
    geometries: Res<Assets<PointCloudGeometry>>,
    mut meshes: ResMut<Assets<Mesh>>,
    clouds: Query<(Entity, Ref<PointGeometry>), With<VariablePoints>>,
) {
    let mut changed = HashSet::new();
    for event in geometry_events.read() {
        match event {
            AssetEvent::Added { id }
            | AssetEvent::Modified { id }
            | AssetEvent::LoadedWithDependencies { id } => {
                changed.insert(*id);
            }
            _ => {}
        }
    }

    for (entity, geometry_handle) in &clouds {
        let id = geometry_handle.0.id();
        if !geometry_handle.is_changed() && !changed.contains(&id) {
            continue;
        }
        let Some(geometry) = geometries.get(id) else {
            continue;
        };

        let mesh = meshes.add(create_variable_points_mesh(geometry));
        // Sprites are expanded on the GPU, so the CPU-side AABB is too small to cull with.
        commands.entity(entity).insert((Mesh3d(mesh), NoFrustumCulling));
        debug!(
            "Rebuilt variable points mesh for {entity} ({} points)",
            geometry.candidate_indices().len()
        );
    }
}

/// Keep the drawn material in step with the component.
pub fn sync_point_materials(
    mut commands: Commands,
    clouds: Query<
        (
            Entity,
            &VariablePoints,
            Option<&MeshMaterial3d<VariablePointsMaterial>>,
        ),
        Changed<VariablePoints>,
    >,
) {
    for (entity, points, current) in &clouds {
        if current.is_some_and(|current| current.0 == *points.material()) {
            continue;
        }
        commands
            .entity(entity)
            .insert(MeshMaterial3d(points.material().clone()));
    }
}

/// Match every cloud's screen size to the primary window in physical pixels.
pub fn track_screen_size(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut clouds: Query<&mut VariablePoints>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let size = UVec2::new(window.physical_width(), window.physical_height());
    for mut points in &mut clouds {
        if points.screen_size() != size {
            points.set_screen_size(size.x, size.y);
        }
    }
}

/// Answer pick requests against every visible cloud with loaded geometry.
pub fn pick_points(
    mut requests: EventReader<PointPickRequest>,
    mut picked: EventWriter<PointsPicked>,
    settings: Res<PickingSettings>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    clouds: Query<(
        Entity,
        &VariablePoints,
        &PointGeometry,
        &GlobalTransform,
        &InheritedVisibility,
    )>,
    geometries: Res<Assets<PointCloudGeometry>>,
) {
    if requests.is_empty() {
        return;
    }
    let camera = cameras
        .iter()
        .find(|(camera, _)| camera.is_active)
        .map(|(camera, transform)| PickCamera::from_camera(camera, transform));

    for request in requests.read() {
        let mut raycaster = PointRaycaster::new(request.ray);
        raycaster.camera = camera;
        raycaster.threshold = settings.threshold;

        let instances = clouds
            .iter()
            .filter(|(.., visibility)| visibility.get())
            .filter_map(|(entity, points, geometry, transform, _)| {
                let geometry = geometries.get(&geometry.0)?;
                Some((entity, points, geometry, transform.compute_matrix()))
            });
        let hits = raycaster.intersect_points(instances);

        picked.write(PointsPicked {
            ray: request.ray,
            hits,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_cloud(geometry: PointCloudGeometry) -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<PointCloudGeometry>()
            .init_asset::<Mesh>()
            .init_asset::<VariablePointsMaterial>()
            .init_resource::<PickingSettings>()
            .add_event::<PointPickRequest>()
            .add_event::<PointsPicked>()
            .add_systems(
                Update,
                (sync_point_meshes, sync_point_materials, pick_points).chain(),
            );

        let geometry = app
            .world_mut()
            .resource_mut::<Assets<PointCloudGeometry>>()
            .add(geometry);
        let material = app
            .world_mut()
            .resource_mut::<Assets<VariablePointsMaterial>>()
            .add(VariablePointsMaterial::default());
        let cloud = app
            .world_mut()
            .spawn((
                VariablePoints::new(material, 800, 600),
                PointGeometry(geometry),
                GlobalTransform::IDENTITY,
                InheritedVisibility::VISIBLE,
            ))
            .id();
        (app, cloud)
    }

    fn single_point() -> PointCloudGeometry {
        PointCloudGeometry::new(vec![[0.0, 0.0, -10.0]], vec![20.0], vec![[1.0, 1.0, 1.0]])
    }

    #[test]
    fn mesh_and_material_are_attached() {
        let (mut app, cloud) = app_with_cloud(single_point());
        app.update();

        let entity = app.world().entity(cloud);
        assert!(entity.contains::<Mesh3d>());
        assert!(entity.contains::<NoFrustumCulling>());
        assert!(entity.contains::<MeshMaterial3d<VariablePointsMaterial>>());
    }

    #[test]
    fn request_without_camera_returns_no_hits() {
        let (mut app, _) = app_with_cloud(single_point());
        app.world_mut().send_event(PointPickRequest {
            ray: Ray3d {
                origin: Vec3::ZERO,
                direction: Dir3::NEG_Z,
            },
        });
        app.update();

        let events = app.world().resource::<Events<PointsPicked>>();
        let answers: Vec<_> = events.iter_current_update_events().collect();
        assert_eq!(answers.len(), 1);
        assert!(answers[0].hits.is_empty());
    }
}
