use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::render_settings::{
    DEMO_CLOUD_EXTENT, DEMO_CLOUD_PATH, DEMO_MAX_POINT_SIZE, DEMO_MIN_POINT_SIZE,
    DEMO_POINT_COUNT, DEMO_RANDOM_SEED,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use variable_points::prelude::*;

use crate::engine::camera::ViewportCamera;
use crate::engine::core::app_state::AppState;

#[derive(Resource, Default)]
pub struct CloudLoader {
    handle: Option<Handle<PointCloudGeometry>>,
}

/// The cloud entity once spawned.
#[derive(Resource)]
pub struct DemoCloud {
    pub entity: Entity,
    pub geometry: Handle<PointCloudGeometry>,
}

pub fn start_loading(mut cloud_loader: ResMut<CloudLoader>, asset_server: Res<AssetServer>) {
    info!("Loading point cloud from {DEMO_CLOUD_PATH}");
    cloud_loader.handle = Some(asset_server.load(DEMO_CLOUD_PATH));
}

/// Spawn the cloud once its file has loaded, or a generated one if it failed.
pub fn spawn_cloud_when_ready(
    mut commands: Commands,
    cloud_loader: Res<CloudLoader>,
    asset_server: Res<AssetServer>,
    mut geometries: ResMut<Assets<PointCloudGeometry>>,
    mut materials: ResMut<Assets<VariablePointsMaterial>>,
    settings: Res<PickingSettings>,
    windows: Query<&Window>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = cloud_loader.handle.as_ref() else {
        return;
    };

    let loaded = match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => geometries
            .get(handle)
            .map(|geometry| geometry.validate().map_err(|err| err.to_string())),
        Some(LoadState::Failed(err)) => Some(Err(err.to_string())),
        _ => None,
    };
    let Some(loaded) = loaded else {
        return;
    };

    let geometry = match loaded {
        Ok(()) => handle.clone(),
        Err(reason) => {
            warn!("Falling back to a generated cloud: {reason}");
            geometries.add(random_cloud(DEMO_RANDOM_SEED, DEMO_POINT_COUNT))
        }
    };

    let camera = geometries
        .get(&geometry)
        .and_then(PointCloudGeometry::bounding_sphere)
        .map(ViewportCamera::framing)
        .unwrap_or_default();
    commands.insert_resource(camera);

    let (width, height) = windows
        .iter()
        .next()
        .map(|window| (window.physical_width(), window.physical_height()))
        .unwrap_or_default();
    let material = materials.add(VariablePointsMaterial::default());
    let entity = commands
        .spawn((
            Name::new("Variable points"),
            VariablePoints::new(material, width, height).with_strategy(settings.default_strategy),
            PointGeometry(geometry.clone()),
        ))
        .id();

    if let Some(cloud) = geometries.get(&geometry) {
        info!("Spawned cloud with {} points", cloud.point_count());
    }
    commands.insert_resource(DemoCloud { entity, geometry });
    next_state.set(AppState::Running);
}

/// Deterministic cloud of `count` points in a cube of side `DEMO_CLOUD_EXTENT`.
pub fn random_cloud(seed: u64, count: usize) -> PointCloudGeometry {
    let mut rng = StdRng::seed_from_u64(seed);
    let half_extent = DEMO_CLOUD_EXTENT * 0.5;

    let mut positions = Vec::with_capacity(count);
    let mut sizes = Vec::with_capacity(count);
    let mut colours = Vec::with_capacity(count);
    for _ in 0..count {
        let position = Vec3::new(
            rng.gen_range(-half_extent..half_extent),
            rng.gen_range(-half_extent..half_extent),
            rng.gen_range(-half_extent..half_extent),
        );
        let colour = (position / DEMO_CLOUD_EXTENT + Vec3::splat(0.5)).clamp(Vec3::ZERO, Vec3::ONE);

        positions.push(position.to_array());
        sizes.push(rng.gen_range(DEMO_MIN_POINT_SIZE..DEMO_MAX_POINT_SIZE));
        colours.push(colour.to_array());
    }

    PointCloudGeometry::new(positions, sizes, colours)
}
