use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::CLEAR_COLOUR;
use variable_points::prelude::*;

use crate::engine::camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{AppState, FpsText, HudText};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::cloud_loader::{CloudLoader, spawn_cloud_when_ready, start_loading};
use crate::engine::systems::fps_tracking::fps_text_update_system;
use crate::engine::systems::hud::hud_text_update_system;
use crate::tools::point_selection::{
    SelectionState, highlight_picked_point, request_pick_on_click, toggle_pick_strategy,
};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers PointCloudGeometry as a loadable asset from *.points.json files.
        .add_plugins(JsonAssetPlugin::<PointCloudGeometry>::new(&["points.json"]))
        .add_plugins(VariablePointsPlugin)
        .insert_resource(ClearColor(CLEAR_COLOUR));

    app.init_resource::<CloudLoader>()
        .init_resource::<SelectionState>()
        .init_resource::<ViewportCamera>();

    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            spawn_cloud_when_ready.run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            Update,
            (
                camera_controller,
                toggle_pick_strategy,
                request_pick_on_click,
                highlight_picked_point.after(VariablePointsSystems::Pick),
                hud_text_update_system,
            )
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(Update, fps_text_update_system);

    app
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 10.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    create_overlays(&mut commands);
}

fn create_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                HudText,
            ));
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
