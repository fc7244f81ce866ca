use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::render_settings::HIGHLIGHT_COLOUR;
use variable_points::prelude::*;

use crate::engine::loading::cloud_loader::DemoCloud;

#[derive(Resource, Default)]
pub struct SelectionState {
    pub last_pick: Option<PointHit>,
    /// Highlighted point and the colour it had before.
    highlighted: Option<(u32, Vec3)>,
}

pub fn request_pick_on_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut requests: EventWriter<PointPickRequest>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let (Ok((camera, camera_transform)), Ok(window)) = (camera_query.single(), windows.single())
    else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };

    if let Some(request) = PointPickRequest::from_cursor(camera, camera_transform, cursor_pos) {
        requests.write(request);
    }
}

/// Highlight the nearest picked point of the demo cloud.
pub fn highlight_picked_point(
    mut picked: EventReader<PointsPicked>,
    mut selection: ResMut<SelectionState>,
    cloud: Res<DemoCloud>,
    mut geometries: ResMut<Assets<PointCloudGeometry>>,
) {
    let Some(answer) = picked.read().last() else {
        return;
    };
    let nearest = answer
        .hits
        .iter()
        .find(|hit| hit.object == cloud.entity)
        .copied();
    selection.last_pick = nearest;

    // Mutable access marks the asset modified and rebuilds the mesh.
    if nearest.is_none() && selection.highlighted.is_none() {
        info!("No points under cursor");
        return;
    }
    let Some(geometry) = geometries.get_mut(&cloud.geometry) else {
        return;
    };
    if let Some((index, colour)) = selection.highlighted.take() {
        geometry.set_colour(index, colour);
    }

    match nearest {
        Some(hit) => {
            info!(
                "Picked point {} at {:.2} units ({} hits)",
                hit.index,
                hit.distance,
                answer.hits.len()
            );
            selection.highlighted = Some((hit.index, geometry.colour(hit.index)));
            geometry.set_colour(hit.index, HIGHLIGHT_COLOUR);
        }
        None => info!("No points under cursor"),
    }
}

pub fn toggle_pick_strategy(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<PickingSettings>,
    mut clouds: Query<&mut VariablePoints>,
) {
    if !keyboard.just_pressed(KeyCode::Tab) {
        return;
    }
    settings.default_strategy = settings.default_strategy.toggled();
    for mut points in &mut clouds {
        points.set_strategy(settings.default_strategy);
    }
    info!("Pick strategy: {}", settings.default_strategy.label());
}
