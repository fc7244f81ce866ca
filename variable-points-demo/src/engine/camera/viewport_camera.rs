use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::math::bounding::BoundingSphere;
use bevy::prelude::*;

/// Orbit camera around a focus point.
#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl ViewportCamera {
    pub fn new(focus_point: Vec3, distance: f32) -> Self {
        Self {
            focus_point,
            distance,
            pitch: -0.4,
            yaw: 0.6,
        }
    }

    /// Orbit that keeps the whole sphere in view.
    pub fn framing(sphere: &BoundingSphere) -> Self {
        Self::new(sphere.center.into(), (sphere.radius() * 2.5).max(1.0))
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn eye(&self) -> Vec3 {
        self.focus_point + self.rotation() * Vec3::Z * self.distance
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 40.0)
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        viewport_camera.yaw -= mouse_delta.x * yaw_sens;
        viewport_camera.pitch -= mouse_delta.y * pitch_sens;
        viewport_camera.pitch = viewport_camera.pitch.clamp(-1.55, 1.55);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        let factor = (1.0 - scroll_accum * 0.1).clamp(0.5, 1.5);
        viewport_camera.distance = (viewport_camera.distance * factor).clamp(0.5, 5_000.0);
    }

    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        move_input.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        move_input.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        move_input.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        move_input.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        move_input.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        move_input.y -= 1.0;
    }

    if move_input != Vec3::ZERO {
        let rotation = viewport_camera.rotation();
        let forward = rotation * Vec3::Z;
        let right = rotation * Vec3::X;

        // Shift = faster, ctrl = slower
        let mut speed = (viewport_camera.distance * 0.5).clamp(1.0, 200.0);
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            speed *= 3.5;
        }
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
            speed *= 0.25;
        }

        let world_delta = right * move_input.x + Vec3::Y * move_input.y + forward * move_input.z;
        viewport_camera.focus_point += world_delta.normalize() * speed * time.delta_secs();
    }

    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform
        .translation
        .lerp(viewport_camera.eye(), lerp_speed);
    camera_transform.rotation = camera_transform
        .rotation
        .slerp(viewport_camera.rotation(), lerp_speed);
}
