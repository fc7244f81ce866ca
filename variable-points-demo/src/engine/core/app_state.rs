use bevy::prelude::*;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Marker for the FPS overlay text.
#[derive(Component)]
pub struct FpsText;

/// Marker for the pick status line.
#[derive(Component)]
pub struct HudText;
