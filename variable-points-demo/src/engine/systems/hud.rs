use bevy::prelude::*;
use variable_points::prelude::*;

use crate::engine::core::app_state::HudText;
use crate::tools::point_selection::SelectionState;

/// One status line: active strategy and the last pick.
pub fn hud_text_update_system(
    settings: Res<PickingSettings>,
    selection: Res<SelectionState>,
    mut query: Query<&mut Text, With<HudText>>,
) {
    if !settings.is_changed() && !selection.is_changed() {
        return;
    }
    let line = hud_line(settings.default_strategy, selection.last_pick.as_ref());
    for mut text in &mut query {
        text.0.clone_from(&line);
    }
}

pub fn hud_line(strategy: PickStrategy, last_pick: Option<&PointHit>) -> String {
    let pick = match last_pick {
        Some(hit) => format!("point {} at {:.2}", hit.index, hit.distance),
        None => "nothing".to_string(),
    };
    format!("[Tab] strategy: {} | last pick: {pick}", strategy.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_shows_strategy_and_pick() {
        let hit = PointHit {
            distance: 10.0,
            point: Vec3::new(0.0, 0.0, -10.0),
            index: 3,
            object: Entity::PLACEHOLDER,
        };
        assert_eq!(
            hud_line(PickStrategy::UnprojectedBox, Some(&hit)),
            "[Tab] strategy: unprojected box | last pick: point 3 at 10.00"
        );
        assert_eq!(
            hud_line(PickStrategy::ScreenDistance, None),
            "[Tab] strategy: screen distance | last pick: nothing"
        );
    }
}
