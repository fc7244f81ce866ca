/// World-space inflation applied to a cloud's bounding sphere before the
/// per-point tests run. Used when the host leaves the threshold unset.
pub const DEFAULT_PICK_THRESHOLD: f32 = 1.0;

/// Upper bound used when casting bounded rays against volumes.
pub const MAX_PICK_DISTANCE: f32 = f32::MAX;
