use bevy::color::Color;
use bevy::math::Vec3;

/// Vertex and fragment stages of the variable point material.
pub const VARIABLE_POINTS_SHADER_PATH: &str = "shaders/variable_points.wgsl";

/// Disk radius in normalised sprite coordinates; fragments at or beyond it are discarded.
pub const DISK_RADIUS: f32 = 0.5;

/// Corners emitted per point, in normalised sprite coordinates.
pub const SPRITE_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Two triangles per sprite, indexing into `SPRITE_CORNERS`.
pub const SPRITE_TRIANGLES: [u32; 6] = [0, 1, 2, 0, 2, 3];

pub const DEMO_CLOUD_PATH: &str = "clouds/demo.points.json";
pub const DEMO_RANDOM_SEED: u64 = 0x5eed_9013;
pub const DEMO_POINT_COUNT: usize = 2_000;
pub const DEMO_CLOUD_EXTENT: f32 = 20.0;
pub const DEMO_MIN_POINT_SIZE: f32 = 4.0;
pub const DEMO_MAX_POINT_SIZE: f32 = 24.0;
pub const HIGHLIGHT_COLOUR: Vec3 = Vec3::new(1.0, 0.85, 0.1);
pub const CLEAR_COLOUR: Color = Color::srgb(0.06, 0.06, 0.08);
