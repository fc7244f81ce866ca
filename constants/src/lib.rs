//! Shared tunables for the variable point renderer and its demo.

/// Picking tolerances and defaults.
pub mod picking;

/// Shader paths, disk geometry and demo scene settings.
pub mod render_settings;
