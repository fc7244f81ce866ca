pub mod geometry;
pub mod mesh;
pub mod picking;
pub mod plugin;
pub mod points;
pub mod shaders;
