//! Variable-size point cloud rendering and screen-space point picking for Bevy.
//!
//! Each point is drawn as a camera-facing disk whose diameter is a per-point
//! pixel size. Picking turns a world-space ray into the list of points whose
//! disks it crosses, with two interchangeable per-point tests.

pub mod engine;
pub mod error;

pub mod prelude {
    pub use crate::engine::geometry::PointCloudGeometry;
    pub use crate::engine::picking::{PickCamera, PickStrategy, PointHit, PointRaycaster};
    pub use crate::engine::plugin::{
        PickingSettings, PointPickRequest, PointsPicked, VariablePointsPlugin, VariablePointsSystems,
    };
    pub use crate::engine::points::{PointGeometry, VariablePoints};
    pub use crate::engine::shaders::VariablePointsMaterial;
    pub use crate::error::{GeometryError, PickError};
}
