use thiserror::Error;

/// Configuration problems that stop a renderer instance from being picked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PickError {
    #[error("raycaster camera needs to be set in order to raycast")]
    MissingCamera,

    #[error("screen width and height need to be set in order to raycast (got {width}x{height})")]
    MissingScreenSize { width: u32, height: u32 },
}

/// Inconsistencies between the attribute arrays of a point cloud.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("attribute `{attribute}` has {actual} entries but there are {expected} positions")]
    AttributeLength {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("index entry {slot} references point {point} but the cloud only has {count} points")]
    IndexOutOfRange { slot: usize, point: u32, count: usize },

    #[error("point {point} has a negative size ({size})")]
    NegativeSize { point: usize, size: f32 },
}
