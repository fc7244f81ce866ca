pub mod viewport_camera;

pub use viewport_camera::{ViewportCamera, camera_controller};
