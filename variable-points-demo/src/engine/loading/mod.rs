/// Demo cloud loading with a generated fallback.
pub mod cloud_loader;
