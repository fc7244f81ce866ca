//! Application setup and state management.
//!
//! Builds the app, configures the window for native and WASM targets and
//! drives the loading to running transition.

/// App construction, plugin configuration and scene setup.
pub mod app_setup;

/// Loading and running states.
pub mod app_state;

/// Platform-specific window configuration.
pub mod window_config;
