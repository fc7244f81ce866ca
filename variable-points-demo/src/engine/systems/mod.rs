pub mod fps_tracking;
pub mod hud;
