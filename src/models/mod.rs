pub mod clip;
pub mod config;

pub use clip::{align_pitch, ClipFormat, Frame, PlaneBuffer, PITCH_ALIGNMENT};
pub use config::DebandConfig;
