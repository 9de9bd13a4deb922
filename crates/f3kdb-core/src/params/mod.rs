//! Parameter model: enums, clip geometry and deband parameters.

mod modes;
#[allow(clippy::module_inception)]
mod params;
mod video_info;

pub use modes::{DitherAlgorithm, OptimizationMode, PixelMode, RandomAlgorithm};
pub(crate) use params::ResolvedParams;
pub use params::{Params, GAUSSIAN_SIGMA_MAX};
pub use video_info::{Plane, VideoInfo};
