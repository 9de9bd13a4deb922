// Lane loops index several parallel arrays at once.
#![allow(clippy::needless_range_loop, clippy::module_inception)]

//! f3kdb-core: deterministic debanding for planar YUV video.
//!
//! Banding shows up where a smooth gradient was quantized into a handful of
//! flat steps. This crate removes it by replacing every pixel with the
//! average of a few randomly chosen neighbours, but only where that average
//! stays within a threshold of the original, and then masks what remains
//! with a little synthetic grain.
//!
//! # Quick Start
//!
//! ```
//! use f3kdb_core::{Core, Params, Plane, VideoInfo};
//!
//! let video_info = VideoInfo::new(64, 48, 100);
//! let core = Core::new(&video_info, &Params::default()).unwrap();
//!
//! let src = vec![64u8; 64 * 48];
//! let mut dst = vec![0u8; 64 * 48];
//! core.process_plane(0, Plane::Y, &mut dst, 64, &src, 64).unwrap();
//! ```
//!
//! # Pipeline
//!
//! Everything expensive happens once, in [`Core::new`]:
//!
//! 1. [`Params`] are validated against the [`VideoInfo`]; thresholds and
//!    grain amounts are scaled into the internal 16-bit domain.
//! 2. A seeded generator (see [`random`]) draws, for every pixel, the
//!    distance to its reference samples and a grain delta. The seed mixes in
//!    the frame geometry, so the same parameters always produce the same
//!    tables for the same clip.
//! 3. Grain pools are drawn from the same stream. With dynamic grain, every
//!    frame index gets its own pre-drawn window offset, so frames can be
//!    requested in any order.
//! 4. One concrete routine is selected by dither algorithm, CPU tier, sample
//!    mode and blur-first flag.
//!
//! [`Core::process_plane`] then only reads those tables.
//!
//! # Pixel Formats
//!
//! - [`PixelMode::LowBitDepth`]: one byte per sample, 8-bit.
//! - [`PixelMode::HighBitDepthStacked`]: MSB rows followed by LSB rows.
//! - [`PixelMode::HighBitDepthInterleaved`]: little-endian `u16` samples.
//!
//! Input is normalised to 16 bits on read and scaled to the output depth on
//! write, with optional ordered or Floyd-Steinberg dithering.
//!
//! # Backends
//!
//! The scalar backend is always available. On x86 the SSE2, SSSE3 and SSE4.1
//! tiers run a block kernel compiled for each feature level. All tiers share
//! the same arithmetic and produce byte-identical output.

pub mod api;
pub mod dispatch;
pub mod params;
pub mod random;

mod codec;
mod dither;
mod lut;
mod process;

pub use api::{Core, DebandError, ErrorCode};
pub use dispatch::{detect, CpuTier};
pub use params::{
    DitherAlgorithm, OptimizationMode, Params, PixelMode, Plane, RandomAlgorithm, VideoInfo,
};

#[cfg(test)]
mod domain_tests;
