//! Lookup tables built once per [`Core`](crate::Core).

mod frame_lut;
mod grain;

pub(crate) use frame_lut::{build_frame_luts, lut_stride, FrameLut, PixelDitherInfo};
pub(crate) use grain::GrainBuffers;

use crate::params::{ResolvedParams, VideoInfo};

/// Initial generator state for a clip.
pub(crate) fn initial_seed(video_info: &VideoInfo, user_seed: u32) -> u32 {
    let width = video_info.width as u32;
    let height = video_info.height as u32;
    let frames = video_info.num_frames as u32;
    let mut seed = 0x92D6_8CA2u32.wrapping_sub(user_seed);
    seed ^= width.wrapping_shl(16) ^ height;
    seed ^= frames.wrapping_shl(16) ^ frames;
    seed
}

/// Reference tables and grain pools, drawn from one continuous stream.
pub(crate) fn build_tables(
    video_info: &VideoInfo,
    params: &ResolvedParams,
) -> ([FrameLut; 3], GrainBuffers) {
    let mut seed = initial_seed(video_info, params.seed);
    let luts = build_frame_luts(video_info, params, &mut seed);
    let grain = GrainBuffers::build(video_info, params, &mut seed);
    (luts, grain)
}
