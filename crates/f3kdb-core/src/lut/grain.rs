//! Precomputed grain noise pools.
//!
//! One pool serves the luma plane and one serves both chroma planes. Both
//! are sized for the luma plane so a single offset table covers every plane.
//! With dynamic grain the pools are three windows long and each frame index
//! starts reading at its own pre-drawn offset inside the middle window.

use crate::params::{Plane, RandomAlgorithm, ResolvedParams, VideoInfo};
use crate::random::random;

/// Offsets into the pool are aligned down to this many entries.
const OFFSET_ALIGNMENT: usize = 16;

/// Entries in one grain window for a luma plane of this size.
#[inline]
pub(crate) fn window_size(width: usize, height: usize) -> usize {
    ((width + 255) & !127) * height
}

#[derive(Debug, Clone)]
pub(crate) struct GrainBuffers {
    luma: Vec<i16>,
    chroma: Vec<i16>,
    /// One start offset per frame, empty without dynamic grain.
    offsets: Vec<usize>,
}

impl GrainBuffers {
    /// Draw both pools, then the per-frame offsets, continuing `seed`.
    pub fn build(video_info: &VideoInfo, params: &ResolvedParams, seed: &mut u32) -> Self {
        let window = window_size(video_info.width, video_info.height);
        let multiplier = if params.dynamic_grain { 3 } else { 1 };
        let item_count = window * multiplier;

        let mut draw_pool = |range: u16| -> Vec<i16> {
            (0..item_count)
                .map(|_| {
                    random(
                        params.random_algo_grain,
                        seed,
                        i32::from(range),
                        params.random_param_grain,
                    ) as i16
                })
                .collect()
        };
        let luma = draw_pool(params.grain_y);
        let chroma = draw_pool(params.grain_c);

        let offsets = if params.dynamic_grain {
            let window_range = window as i32;
            (0..video_info.num_frames)
                .map(|_| {
                    let jitter = random(RandomAlgorithm::Uniform, seed, window_range, 1.0);
                    let offset = (window_range + jitter) as usize;
                    offset & !(OFFSET_ALIGNMENT - 1)
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            luma,
            chroma,
            offsets,
        }
    }

    /// Pool offset used for `frame_index`.
    #[inline]
    pub fn frame_offset(&self, frame_index: usize) -> usize {
        if self.offsets.is_empty() {
            0
        } else {
            self.offsets[frame_index % self.offsets.len()]
        }
    }

    /// Grain entries for `plane` of `frame_index`, row `r` starting at
    /// `r * lut_stride`.
    pub fn plane_grain(&self, plane: Plane, frame_index: usize) -> &[i16] {
        let pool = match plane {
            Plane::Y => &self.luma,
            Plane::Cb | Plane::Cr => &self.chroma,
        };
        &pool[self.frame_offset(frame_index)..]
    }

    #[cfg(test)]
    pub(crate) fn pool_len(&self) -> usize {
        self.luma.len()
    }
}
