//! Reference offsets pre-multiplied by the source pitch.
//!
//! The lane backends read their reference positions from this stream
//! instead of recomputing them from the LUT for every pixel. A stream is
//! only valid for the source pitch it was built for. Each plane owns one
//! slot; the first call with a new pitch builds a stream and publishes it
//! with a single compare-and-swap. When two threads race, the loser drops
//! its copy and uses the published one.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use super::reference_offsets;
use crate::lut::FrameLut;

pub(crate) type RefStreamSlot = ArcSwapOption<RefOffsetStream>;

#[derive(Debug)]
pub(crate) struct RefOffsetStream {
    src_pitch: usize,
    stride: usize,
    offsets: Vec<[isize; 2]>,
}

impl RefOffsetStream {
    pub fn build(
        lut: &FrameLut,
        sample_mode: u8,
        src_pitch: usize,
        step: usize,
        width_subsampling: u8,
        height_subsampling: u8,
    ) -> Self {
        let stride = lut.stride();
        let mut offsets = vec![[0isize; 2]; stride * lut.height()];
        for y in 0..lut.height() {
            let row = &mut offsets[y * stride..y * stride + lut.width()];
            for (slot, &info) in row.iter_mut().zip(lut.row(y)) {
                *slot = reference_offsets(
                    info,
                    sample_mode,
                    src_pitch as isize,
                    step as isize,
                    width_subsampling,
                    height_subsampling,
                );
            }
        }
        Self {
            src_pitch,
            stride,
            offsets,
        }
    }

    #[inline]
    pub fn src_pitch(&self) -> usize {
        self.src_pitch
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[[isize; 2]] {
        &self.offsets[y * self.stride..(y + 1) * self.stride]
    }

    /// Stream for `src_pitch` from `slot`, building and publishing it first
    /// if the slot is empty or holds another pitch.
    pub fn acquire(
        slot: &RefStreamSlot,
        src_pitch: usize,
        build: impl FnOnce() -> RefOffsetStream,
    ) -> Arc<RefOffsetStream> {
        let current = slot.load_full();
        if let Some(stream) = current.as_ref().filter(|s| s.src_pitch == src_pitch) {
            return Arc::clone(stream);
        }

        let fresh = Arc::new(build());
        let guard = slot.compare_and_swap(&current, Some(Arc::clone(&fresh)));
        let previous: &Option<Arc<RefOffsetStream>> = &guard;
        let won = match (previous.as_ref(), current.as_ref()) {
            (Some(seen), Some(expected)) => Arc::ptr_eq(seen, expected),
            (None, None) => true,
            _ => false,
        };
        if !won {
            if let Some(winner) = previous.as_ref().filter(|s| s.src_pitch == src_pitch) {
                tracing::trace!(src_pitch, "reference offset stream published concurrently");
                return Arc::clone(winner);
            }
        }
        fresh
    }
}
