//! Dithering applied while scaling internal 16-bit values down to the
//! output depth.
//!
//! A [`DitherKernel`] is created at the start of every plane, fed each pixel
//! of a row in order and told when a row ends. Kernels that need scratch
//! memory borrow it from a [`DitherContext`] and hand it back in
//! [`DitherKernel::finish`], so a cached context can be reused across frames
//! without reallocating.

mod floyd_steinberg;
mod ordered;

pub(crate) use floyd_steinberg::FloydSteinberg;
pub(crate) use ordered::OrderedDither;

/// Per-plane scratch cached between calls.
///
/// Tagged with the source pitch it was created for; a call with a different
/// pitch discards it and starts over.
#[derive(Debug, Default)]
pub(crate) struct DitherContext {
    src_pitch: usize,
    error_buffer: Vec<u16>,
}

impl DitherContext {
    pub fn new(src_pitch: usize) -> Self {
        Self {
            src_pitch,
            error_buffer: Vec::new(),
        }
    }

    #[inline]
    pub fn src_pitch(&self) -> usize {
        self.src_pitch
    }

    /// Reuse `cached` when it matches `src_pitch`, otherwise start fresh.
    pub fn reuse_or_new(cached: Option<DitherContext>, src_pitch: usize) -> Self {
        match cached {
            Some(context) if context.src_pitch == src_pitch => context,
            _ => DitherContext::new(src_pitch),
        }
    }
}

/// Per-pixel dithering step, applied before the final clamp and shift.
pub(crate) trait DitherKernel: Sized {
    fn begin(context: &mut DitherContext, width: usize, output_depth: u8) -> Self;

    /// Dither one pixel. Must be called exactly once per pixel, left to right.
    fn dither(&mut self, pixel: i32, row: usize, column: usize) -> i32;

    fn next_row(&mut self) {}

    fn finish(self, _context: &mut DitherContext) {}
}

/// Plain truncation. Also used for the 16-bit pass-through variants, where
/// nothing is dropped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NoDither;

impl DitherKernel for NoDither {
    #[inline]
    fn begin(_context: &mut DitherContext, _width: usize, _output_depth: u8) -> Self {
        NoDither
    }

    #[inline]
    fn dither(&mut self, pixel: i32, _row: usize, _column: usize) -> i32 {
        pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_reused_for_same_pitch() {
        let mut cached = DitherContext::new(64);
        cached.error_buffer = vec![1, 2, 3];
        let reused = DitherContext::reuse_or_new(Some(cached), 64);
        assert_eq!(reused.src_pitch(), 64);
        assert_eq!(reused.error_buffer.len(), 3);
    }

    #[test]
    fn test_context_rebuilt_for_new_pitch() {
        let mut cached = DitherContext::new(64);
        cached.error_buffer = vec![1, 2, 3];
        let rebuilt = DitherContext::reuse_or_new(Some(cached), 80);
        assert_eq!(rebuilt.src_pitch(), 80);
        assert!(rebuilt.error_buffer.is_empty());
    }

    #[test]
    fn test_no_dither_is_identity() {
        let mut context = DitherContext::new(16);
        let mut kernel = NoDither::begin(&mut context, 16, 8);
        assert_eq!(kernel.dither(12345, 3, 7), 12345);
        assert_eq!(kernel.dither(-5, 3, 8), -5);
    }
}
