//! Floyd-Steinberg error diffusion over a two-row ping-pong buffer.
//!
//! ```text
//!        X   7
//!    3   5   1
//! ```
//!
//! Each buffer row has one pad entry at both ends, so the kernel never needs
//! edge checks. Advancing to the next row flips the sign of the row pitch
//! instead of copying; the row being left behind becomes the "below" row and
//! is cleared.

use super::{DitherContext, DitherKernel};
use crate::codec::INTERNAL_BIT_DEPTH;

const PIXEL_MAX: i32 = (1 << INTERNAL_BIT_DEPTH) - 1;

#[derive(Debug)]
pub(crate) struct FloydSteinberg {
    buffer: Vec<u16>,
    current: usize,
    /// Signed distance from the current row to the row below.
    row_pitch: isize,
    error_mask: i32,
}

impl DitherKernel for FloydSteinberg {
    fn begin(context: &mut DitherContext, width: usize, output_depth: u8) -> Self {
        let row_len = width + 2;
        let mut buffer = std::mem::take(&mut context.error_buffer);
        buffer.clear();
        buffer.resize(row_len * 2, 0);
        Self {
            buffer,
            current: 1,
            row_pitch: row_len as isize,
            error_mask: (1 << (INTERNAL_BIT_DEPTH - u32::from(output_depth))) - 1,
        }
    }

    #[inline]
    fn dither(&mut self, pixel: i32, _row: usize, _column: usize) -> i32 {
        let pixel = pixel.clamp(0, PIXEL_MAX);
        let pixel = (pixel + i32::from(self.buffer[self.current])).clamp(0, PIXEL_MAX);
        let error = pixel & self.error_mask;

        let below = self.current.wrapping_add_signed(self.row_pitch);
        self.spread(self.current + 1, (error * 7) >> 4);
        self.spread(below - 1, (error * 3) >> 4);
        self.spread(below, (error * 5) >> 4);
        self.spread(below + 1, error >> 4);

        self.current += 1;
        pixel
    }

    fn next_row(&mut self) {
        self.row_pitch = -self.row_pitch;
        let row_len = self.row_pitch.unsigned_abs();
        // The row we move onto starts at 0 when the pitch now points up.
        let start = if self.row_pitch < 0 { row_len } else { 0 };
        let below = start.wrapping_add_signed(self.row_pitch);
        self.buffer[below..below + row_len].fill(0);
        self.current = start + 1;
    }

    fn finish(self, context: &mut DitherContext) {
        context.error_buffer = self.buffer;
    }
}

impl FloydSteinberg {
    #[inline]
    fn spread(&mut self, index: usize, amount: i32) {
        self.buffer[index] = self.buffer[index].wrapping_add(amount as u16);
    }
}
