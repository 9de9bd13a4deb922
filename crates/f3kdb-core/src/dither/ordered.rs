//! Ordered dithering with a 16x16 Bayer threshold map.
//!
//! The base map is generated by the build script. Maps pre-shifted for each
//! output depth are built once per process on first use.

use std::sync::OnceLock;

use super::{DitherContext, DitherKernel};

include!(concat!(env!("OUT_DIR"), "/threshold_map.rs"));

type ShiftedMap = [[u16; 16]; 16];

const MIN_OUTPUT_DEPTH: u8 = 8;
const DEPTH_COUNT: usize = 9;

static SHIFTED_MAPS: OnceLock<[ShiftedMap; DEPTH_COUNT]> = OnceLock::new();

fn build_shifted_maps() -> [ShiftedMap; DEPTH_COUNT] {
    let mut maps = [[[0u16; 16]; 16]; DEPTH_COUNT];
    for (index, map) in maps.iter_mut().enumerate() {
        for (row, thresholds) in map.iter_mut().enumerate() {
            for (column, value) in thresholds.iter_mut().enumerate() {
                *value = u16::from(THRESHOLD_MAP[row][column]) >> index;
            }
        }
    }
    maps
}

/// Threshold map for `output_depth`, values `THRESHOLD_MAP >> (depth - 8)`.
pub(crate) fn threshold_map(output_depth: u8) -> &'static ShiftedMap {
    let index = usize::from(output_depth.saturating_sub(MIN_OUTPUT_DEPTH)).min(DEPTH_COUNT - 1);
    &SHIFTED_MAPS.get_or_init(build_shifted_maps)[index]
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderedDither {
    map: &'static ShiftedMap,
}

impl DitherKernel for OrderedDither {
    fn begin(_context: &mut DitherContext, _width: usize, output_depth: u8) -> Self {
        Self {
            map: threshold_map(output_depth),
        }
    }

    #[inline]
    fn dither(&mut self, pixel: i32, row: usize, column: usize) -> i32 {
        pixel + i32::from(self.map[row & 15][column & 15])
    }
}
