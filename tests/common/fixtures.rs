//! Test clips and file helpers.

use std::path::{Path, PathBuf};

use f3kdb::models::ClipFormat;
use f3kdb_core::{PixelMode, Plane};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Settings that leave flat areas untouched: no grain, default thresholds.
pub const NO_GRAIN_YAML: &str = "grainY: 0\ngrainC: 0\n";

/// Settings that make debanding a no-op.
pub const NO_OP_YAML: &str = "Y: 0\nCb: 0\nCr: 0\ngrainY: 0\ngrainC: 0\n";

/// Encode one sample at `format`'s layout.
fn push_sample(
    plane: &mut [u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    value: u16,
    layout: PixelMode,
) {
    match layout {
        PixelMode::LowBitDepth => plane[y * width + x] = value as u8,
        PixelMode::HighBitDepthStacked => {
            plane[y * width + x] = (value >> 8) as u8;
            plane[(height + y) * width + x] = value as u8;
        }
        PixelMode::HighBitDepthInterleaved => {
            let pos = (y * width + x) * 2;
            plane[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
        }
    }
}

/// Packed clip where `sample(plane, frame, x, y)` gives every sample at the
/// clip's bit depth.
pub fn build_clip(
    format: &ClipFormat,
    mut sample: impl FnMut(Plane, usize, usize, usize) -> u16,
) -> Vec<u8> {
    let mut clip = Vec::with_capacity(format.packed_frame_len() * format.frames);
    for frame in 0..format.frames {
        for plane in Plane::ALL {
            let (width, height) = format.plane_size(plane);
            let plane_len = width
                * height
                * format.layout.bytes_per_sample()
                * format.layout.rows_per_row();
            let mut bytes = vec![0u8; plane_len];
            for y in 0..height {
                for x in 0..width {
                    let value = sample(plane, frame, x, y);
                    push_sample(&mut bytes, width, height, x, y, value, format.layout);
                }
            }
            clip.extend(bytes);
        }
    }
    clip
}

/// Every sample set to `value`.
pub fn flat_clip(format: &ClipFormat, value: u16) -> Vec<u8> {
    build_clip(format, |_, _, _, _| value)
}

/// Shallow horizontal ramp with seeded noise: the kind of content that bands.
pub fn noisy_ramp_clip(format: &ClipFormat, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max = (1i32 << format.depth) - 1;
    let base = max / 3;
    let noise = 1i32 << (format.depth - 8);
    build_clip(format, |_, _, x, _| {
        let ramp = base + (x as i32 * (max / 8)) / format.width as i32;
        (ramp + rng.gen_range(-noise..=noise)).clamp(0, max) as u16
    })
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
