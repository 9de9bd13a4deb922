//! Bounds-checked views over host-owned plane buffers.
//!
//! Positions are byte offsets of a sample's first byte. For the stacked
//! layout that byte lives in the MSB half; the LSB byte sits `height * pitch`
//! bytes further on.

use super::INTERNAL_BIT_DEPTH;
use crate::api::DebandError;
use crate::params::PixelMode;

/// Smallest buffer length that holds a plane, or an error when `pitch`
/// cannot hold one row.
pub(crate) fn required_len(
    buffer: &'static str,
    len: usize,
    pitch: usize,
    width: usize,
    height: usize,
    mode: PixelMode,
) -> Result<usize, DebandError> {
    let row_bytes = width * mode.bytes_per_sample();
    let rows = height * mode.rows_per_row();
    let needed = pitch * (rows - 1) + row_bytes;
    if pitch < row_bytes || len < needed {
        return Err(DebandError::BufferTooSmall {
            buffer,
            pitch,
            row_bytes,
            len,
            needed,
        });
    }
    Ok(needed)
}

/// Read side of a plane in any input layout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SourcePlane<'a> {
    data: &'a [u8],
    pitch: usize,
    mode: PixelMode,
    lsb_offset: usize,
    shift: u32,
}

impl<'a> SourcePlane<'a> {
    pub fn new(
        data: &'a [u8],
        pitch: usize,
        width: usize,
        height: usize,
        mode: PixelMode,
        depth: u8,
    ) -> Result<Self, DebandError> {
        required_len("source", data.len(), pitch, width, height, mode)?;
        Ok(Self {
            data,
            pitch,
            mode,
            lsb_offset: height * pitch,
            shift: INTERNAL_BIT_DEPTH - u32::from(depth),
        })
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Byte distance between horizontally adjacent samples.
    #[inline]
    pub fn step(&self) -> usize {
        self.mode.bytes_per_sample()
    }

    /// Left shift that normalises a stored sample to the internal depth.
    #[cfg_attr(not(any(target_arch = "x86", target_arch = "x86_64")), allow(dead_code))]
    #[inline]
    pub fn shift(&self) -> u32 {
        self.shift
    }

    #[inline]
    fn raw_at(&self, pos: usize) -> u16 {
        match self.mode {
            PixelMode::LowBitDepth => u16::from(self.data[pos]),
            PixelMode::HighBitDepthStacked => {
                u16::from(self.data[pos]) << 8 | u16::from(self.data[pos + self.lsb_offset])
            }
            PixelMode::HighBitDepthInterleaved => {
                u16::from_le_bytes([self.data[pos], self.data[pos + 1]])
            }
        }
    }

    /// Sample at byte `pos`, normalised to the internal depth.
    #[inline]
    pub fn read(&self, pos: usize) -> i32 {
        // Bits above the declared depth are dropped with the 16-bit wrap.
        ((u32::from(self.raw_at(pos)) << self.shift) & 0xFFFF) as i32
    }

    /// Stored (not normalised) samples at the first `count` positions.
    /// Remaining entries are zero.
    #[cfg_attr(not(any(target_arch = "x86", target_arch = "x86_64")), allow(dead_code))]
    #[inline]
    pub fn gather_raw<const N: usize>(&self, positions: &[usize; N], count: usize) -> [u16; N] {
        let mut out = [0u16; N];
        let lanes = out.iter_mut().zip(&positions[..count]);
        match self.mode {
            PixelMode::LowBitDepth => {
                for (sample, &pos) in lanes {
                    *sample = u16::from(self.data[pos]);
                }
            }
            PixelMode::HighBitDepthStacked => {
                for (sample, &pos) in lanes {
                    *sample = u16::from(self.data[pos]) << 8
                        | u16::from(self.data[pos + self.lsb_offset]);
                }
            }
            PixelMode::HighBitDepthInterleaved => {
                for (sample, &pos) in lanes {
                    *sample = u16::from_le_bytes([self.data[pos], self.data[pos + 1]]);
                }
            }
        }
        out
    }

    /// Sample at `pos` displaced by a signed byte offset.
    #[inline]
    pub fn read_at(&self, pos: usize, offset: isize) -> i32 {
        self.read(pos.wrapping_add_signed(offset))
    }
}

/// Write side of a plane in any output layout.
#[derive(Debug)]
pub(crate) struct DestPlane<'a> {
    data: &'a mut [u8],
    pitch: usize,
    mode: PixelMode,
    lsb_offset: usize,
}

impl<'a> DestPlane<'a> {
    pub fn new(
        data: &'a mut [u8],
        pitch: usize,
        width: usize,
        height: usize,
        mode: PixelMode,
    ) -> Result<Self, DebandError> {
        required_len("destination", data.len(), pitch, width, height, mode)?;
        Ok(Self {
            data,
            pitch,
            mode,
            lsb_offset: height * pitch,
        })
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.mode.bytes_per_sample()
    }

    #[inline]
    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Store an already downsampled value at byte `pos`.
    #[inline]
    pub fn write(&mut self, pos: usize, value: u16) {
        match self.mode {
            PixelMode::LowBitDepth => self.data[pos] = value as u8,
            PixelMode::HighBitDepthStacked => {
                self.data[pos] = (value >> 8) as u8;
                self.data[pos + self.lsb_offset] = (value & 0xFF) as u8;
            }
            PixelMode::HighBitDepthInterleaved => {
                self.data[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
            }
        }
    }
}
