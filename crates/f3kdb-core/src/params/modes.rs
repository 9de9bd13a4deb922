//! Enumerations shared by the parameter model, the codec and the dispatcher.
//!
//! Every enum converts from the integer numbering used by existing scripts
//! and configuration files via `TryFrom<i32>`.

use crate::api::DebandError;

/// External pixel layout of a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelMode {
    /// One byte per sample, 8-bit depth only.
    LowBitDepth,
    /// Two byte planes: the MSB plane followed by the LSB plane, each
    /// `height` rows of `pitch` bytes.
    HighBitDepthStacked,
    /// One little-endian `u16` per sample.
    HighBitDepthInterleaved,
}

impl PixelMode {
    /// Bytes per sample within one row.
    #[inline]
    pub fn bytes_per_sample(self) -> usize {
        match self {
            PixelMode::HighBitDepthInterleaved => 2,
            _ => 1,
        }
    }

    /// Rows stored per plane row (stacked planes store two).
    #[inline]
    pub fn rows_per_row(self) -> usize {
        match self {
            PixelMode::HighBitDepthStacked => 2,
            _ => 1,
        }
    }

    /// Layout derived from a depth when none was given.
    pub fn default_for_depth(depth: u8) -> Self {
        if depth <= 8 {
            PixelMode::LowBitDepth
        } else {
            PixelMode::HighBitDepthStacked
        }
    }

    /// Depth derived from a layout when none was given.
    pub fn default_depth(self) -> u8 {
        match self {
            PixelMode::LowBitDepth => 8,
            _ => 16,
        }
    }
}

impl TryFrom<i32> for PixelMode {
    type Error = DebandError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PixelMode::LowBitDepth),
            1 => Ok(PixelMode::HighBitDepthStacked),
            2 => Ok(PixelMode::HighBitDepthInterleaved),
            _ => Err(DebandError::InvalidEnum {
                name: "pixel_mode",
                value,
            }),
        }
    }
}

/// Dither algorithm applied when reducing the internal 16-bit value to the
/// output depth.
///
/// The two 16-bit variants are selected automatically for 16-bit output and
/// only differ in the layout they write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DitherAlgorithm {
    NoDithering,
    Ordered,
    #[default]
    FloydSteinberg,
    Stacked16,
    Interleaved16,
}

impl DitherAlgorithm {
    pub const COUNT: usize = 5;

    /// Row in the dispatch table.
    #[inline]
    pub(crate) fn table_index(self) -> usize {
        match self {
            DitherAlgorithm::NoDithering => 0,
            DitherAlgorithm::Ordered => 1,
            DitherAlgorithm::FloydSteinberg => 2,
            DitherAlgorithm::Stacked16 => 3,
            DitherAlgorithm::Interleaved16 => 4,
        }
    }

    #[inline]
    pub fn is_16bit(self) -> bool {
        matches!(
            self,
            DitherAlgorithm::Stacked16 | DitherAlgorithm::Interleaved16
        )
    }
}

impl TryFrom<i32> for DitherAlgorithm {
    type Error = DebandError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DitherAlgorithm::NoDithering),
            2 => Ok(DitherAlgorithm::Ordered),
            3 => Ok(DitherAlgorithm::FloydSteinberg),
            4 => Ok(DitherAlgorithm::Stacked16),
            5 => Ok(DitherAlgorithm::Interleaved16),
            _ => Err(DebandError::InvalidEnum {
                name: "dither_algo",
                value,
            }),
        }
    }
}

/// Pseudo-random generator used for reference offsets and grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RandomAlgorithm {
    /// Shift/xor transform kept for compatibility with old clips.
    Legacy,
    /// Linear congruential generator.
    #[default]
    Uniform,
    /// Polar Box-Muller on top of [`RandomAlgorithm::Uniform`].
    Gaussian,
}

impl TryFrom<i32> for RandomAlgorithm {
    type Error = DebandError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RandomAlgorithm::Legacy),
            1 => Ok(RandomAlgorithm::Uniform),
            2 => Ok(RandomAlgorithm::Gaussian),
            _ => Err(DebandError::InvalidEnum {
                name: "random_algo",
                value,
            }),
        }
    }
}

/// Requested implementation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptimizationMode {
    #[default]
    AutoDetect,
    Scalar,
    Sse2,
    Ssse3,
    Sse41,
}

impl TryFrom<i32> for OptimizationMode {
    type Error = DebandError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(OptimizationMode::AutoDetect),
            0 => Ok(OptimizationMode::Scalar),
            1 => Ok(OptimizationMode::Sse2),
            2 => Ok(OptimizationMode::Ssse3),
            3 => Ok(OptimizationMode::Sse41),
            _ => Err(DebandError::InvalidEnum { name: "opt", value }),
        }
    }
}
