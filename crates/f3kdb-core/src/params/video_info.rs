//! Clip geometry and sample format.

use super::PixelMode;
use crate::api::DebandError;
use crate::codec::INTERNAL_BIT_DEPTH;

/// One of the three YUV planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    Y,
    Cb,
    Cr,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::Y, Plane::Cb, Plane::Cr];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Plane::Y => 0,
            Plane::Cb => 1,
            Plane::Cr => 2,
        }
    }

    #[inline]
    pub fn is_chroma(self) -> bool {
        self != Plane::Y
    }
}

/// Geometry and input format of the clip being processed.
///
/// Chroma subsampling is expressed as a bit shift: 4:2:0 is `(1, 1)`,
/// 4:2:2 is `(1, 0)` and 4:4:4 is `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub width: usize,
    pub height: usize,
    pub chroma_width_subsampling: u8,
    pub chroma_height_subsampling: u8,
    pub pixel_mode: PixelMode,
    pub depth: u8,
    /// Can be an estimate; dynamic grain offsets repeat modulo this count.
    pub num_frames: usize,
}

impl VideoInfo {
    /// 8-bit 4:2:0 clip of the given size.
    pub fn new(width: usize, height: usize, num_frames: usize) -> Self {
        Self {
            width,
            height,
            chroma_width_subsampling: 1,
            chroma_height_subsampling: 1,
            pixel_mode: PixelMode::LowBitDepth,
            depth: 8,
            num_frames,
        }
    }

    /// Set chroma subsampling shifts.
    #[inline]
    pub fn subsampling(mut self, width_shift: u8, height_shift: u8) -> Self {
        self.chroma_width_subsampling = width_shift;
        self.chroma_height_subsampling = height_shift;
        self
    }

    /// Set input layout and depth.
    #[inline]
    pub fn format(mut self, pixel_mode: PixelMode, depth: u8) -> Self {
        self.pixel_mode = pixel_mode;
        self.depth = depth;
        self
    }

    pub fn plane_width(&self, plane: Plane) -> usize {
        match plane {
            Plane::Y => self.width,
            _ => self.width >> self.chroma_width_subsampling,
        }
    }

    pub fn plane_height(&self, plane: Plane) -> usize {
        match plane {
            Plane::Y => self.height,
            _ => self.height >> self.chroma_height_subsampling,
        }
    }

    /// Subsampling shifts applied to reference offsets on `plane`.
    pub fn plane_subsampling(&self, plane: Plane) -> (u8, u8) {
        match plane {
            Plane::Y => (0, 0),
            _ => (
                self.chroma_width_subsampling,
                self.chroma_height_subsampling,
            ),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), DebandError> {
        let conditions = [
            (self.width < 16, "width < 16"),
            (self.height < 16, "height < 16"),
            (
                self.chroma_width_subsampling > 4,
                "chroma_width_subsampling > 4",
            ),
            (
                self.chroma_height_subsampling > 4,
                "chroma_height_subsampling > 4",
            ),
            (self.num_frames == 0, "num_frames <= 0"),
            (
                self.depth < 8 || u32::from(self.depth) > INTERNAL_BIT_DEPTH,
                "depth < 8 || depth > 16",
            ),
            (
                self.pixel_mode == PixelMode::LowBitDepth && self.depth != 8,
                "pixel_mode == LOW_BIT_DEPTH && depth != 8",
            ),
            (
                self.pixel_mode != PixelMode::LowBitDepth && self.depth == 8,
                "pixel_mode != LOW_BIT_DEPTH && depth == 8",
            ),
        ];
        for (failed, condition) in conditions {
            if failed {
                return Err(DebandError::InvalidVideoInfo(condition));
            }
        }
        // Chroma planes must still have at least one sample per axis.
        if self.plane_width(Plane::Cb) == 0 || self.plane_height(Plane::Cb) == 0 {
            return Err(DebandError::InvalidVideoInfo("chroma plane is empty"));
        }
        Ok(())
    }
}
