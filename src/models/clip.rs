//! Clip geometry and pitched in-memory frames.

use f3kdb_core::{PixelMode, Plane, VideoInfo};

use crate::error::HostError;

/// Row alignment of every [`PlaneBuffer`], in bytes.
pub const PITCH_ALIGNMENT: usize = 16;

/// Round a row length up to [`PITCH_ALIGNMENT`].
pub fn align_pitch(row_bytes: usize) -> usize {
    (row_bytes + PITCH_ALIGNMENT - 1) & !(PITCH_ALIGNMENT - 1)
}

/// Geometry and sample layout of a raw planar YUV clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFormat {
    pub width: usize,
    pub height: usize,
    /// Chroma subsampling as (width shift, height shift).
    pub subsampling: (u8, u8),
    pub layout: PixelMode,
    pub depth: u8,
    pub frames: usize,
}

impl ClipFormat {
    /// 8-bit 4:2:0 clip.
    pub fn new(width: usize, height: usize, frames: usize) -> Self {
        Self {
            width,
            height,
            subsampling: (1, 1),
            layout: PixelMode::LowBitDepth,
            depth: 8,
            frames,
        }
    }

    pub fn subsampling(mut self, width_shift: u8, height_shift: u8) -> Self {
        self.subsampling = (width_shift, height_shift);
        self
    }

    pub fn format(mut self, layout: PixelMode, depth: u8) -> Self {
        self.layout = layout;
        self.depth = depth;
        self
    }

    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    pub fn video_info(&self) -> VideoInfo {
        VideoInfo::new(self.width, self.height, self.frames)
            .subsampling(self.subsampling.0, self.subsampling.1)
            .format(self.layout, self.depth)
    }

    /// Plane dimensions in samples.
    pub fn plane_size(&self, plane: Plane) -> (usize, usize) {
        let vi = self.video_info();
        (vi.plane_width(plane), vi.plane_height(plane))
    }

    /// Bytes one frame occupies when its planes are stored without padding.
    pub fn packed_frame_len(&self) -> usize {
        Plane::ALL
            .into_iter()
            .map(|plane| {
                let (width, height) = self.plane_size(plane);
                width * self.layout.bytes_per_sample() * height * self.layout.rows_per_row()
            })
            .sum()
    }

    /// Derive the frame count from the size of a packed clip.
    pub fn frames_from_len(self, len: u64) -> Result<Self, HostError> {
        let frame_len = self.packed_frame_len() as u64;
        if frame_len == 0 {
            return Err(HostError::UnsupportedFormat("empty frame".to_string()));
        }
        let frames = (len / frame_len) as usize;
        let tail = (len % frame_len) as usize;
        if tail != 0 {
            return Err(HostError::TruncatedFrame {
                frame: frames,
                expected: frame_len as usize,
                got: tail,
            });
        }
        Ok(self.frames(frames))
    }
}

/// One plane stored as rows of `pitch` bytes.
///
/// Stacked layouts keep the MSB rows first, followed by the LSB rows, so a
/// plane always has `height * layout.rows_per_row()` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaneBuffer {
    data: Vec<u8>,
    pitch: usize,
    row_bytes: usize,
    rows: usize,
}

impl PlaneBuffer {
    pub fn new(width: usize, height: usize, layout: PixelMode) -> Self {
        let row_bytes = width * layout.bytes_per_sample();
        let rows = height * layout.rows_per_row();
        let pitch = align_pitch(row_bytes);
        Self {
            data: vec![0; pitch * rows],
            pitch,
            row_bytes,
            rows,
        }
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Bytes of pixel data per row, excluding padding.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.pitch..][..self.row_bytes]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.data[row * self.pitch..][..self.row_bytes]
    }
}

/// A frame of three planes in Y, Cb, Cr order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    planes: [PlaneBuffer; 3],
}

impl Frame {
    pub fn new(format: &ClipFormat) -> Self {
        Self {
            planes: Plane::ALL.map(|plane| {
                let (width, height) = format.plane_size(plane);
                PlaneBuffer::new(width, height, format.layout)
            }),
        }
    }

    pub fn plane(&self, plane: Plane) -> &PlaneBuffer {
        &self.planes[plane.index()]
    }

    pub fn plane_mut(&mut self, plane: Plane) -> &mut PlaneBuffer {
        &mut self.planes[plane.index()]
    }

    /// Move the chroma planes out, leaving empty buffers behind.
    pub(crate) fn take_chroma(&mut self) -> [PlaneBuffer; 2] {
        [
            std::mem::take(&mut self.planes[Plane::Cb.index()]),
            std::mem::take(&mut self.planes[Plane::Cr.index()]),
        ]
    }

    pub(crate) fn restore_chroma(&mut self, [cb, cr]: [PlaneBuffer; 2]) {
        self.planes[Plane::Cb.index()] = cb;
        self.planes[Plane::Cr.index()] = cr;
    }
}
