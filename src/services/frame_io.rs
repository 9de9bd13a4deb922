//! Raw planar clip I/O.
//!
//! Frames are stored back to back with the Y, Cb and Cr planes tightly
//! packed (no row padding). Stacked high bit depth planes store all MSB rows
//! followed by all LSB rows; interleaved planes store little-endian 16-bit
//! samples.

use std::io::{ErrorKind, Read, Write};

use f3kdb_core::Plane;

use crate::error::HostError;
use crate::models::{ClipFormat, Frame};

/// Reads packed frames into pitched [`Frame`]s.
pub struct ClipReader<R> {
    inner: R,
    format: ClipFormat,
    frames_read: usize,
    packed: Vec<u8>,
}

impl<R: Read> ClipReader<R> {
    pub fn new(inner: R, format: ClipFormat) -> Self {
        Self {
            inner,
            format,
            frames_read: 0,
            packed: vec![0; format.packed_frame_len()],
        }
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Next frame, or `None` once `format.frames` frames were read or the
    /// input ended on a frame boundary.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, HostError> {
        if self.frames_read >= self.format.frames {
            return Ok(None);
        }

        let got = fill(&mut self.inner, &mut self.packed)?;
        if got == 0 {
            return Ok(None);
        }
        if got < self.packed.len() {
            return Err(HostError::TruncatedFrame {
                frame: self.frames_read,
                expected: self.packed.len(),
                got,
            });
        }

        let mut frame = Frame::new(&self.format);
        let mut offset = 0;
        for plane in Plane::ALL {
            let buffer = frame.plane_mut(plane);
            let row_bytes = buffer.row_bytes();
            for row in 0..buffer.rows() {
                buffer
                    .row_mut(row)
                    .copy_from_slice(&self.packed[offset..offset + row_bytes]);
                offset += row_bytes;
            }
        }
        self.frames_read += 1;
        Ok(Some(frame))
    }
}

/// Read until `buf` is full or the input ends. Returns the bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, HostError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Writes pitched [`Frame`]s as packed frames.
pub struct ClipWriter<W: Write> {
    inner: W,
    frames_written: usize,
}

impl<W: Write> ClipWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), HostError> {
        for plane in Plane::ALL {
            let buffer = frame.plane(plane);
            for row in 0..buffer.rows() {
                self.inner.write_all(buffer.row(row))?;
            }
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, HostError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
