//! The deband core: built once per clip, then asked to process planes.

use std::sync::{Mutex, PoisonError};

use super::DebandError;
use crate::codec::{required_len, DestPlane, PixelRange, SourcePlane};
use crate::dispatch::{self, CpuTier};
use crate::dither::DitherContext;
use crate::lut::{self, FrameLut, GrainBuffers};
use crate::params::{DitherAlgorithm, Params, PixelMode, Plane, ResolvedParams, VideoInfo};
use crate::process::{copy_plane, ProcessPlaneFn, ProcessPlaneParams, RefStreamSlot};

/// Validated configuration plus every precomputed table for one clip.
///
/// Construction does all the expensive work: parameter validation, the
/// reference LUTs, the grain pools and routine selection. Afterwards
/// [`process_plane`](Self::process_plane) only reads those tables.
///
/// `Core` is `Send + Sync`. Different planes of a frame may be processed
/// from different threads at the same time. The same plane of the same frame
/// must not be processed concurrently (the call is still memory safe, but
/// the two calls would race on the same destination buffer).
///
/// # Example
///
/// ```
/// use f3kdb_core::{Core, Params, Plane, VideoInfo};
///
/// let video_info = VideoInfo::new(64, 64, 1);
/// let params = Params::default().grain(0, 0);
/// let core = Core::new(&video_info, &params).unwrap();
///
/// let src = vec![128u8; 64 * 64];
/// let mut dst = vec![0u8; 64 * 64];
/// core.process_plane(0, Plane::Y, &mut dst, 64, &src, 64).unwrap();
/// assert!(dst.iter().all(|&p| p == 128));
/// ```
pub struct Core {
    video_info: VideoInfo,
    params: ResolvedParams,
    tier: CpuTier,
    luts: [FrameLut; 3],
    grain: GrainBuffers,
    process_fn: ProcessPlaneFn,
    contexts: [Mutex<Option<DitherContext>>; 3],
    ref_streams: [RefStreamSlot; 3],
}

impl Core {
    /// Validate `params` against `video_info` and build all tables.
    pub fn new(video_info: &VideoInfo, params: &Params) -> Result<Self, DebandError> {
        let resolved = params.resolve(video_info).inspect_err(|e| {
            tracing::warn!(error = %e, code = ?e.code(), "Rejected deband configuration");
        })?;

        let tier = dispatch::resolve(resolved.opt);
        let process_fn = dispatch::select(
            resolved.dither_algo,
            tier,
            resolved.sample_mode,
            resolved.blur_first,
        );
        let (luts, grain) = lut::build_tables(video_info, &resolved);

        tracing::debug!(
            width = video_info.width,
            height = video_info.height,
            frames = video_info.num_frames,
            %tier,
            dither = ?resolved.dither_algo,
            sample_mode = resolved.sample_mode,
            blur_first = resolved.blur_first,
            dynamic_grain = resolved.dynamic_grain,
            "Deband core ready"
        );

        Ok(Self {
            video_info: *video_info,
            params: resolved,
            tier,
            luts,
            grain,
            process_fn,
            contexts: Default::default(),
            ref_streams: Default::default(),
        })
    }

    #[inline]
    pub fn video_info(&self) -> &VideoInfo {
        &self.video_info
    }

    /// Tier actually used after downgrading to hardware support.
    #[inline]
    pub fn cpu_tier(&self) -> CpuTier {
        self.tier
    }

    /// Dither algorithm in effect (16-bit output forces a pass-through one).
    #[inline]
    pub fn dither_algorithm(&self) -> DitherAlgorithm {
        self.params.dither_algo
    }

    /// Layout written by [`process_plane`](Self::process_plane).
    #[inline]
    pub fn output_mode(&self) -> PixelMode {
        self.params.output_mode
    }

    #[inline]
    pub fn output_depth(&self) -> u8 {
        self.params.output_depth
    }

    /// Deband one plane of frame `frame_index` from `src` into `dst`.
    ///
    /// `src` is read in the input layout of the clip and `dst` is written in
    /// the output layout; pitches are in bytes. For the stacked layout the
    /// buffer holds the MSB rows followed by the LSB rows, both with the
    /// same pitch.
    ///
    /// The only error is a buffer or pitch too small for the plane, which is
    /// reported before anything is written.
    pub fn process_plane(
        &self,
        frame_index: usize,
        plane: Plane,
        dst: &mut [u8],
        dst_pitch: usize,
        src: &[u8],
        src_pitch: usize,
    ) -> Result<(), DebandError> {
        let width = self.video_info.plane_width(plane);
        let height = self.video_info.plane_height(plane);
        let input_mode = self.video_info.pixel_mode;
        let output_mode = self.params.output_mode;

        required_len("source", src.len(), src_pitch, width, height, input_mode)?;
        required_len("destination", dst.len(), dst_pitch, width, height, output_mode)?;

        let index = plane.index();
        let threshold = self.params.thresholds[index];
        let grain_amount = match plane {
            Plane::Y => self.params.grain_y,
            Plane::Cb | Plane::Cr => self.params.grain_c,
        };

        if input_mode == output_mode
            && self.video_info.depth == self.params.output_depth
            && grain_amount == 0
            && threshold == 0
        {
            copy_plane(
                dst,
                dst_pitch,
                src,
                src_pitch,
                width * input_mode.bytes_per_sample(),
                height * input_mode.rows_per_row(),
            );
            return Ok(());
        }

        let source = SourcePlane::new(
            src,
            src_pitch,
            width,
            height,
            input_mode,
            self.video_info.depth,
        )?;
        let dest = DestPlane::new(dst, dst_pitch, width, height, output_mode)?;
        let (width_subsampling, height_subsampling) = self.video_info.plane_subsampling(plane);

        let mut context = DitherContext::reuse_or_new(self.take_context(index), src_pitch);
        (self.process_fn)(ProcessPlaneParams {
            src: source,
            dst: dest,
            width,
            height,
            width_subsampling,
            height_subsampling,
            lut: &self.luts[index],
            grain: self.grain.plane_grain(plane, frame_index),
            threshold: i32::from(threshold),
            range: PixelRange::for_plane(plane, self.params.keep_tv_range),
            output_depth: self.params.output_depth,
            context: &mut context,
            ref_stream: &self.ref_streams[index],
        });
        self.return_context(index, context);

        tracing::trace!(frame_index, ?plane, "Processed plane");
        Ok(())
    }

    /// Take the cached context out so no lock is held while processing.
    fn take_context(&self, index: usize) -> Option<DitherContext> {
        self.contexts[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn return_context(&self, index: usize, context: DitherContext) {
        *self.contexts[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(context);
    }
}

impl std::fmt::Debug for Core {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("video_info", &self.video_info)
            .field("tier", &self.tier)
            .field("dither_algo", &self.params.dither_algo)
            .field("output_mode", &self.params.output_mode)
            .field("output_depth", &self.params.output_depth)
            .finish_non_exhaustive()
    }
}
