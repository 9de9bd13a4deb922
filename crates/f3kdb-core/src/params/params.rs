//! User-facing deband parameters and their validated, scaled form.

use super::{DitherAlgorithm, OptimizationMode, PixelMode, RandomAlgorithm, VideoInfo};
use crate::api::DebandError;

/// Thresholds and grain amounts are multiplied by this after validation.
pub(crate) const AMOUNT_SCALE_SHIFT: u32 = 2;

/// Largest accepted standard deviation for [`RandomAlgorithm::Gaussian`].
pub const GAUSSIAN_SIGMA_MAX: f64 = 16.0;

/// Deband parameters as the user configures them.
///
/// Fields are public so hosts can fill them from their own configuration
/// format; the builder-style setters below are a convenience for code.
/// Nothing is checked until the parameters are handed to [`Core::new`].
///
/// [`Core::new`]: crate::Core::new
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Maximum reference distance in pixels.
    pub range: u16,
    pub y: u16,
    pub cb: u16,
    pub cr: u16,
    pub grain_y: u16,
    pub grain_c: u16,
    /// 1 samples two references along the column, 2 samples four diagonal ones.
    pub sample_mode: u8,
    pub seed: u32,
    pub blur_first: bool,
    pub dynamic_grain: bool,
    pub opt: OptimizationMode,
    pub dither_algo: DitherAlgorithm,
    pub keep_tv_range: bool,
    /// Derived from `output_depth` (or the input) when `None`.
    pub output_mode: Option<PixelMode>,
    /// Derived from `output_mode` (or the input) when `None`.
    pub output_depth: Option<u8>,
    pub random_algo_ref: RandomAlgorithm,
    pub random_algo_grain: RandomAlgorithm,
    pub random_param_ref: f64,
    pub random_param_grain: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            range: 15,
            y: 64,
            cb: 64,
            cr: 64,
            grain_y: 64,
            grain_c: 64,
            sample_mode: 2,
            seed: 0,
            blur_first: true,
            dynamic_grain: false,
            opt: OptimizationMode::AutoDetect,
            dither_algo: DitherAlgorithm::FloydSteinberg,
            keep_tv_range: false,
            output_mode: None,
            output_depth: None,
            random_algo_ref: RandomAlgorithm::Uniform,
            random_algo_grain: RandomAlgorithm::Uniform,
            random_param_ref: 1.0,
            random_param_grain: 1.0,
        }
    }
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn range(mut self, range: u16) -> Self {
        self.range = range;
        self
    }

    /// Set all three thresholds at once.
    #[inline]
    pub fn threshold(mut self, value: u16) -> Self {
        self.y = value;
        self.cb = value;
        self.cr = value;
        self
    }

    #[inline]
    pub fn thresholds(mut self, y: u16, cb: u16, cr: u16) -> Self {
        self.y = y;
        self.cb = cb;
        self.cr = cr;
        self
    }

    #[inline]
    pub fn grain(mut self, grain_y: u16, grain_c: u16) -> Self {
        self.grain_y = grain_y;
        self.grain_c = grain_c;
        self
    }

    #[inline]
    pub fn sample_mode(mut self, mode: u8) -> Self {
        self.sample_mode = mode;
        self
    }

    #[inline]
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    #[inline]
    pub fn blur_first(mut self, enabled: bool) -> Self {
        self.blur_first = enabled;
        self
    }

    #[inline]
    pub fn dynamic_grain(mut self, enabled: bool) -> Self {
        self.dynamic_grain = enabled;
        self
    }

    #[inline]
    pub fn opt(mut self, opt: OptimizationMode) -> Self {
        self.opt = opt;
        self
    }

    #[inline]
    pub fn dither_algo(mut self, algo: DitherAlgorithm) -> Self {
        self.dither_algo = algo;
        self
    }

    #[inline]
    pub fn keep_tv_range(mut self, enabled: bool) -> Self {
        self.keep_tv_range = enabled;
        self
    }

    /// Request a specific output layout and depth.
    #[inline]
    pub fn output(mut self, mode: PixelMode, depth: u8) -> Self {
        self.output_mode = Some(mode);
        self.output_depth = Some(depth);
        self
    }

    #[inline]
    pub fn random_ref(mut self, algo: RandomAlgorithm, param: f64) -> Self {
        self.random_algo_ref = algo;
        self.random_param_ref = param;
        self
    }

    #[inline]
    pub fn random_grain(mut self, algo: RandomAlgorithm, param: f64) -> Self {
        self.random_algo_grain = algo;
        self.random_param_grain = param;
        self
    }

    /// Check every field against `video_info` and produce the internal form.
    pub(crate) fn resolve(&self, video_info: &VideoInfo) -> Result<ResolvedParams, DebandError> {
        video_info.validate()?;

        let output_mode = match (self.output_mode, self.output_depth) {
            (Some(mode), _) => mode,
            (None, Some(depth)) => PixelMode::default_for_depth(depth),
            (None, None) => video_info.pixel_mode,
        };
        let output_depth = match (self.output_depth, self.output_mode) {
            (Some(depth), _) => depth,
            (None, Some(mode)) => mode.default_depth(),
            (None, None) => video_info.depth,
        };

        if output_depth == 8 && output_mode != PixelMode::LowBitDepth {
            return Err(DebandError::InvalidState(
                "output_mode > LOW_BIT_DEPTH && output_depth == 8",
            ));
        }
        if output_depth > 8 && output_mode == PixelMode::LowBitDepth {
            return Err(DebandError::InvalidState(
                "output_mode == LOW_BIT_DEPTH && output_depth > 8",
            ));
        }

        let mut dither_algo = self.dither_algo;
        if output_depth == 16 {
            dither_algo = match output_mode {
                PixelMode::HighBitDepthInterleaved => DitherAlgorithm::Interleaved16,
                _ => DitherAlgorithm::Stacked16,
            };
        } else if dither_algo.is_16bit() {
            return Err(DebandError::InvalidState(
                "16-bit dither algorithm requires output_depth == 16",
            ));
        }

        DebandError::check_range("range", self.range.into(), 0, 31)?;
        DebandError::check_range("Y", self.y.into(), 0, 511)?;
        DebandError::check_range("Cb", self.cb.into(), 0, 511)?;
        DebandError::check_range("Cr", self.cr.into(), 0, 511)?;
        DebandError::check_range("grainY", self.grain_y.into(), 0, 4096)?;
        DebandError::check_range("grainC", self.grain_c.into(), 0, 4096)?;
        DebandError::check_range("sample_mode", self.sample_mode.into(), 1, 2)?;
        if output_mode != PixelMode::LowBitDepth {
            DebandError::check_range("output_depth", output_depth.into(), 9, 16)?;
        }
        // Gaussian draws are rejection-sampled against sigma; an unbounded
        // sigma never yields a value inside (-1, 1).
        if self.random_algo_ref == RandomAlgorithm::Gaussian {
            DebandError::check_float_range(
                "random_param_ref",
                self.random_param_ref,
                0.0,
                GAUSSIAN_SIGMA_MAX,
            )?;
        }
        if self.random_algo_grain == RandomAlgorithm::Gaussian {
            DebandError::check_float_range(
                "random_param_grain",
                self.random_param_grain,
                0.0,
                GAUSSIAN_SIGMA_MAX,
            )?;
        }

        Ok(ResolvedParams {
            range: self.range,
            thresholds: [
                self.y << AMOUNT_SCALE_SHIFT,
                self.cb << AMOUNT_SCALE_SHIFT,
                self.cr << AMOUNT_SCALE_SHIFT,
            ],
            grain_y: self.grain_y << AMOUNT_SCALE_SHIFT,
            grain_c: self.grain_c << AMOUNT_SCALE_SHIFT,
            sample_mode: self.sample_mode,
            seed: self.seed,
            blur_first: self.blur_first,
            dynamic_grain: self.dynamic_grain,
            opt: self.opt,
            dither_algo,
            keep_tv_range: self.keep_tv_range,
            output_mode,
            output_depth,
            random_algo_ref: self.random_algo_ref,
            random_algo_grain: self.random_algo_grain,
            random_param_ref: self.random_param_ref,
            random_param_grain: self.random_param_grain,
        })
    }
}

/// Validated parameters with amounts already in the internal 16-bit scale.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedParams {
    pub range: u16,
    /// Indexed by [`Plane::index`](crate::Plane::index).
    pub thresholds: [u16; 3],
    pub grain_y: u16,
    pub grain_c: u16,
    pub sample_mode: u8,
    pub seed: u32,
    pub blur_first: bool,
    pub dynamic_grain: bool,
    pub opt: OptimizationMode,
    pub dither_algo: DitherAlgorithm,
    pub keep_tv_range: bool,
    pub output_mode: PixelMode,
    pub output_depth: u8,
    pub random_algo_ref: RandomAlgorithm,
    pub random_algo_grain: RandomAlgorithm,
    pub random_param_ref: f64,
    pub random_param_grain: f64,
}
