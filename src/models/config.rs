use f3kdb_core::{
    DebandError, DitherAlgorithm, OptimizationMode, Params, PixelMode, RandomAlgorithm,
};
use serde::Deserialize;
use std::path::Path;

use crate::error::HostError;

/// Deband settings loaded from a YAML file.
///
/// Every field is optional; anything left out keeps the core default.
/// Enumerated settings use the integer values of the plugin parameters
/// (`dither_algo: 2` is ordered dithering).
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DebandConfig {
    pub range: Option<u16>,
    #[serde(rename = "Y")]
    pub y: Option<u16>,
    #[serde(rename = "Cb")]
    pub cb: Option<u16>,
    #[serde(rename = "Cr")]
    pub cr: Option<u16>,
    #[serde(rename = "grainY")]
    pub grain_y: Option<u16>,
    #[serde(rename = "grainC")]
    pub grain_c: Option<u16>,
    pub sample_mode: Option<u8>,
    pub seed: Option<u32>,
    pub blur_first: Option<bool>,
    pub dynamic_grain: Option<bool>,
    pub opt: Option<i32>,
    pub dither_algo: Option<i32>,
    pub keep_tv_range: Option<bool>,
    pub output_mode: Option<i32>,
    pub output_depth: Option<u8>,
    pub random_algo_ref: Option<i32>,
    pub random_algo_grain: Option<i32>,
    pub random_param_ref: Option<f64>,
    pub random_param_grain: Option<f64>,
    /// Process chroma on a worker thread.
    pub mt: Option<bool>,
}

impl DebandConfig {
    pub fn from_yaml(content: &str) -> Result<Self, HostError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, HostError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(path = %path.display(), "Loaded deband configuration");
        Ok(config)
    }

    /// Fields set in `other` replace the ones in `self`.
    pub fn overlay(self, other: &Self) -> Self {
        Self {
            range: other.range.or(self.range),
            y: other.y.or(self.y),
            cb: other.cb.or(self.cb),
            cr: other.cr.or(self.cr),
            grain_y: other.grain_y.or(self.grain_y),
            grain_c: other.grain_c.or(self.grain_c),
            sample_mode: other.sample_mode.or(self.sample_mode),
            seed: other.seed.or(self.seed),
            blur_first: other.blur_first.or(self.blur_first),
            dynamic_grain: other.dynamic_grain.or(self.dynamic_grain),
            opt: other.opt.or(self.opt),
            dither_algo: other.dither_algo.or(self.dither_algo),
            keep_tv_range: other.keep_tv_range.or(self.keep_tv_range),
            output_mode: other.output_mode.or(self.output_mode),
            output_depth: other.output_depth.or(self.output_depth),
            random_algo_ref: other.random_algo_ref.or(self.random_algo_ref),
            random_algo_grain: other.random_algo_grain.or(self.random_algo_grain),
            random_param_ref: other.random_param_ref.or(self.random_param_ref),
            random_param_grain: other.random_param_grain.or(self.random_param_grain),
            mt: other.mt.or(self.mt),
        }
    }

    /// Convert into core parameters. Enumerated values outside their range
    /// fail with the field name; numeric bounds are checked by the core.
    pub fn to_params(&self) -> Result<Params, DebandError> {
        let mut params = Params::default();
        if let Some(range) = self.range {
            params.range = range;
        }
        if let Some(y) = self.y {
            params.y = y;
        }
        if let Some(cb) = self.cb {
            params.cb = cb;
        }
        if let Some(cr) = self.cr {
            params.cr = cr;
        }
        if let Some(grain_y) = self.grain_y {
            params.grain_y = grain_y;
        }
        if let Some(grain_c) = self.grain_c {
            params.grain_c = grain_c;
        }
        if let Some(sample_mode) = self.sample_mode {
            params.sample_mode = sample_mode;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(blur_first) = self.blur_first {
            params.blur_first = blur_first;
        }
        if let Some(dynamic_grain) = self.dynamic_grain {
            params.dynamic_grain = dynamic_grain;
        }
        if let Some(keep_tv_range) = self.keep_tv_range {
            params.keep_tv_range = keep_tv_range;
        }
        if let Some(opt) = self.opt {
            params.opt = OptimizationMode::try_from(opt)?;
        }
        if let Some(algo) = self.dither_algo {
            params.dither_algo = DitherAlgorithm::try_from(algo)?;
        }
        if let Some(mode) = self.output_mode {
            params.output_mode = Some(PixelMode::try_from(mode)?);
        }
        if let Some(depth) = self.output_depth {
            params.output_depth = Some(depth);
        }
        if let Some(algo) = self.random_algo_ref {
            params.random_algo_ref = RandomAlgorithm::try_from(algo)?;
        }
        if let Some(algo) = self.random_algo_grain {
            params.random_algo_grain = RandomAlgorithm::try_from(algo)?;
        }
        if let Some(param) = self.random_param_ref {
            params.random_param_ref = param;
        }
        if let Some(param) = self.random_param_grain {
            params.random_param_grain = param;
        }
        Ok(params)
    }
}
