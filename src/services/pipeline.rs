use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use f3kdb_core::{Core, Params};

use crate::error::HostError;
use crate::models::{ClipFormat, Frame};
use crate::services::{ClipReader, ClipWriter, PlaneScheduler};

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: usize,
    pub elapsed: Duration,
}

/// Clip debanding pipeline: read → deband → write
pub struct DebandPipeline {
    input_format: ClipFormat,
    output_format: ClipFormat,
    core: Arc<Core>,
    scheduler: PlaneScheduler,
}

impl DebandPipeline {
    pub fn new(
        input_format: ClipFormat,
        params: &Params,
        threaded: bool,
    ) -> Result<Self, HostError> {
        let core = match Core::new(&input_format.video_info(), params) {
            Ok(core) => Arc::new(core),
            Err(e) => {
                tracing::error!(%e, "Failed to create deband core");
                return Err(e.into());
            }
        };
        let output_format = input_format.format(core.output_mode(), core.output_depth());
        let scheduler = PlaneScheduler::new(Arc::clone(&core), threaded)?;

        tracing::info!(
            width = input_format.width,
            height = input_format.height,
            frames = input_format.frames,
            tier = %core.cpu_tier(),
            dither = ?core.dither_algorithm(),
            output_depth = core.output_depth(),
            threaded,
            "Deband pipeline ready"
        );

        Ok(Self {
            input_format,
            output_format,
            core,
            scheduler,
        })
    }

    pub fn input_format(&self) -> &ClipFormat {
        &self.input_format
    }

    pub fn output_format(&self) -> &ClipFormat {
        &self.output_format
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    /// Deband every frame of `input` into `output`.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W) -> Result<PipelineStats, HostError> {
        let started = Instant::now();
        let mut reader = ClipReader::new(input, self.input_format);
        let mut writer = ClipWriter::new(output);
        let mut dst = Frame::new(&self.output_format);

        while let Some(src) = reader.read_frame()? {
            let frame_index = reader.frames_read() - 1;
            self.scheduler
                .process_frame(frame_index, &Arc::new(src), &mut dst)?;
            writer.write_frame(&dst)?;
            tracing::debug!(frame = frame_index, "Frame debanded");
        }

        let frames = writer.frames_written();
        writer.finish()?;

        let stats = PipelineStats {
            frames,
            elapsed: started.elapsed(),
        };
        if frames < self.input_format.frames {
            tracing::warn!(
                expected = self.input_format.frames,
                frames,
                "Input ended early"
            );
        }
        tracing::info!(frames, elapsed_ms = stats.elapsed.as_millis() as u64, "Clip processed");
        Ok(stats)
    }

    /// Deband a raw clip file. When `input_format.frames` is 0 the frame
    /// count is derived from the file size.
    pub fn process_file(
        input_format: ClipFormat,
        params: &Params,
        threaded: bool,
        input: &Path,
        output: &Path,
    ) -> Result<PipelineStats, HostError> {
        let file = File::open(input)?;
        let input_format = if input_format.frames == 0 {
            input_format.frames_from_len(file.metadata()?.len())?
        } else {
            input_format
        };
        if input_format.frames == 0 {
            return Err(HostError::UnsupportedFormat(format!(
                "{} holds no frames",
                input.display()
            )));
        }

        let pipeline = Self::new(input_format, params, threaded)?;
        tracing::info!(input = %input.display(), output = %output.display(), "Processing clip");
        pipeline.run(
            BufReader::new(file),
            BufWriter::new(File::create(output)?),
        )
    }
}
