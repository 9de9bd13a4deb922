pub mod frame_io;
pub mod pipeline;
pub mod scheduler;

pub use frame_io::{ClipReader, ClipWriter};
pub use pipeline::{DebandPipeline, PipelineStats};
pub use scheduler::PlaneScheduler;
