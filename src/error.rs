use f3kdb_core::DebandError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Deband error: {0}")]
    Deband(#[from] DebandError),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Unsupported clip format: {0}")]
    UnsupportedFormat(String),

    #[error("Truncated clip: frame {frame} has {got} of {expected} bytes")]
    TruncatedFrame {
        frame: usize,
        expected: usize,
        got: usize,
    },

    #[error("Chroma worker stopped")]
    WorkerStopped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
