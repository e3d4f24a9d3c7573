use std::path::PathBuf;

/// Errors that can occur while creating or mapping a term buffer.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// A buffer must hold at least one byte.
    #[error("buffer capacity must be greater than zero")]
    ZeroCapacity,

    /// The requested capacity cannot be allocated on this platform.
    #[error("buffer capacity too large ({capacity} bytes)")]
    CapacityTooLarge { capacity: u64 },

    /// Failed to open or size the backing file.
    #[error("failed to open term file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to map the backing file into memory.
    #[error("failed to map term file {path}: {source}")]
    Map {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BufferError>;
