use std::path::PathBuf;

use thiserror::Error;

/// Library error type for fbframe operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Geometry discovery exhausted every strategy, or the device node
    /// could not be opened/mapped. Fatal at initialization.
    #[error("framebuffer device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device reports a bit depth this engine cannot render.
    #[error("unsupported framebuffer depth: {0} bpp (expected 16 or 32)")]
    UnsupportedDepth(u32),

    /// An image file could not be decoded or resized. Recoverable; the
    /// photo is skipped and the previous frame stays visible.
    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// One or more configured photo directories are invalid or unreadable.
    #[error("invalid photo directory: {0}")]
    BadDir(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
