//! Error types for level generation and map persistence

use thiserror::Error;

/// Errors that can occur while generating, placing or persisting maps.
#[derive(Error, Debug)]
pub enum LevelError {
    /// Grid access outside `[0, width) x [0, height)`.
    #[error("cell ({x}, {y}) is outside a {width}x{height} grid")]
    OutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A layer's parameters violate its algorithm's preconditions.
    #[error("invalid settings for layer {layer}: {reason}")]
    InvalidConfig { layer: usize, reason: String },

    /// Reading or writing a map file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted map data is corrupt, truncated or inconsistent.
    #[error("format error: {0}")]
    Format(String),

    /// A settings file could not be parsed.
    #[error("settings error: {0}")]
    Settings(String),
}

impl LevelError {
    /// Out-of-range access is a programming error; everything else is
    /// reportable to whoever asked for the operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LevelError::OutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, LevelError>;
