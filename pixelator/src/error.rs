// THEORY:
// Every fallible operation in the core reports through a single error enum.
// The core has no fatal states: each failure is local to one call, is returned
// synchronously to the immediate caller, and is never retried (the computation
// is deterministic, so a retry cannot change the outcome).
//
// "No image loaded yet" is deliberately NOT represented here. It is the
// steady state of a freshly opened UI, and the engine answers it with an empty
// result instead of an error.

use thiserror::Error;

/// Errors that can occur while sampling, partitioning or rendering an image.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PixelateError {
    /// A block or area has a non-positive width or height.
    #[error("invalid area: {width}x{height} (width and height must be positive)")]
    InvalidArea { width: f64, height: f64 },

    /// The inclusive sample range of an area does not cover a single pixel of the buffer.
    #[error("area ({left}, {top})-({right}, {bottom}) does not intersect the pixel buffer")]
    EmptySample {
        left: f64,
        top: f64,
        right: f64,
        bottom: f64,
    },

    /// A grid size of zero cannot partition anything.
    #[error("grid size must be positive")]
    ZeroGridSize,

    /// The grid size is outside the range the configuration accepts.
    #[error("grid size {size} is outside the supported range {min}..={max}")]
    GridSizeOutOfRange { size: u32, min: u32, max: u32 },

    /// A pixel buffer was created with a zero dimension.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The raw RGBA bytes do not match the declared dimensions.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The worker pool could not accept a task or deliver its result.
    #[error("worker pool unavailable: {0}")]
    WorkerUnavailable(&'static str),
}

/// Result type for pixelation operations.
pub type Result<T> = core::result::Result<T, PixelateError>;
