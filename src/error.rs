//! Error types for conversion and buffer operations.

use thiserror::Error;

use crate::limits::LimitExceeded;

/// Reasons a pixel buffer description is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BufferError {
    /// Data slice is too small for the given dimensions and stride.
    #[error("data slice is too small for the given dimensions")]
    InsufficientData,
    /// Stride is smaller than `width * bytes_per_pixel`.
    #[error("stride is smaller than width * bytes_per_pixel")]
    StrideTooSmall,
    /// Width or height causes overflow.
    #[error("width or height causes overflow")]
    InvalidDimensions,
    /// Source and destination differ in width or height.
    #[error("source and destination dimensions differ")]
    DimensionMismatch,
}

/// Errors from [`convert`](crate::convert()) and friends.
///
/// Every variant except [`ColorTransformFailed`](Self::ColorTransformFailed)
/// is raised before any destination byte is written.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// Memory format identifier outside the supported set.
    #[error("unknown memory format identifier {0}")]
    InvalidFormat(u32),
    /// Stride, length or dimension precondition violated.
    #[error("invalid buffer argument: {0}")]
    InvalidArgument(#[from] BufferError),
    /// The color management system could not build a transform for the
    /// profile pair.
    #[error("failed to create color transform: {reason}")]
    ColorTransformCreationFailed {
        /// Message from the CMS.
        reason: String,
    },
    /// The color management system rejected a row.
    #[error("color transform failed: {reason}")]
    ColorTransformFailed {
        /// Message from the CMS.
        reason: String,
    },
    /// A configured limit was exceeded.
    #[error(transparent)]
    LimitExceeded(#[from] LimitExceeded),
}

/// Errors from parsing an ICC profile.
#[derive(Debug, Error)]
#[error("invalid ICC profile: {reason}")]
pub struct ProfileError {
    pub(crate) reason: String,
}
