//! Resource limits for conversion calls.
//!
//! [`ConvertLimits`] defines caps on the work a single conversion may do.
//! [`LimitExceeded`] is returned when a check fails. Checks run before any
//! pixel is decoded.

use thiserror::Error;

/// Resource limits for a conversion.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use memconvert::ConvertLimits;
///
/// let limits = ConvertLimits::none()
///     .with_max_pixels(100_000_000)
///     .with_max_scratch_bytes(64 * 1024 * 1024);
/// assert!(limits.has_any());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ConvertLimits {
    /// Maximum image width in pixels.
    pub max_width: Option<usize>,
    /// Maximum image height in pixels.
    pub max_height: Option<usize>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes of per-call scratch memory (intermediate rows).
    pub max_scratch_bytes: Option<u64>,
}

impl ConvertLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum image width in pixels.
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum image height in pixels.
    pub fn with_max_height(mut self, height: usize) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum scratch memory in bytes.
    pub fn with_max_scratch_bytes(mut self, bytes: u64) -> Self {
        self.max_scratch_bytes = Some(bytes);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_width.is_some()
            || self.max_height.is_some()
            || self.max_pixels.is_some()
            || self.max_scratch_bytes.is_some()
    }

    /// Check image dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: usize, height: usize) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = (width as u64).saturating_mul(height as u64);
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a scratch allocation estimate against `max_scratch_bytes`.
    pub fn check_scratch(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_scratch_bytes
            && bytes > max
        {
            return Err(LimitExceeded::Scratch { actual: bytes, max });
        }
        Ok(())
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LimitExceeded {
    /// Image width exceeded `max_width`.
    #[error("width {actual} exceeds limit {max}")]
    Width {
        /// Actual width.
        actual: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Image height exceeded `max_height`.
    #[error("height {actual} exceeds limit {max}")]
    Height {
        /// Actual height.
        actual: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Pixel count exceeded `max_pixels`.
    #[error("pixel count {actual} exceeds limit {max}")]
    Pixels {
        /// Actual pixel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Scratch memory exceeded `max_scratch_bytes`.
    #[error("scratch memory {actual} bytes exceeds limit {max}")]
    Scratch {
        /// Estimated scratch bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}
