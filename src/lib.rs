//! Pixel memory format conversion with color management.
//!
//! This crate converts rectangular images between fifteen fixed memory
//! formats while optionally moving them between color profiles:
//!
//! - [`MemoryFormat`] / [`FormatDescriptor`] — the closed format set and its
//!   per-format properties (byte size, alignment, alpha convention)
//! - [`PixelSlice`] / [`PixelSliceMut`] / [`PixelBuffer`] — validated strided
//!   views and an owned buffer
//! - [`ColorProfile`] / [`NamedProfile`] — shared, immutable color profiles
//! - [`ColorTransform`] — a per-call transform between two profiles
//! - [`Converter`] / [`convert()`] — the row pipeline driver
//! - [`ConvertLimits`] — resource limit configuration
//!
//! Every conversion decodes a row into a scratch buffer of `f32` RGBA,
//! adjusts alpha, applies the color transform if the profiles differ, and
//! encodes into the destination format. Calls share nothing mutable, so any
//! number of conversions may run concurrently.
//!
//! ```
//! use memconvert::{ColorProfile, MemoryFormat, convert};
//!
//! let src = [255u8, 0, 0, 128];
//! let mut dest = [0u8; 4];
//! let srgb = ColorProfile::srgb();
//! convert(
//!     &mut dest, 4, MemoryFormat::B8g8r8a8Premultiplied, &srgb,
//!     &src, 4, MemoryFormat::R8g8b8a8, &srgb,
//!     1, 1,
//! )?;
//! assert_eq!(dest, [0, 0, 128, 128]);
//! # Ok::<(), memconvert::ConvertError>(())
//! ```

#![forbid(unsafe_code)]

pub mod alpha;
mod buffer;
mod codec;
mod convert;
mod error;
pub mod format;
mod limits;
mod profile;
mod transform;

pub use buffer::{PixelBuffer, PixelSlice, PixelSliceMut};
pub use convert::{ConvertOptions, Converter, convert, convert_raw, convert_slices};
pub use error::{BufferError, ConvertError, ProfileError};
pub use format::{AlphaMode, FormatDescriptor, MemoryFormat};
pub use limits::{ConvertLimits, LimitExceeded};
pub use profile::{ColorProfile, NamedProfile, ProfileSource};
pub use transform::{ColorTransform, RenderingIntent};

// Re-exports for callers handing in typed images.
pub use imgref::{ImgRef, ImgRefMut};
pub use rgb;
