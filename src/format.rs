//! Memory format registry.
//!
//! [`MemoryFormat`] enumerates the supported pixel layouts. Each variant maps
//! to exactly one static [`FormatDescriptor`] carrying its byte layout, alpha
//! convention, and codec pair.

use core::fmt;
use core::str::FromStr;

use crate::codec::{
    DecodeFn, EncodeFn, F16, F32, NO_ALPHA, U8, U16, decode_pixels, encode_pixels,
};
use crate::error::ConvertError;

/// How a memory format stores alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AlphaMode {
    /// Color channels are pre-scaled by alpha.
    Premultiplied = 0,
    /// Color channels are stored unscaled next to alpha.
    Straight = 1,
    /// No alpha channel; alpha is always 1.
    Opaque = 2,
}

/// Pixel layout in memory.
///
/// Names list channels in byte order for 8-bit formats and in element order
/// for 16- and 32-bit formats, whose elements use native endianness.
///
/// Discriminants are stable identifiers and may be persisted or transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum MemoryFormat {
    /// 8-bit blue, green, red, alpha; premultiplied.
    B8g8r8a8Premultiplied = 0,
    /// 8-bit alpha, red, green, blue; premultiplied.
    A8r8g8b8Premultiplied = 1,
    /// 8-bit red, green, blue, alpha; premultiplied.
    R8g8b8a8Premultiplied = 2,
    /// 8-bit blue, green, red, alpha; straight.
    B8g8r8a8 = 3,
    /// 8-bit alpha, red, green, blue; straight.
    A8r8g8b8 = 4,
    /// 8-bit red, green, blue, alpha; straight.
    R8g8b8a8 = 5,
    /// 8-bit alpha, blue, green, red; straight.
    A8b8g8r8 = 6,
    /// 8-bit red, green, blue.
    R8g8b8 = 7,
    /// 8-bit blue, green, red.
    B8g8r8 = 8,
    /// 16-bit red, green, blue.
    R16g16b16 = 9,
    /// 16-bit red, green, blue, alpha; premultiplied.
    R16g16b16a16Premultiplied = 10,
    /// Half-float red, green, blue.
    R16g16b16Float = 11,
    /// Half-float red, green, blue, alpha; premultiplied.
    R16g16b16a16FloatPremultiplied = 12,
    /// Float red, green, blue.
    R32g32b32Float = 13,
    /// Float red, green, blue, alpha; premultiplied.
    R32g32b32a32FloatPremultiplied = 14,
}

/// Static description of a memory format.
#[derive(Clone, Copy)]
pub struct FormatDescriptor {
    /// Alpha convention.
    pub alpha: AlphaMode,
    /// Bytes per pixel.
    pub bytes_per_pixel: usize,
    /// Required alignment of each channel element.
    pub alignment: usize,
    pub(crate) decode: DecodeFn,
    pub(crate) encode: EncodeFn,
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("alpha", &self.alpha)
            .field("bytes_per_pixel", &self.bytes_per_pixel)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

const fn desc(
    alpha: AlphaMode,
    bytes_per_pixel: usize,
    alignment: usize,
    decode: DecodeFn,
    encode: EncodeFn,
) -> FormatDescriptor {
    FormatDescriptor {
        alpha,
        bytes_per_pixel,
        alignment,
        decode,
        encode,
    }
}

use AlphaMode::{Opaque, Premultiplied, Straight};

/// Indexed by `MemoryFormat as usize`.
static FORMATS: [FormatDescriptor; MemoryFormat::COUNT] = [
    desc(
        Premultiplied,
        4,
        1,
        decode_pixels::<U8, 2, 1, 0, 3>,
        encode_pixels::<U8, 2, 1, 0, 3>,
    ),
    desc(
        Premultiplied,
        4,
        1,
        decode_pixels::<U8, 1, 2, 3, 0>,
        encode_pixels::<U8, 1, 2, 3, 0>,
    ),
    desc(
        Premultiplied,
        4,
        1,
        decode_pixels::<U8, 0, 1, 2, 3>,
        encode_pixels::<U8, 0, 1, 2, 3>,
    ),
    desc(
        Straight,
        4,
        1,
        decode_pixels::<U8, 2, 1, 0, 3>,
        encode_pixels::<U8, 2, 1, 0, 3>,
    ),
    desc(
        Straight,
        4,
        1,
        decode_pixels::<U8, 1, 2, 3, 0>,
        encode_pixels::<U8, 1, 2, 3, 0>,
    ),
    desc(
        Straight,
        4,
        1,
        decode_pixels::<U8, 0, 1, 2, 3>,
        encode_pixels::<U8, 0, 1, 2, 3>,
    ),
    desc(
        Straight,
        4,
        1,
        decode_pixels::<U8, 3, 2, 1, 0>,
        encode_pixels::<U8, 3, 2, 1, 0>,
    ),
    desc(
        Opaque,
        3,
        1,
        decode_pixels::<U8, 0, 1, 2, { NO_ALPHA }>,
        encode_pixels::<U8, 0, 1, 2, { NO_ALPHA }>,
    ),
    desc(
        Opaque,
        3,
        1,
        decode_pixels::<U8, 2, 1, 0, { NO_ALPHA }>,
        encode_pixels::<U8, 2, 1, 0, { NO_ALPHA }>,
    ),
    desc(
        Opaque,
        6,
        2,
        decode_pixels::<U16, 0, 1, 2, { NO_ALPHA }>,
        encode_pixels::<U16, 0, 1, 2, { NO_ALPHA }>,
    ),
    desc(
        Premultiplied,
        8,
        2,
        decode_pixels::<U16, 0, 1, 2, 3>,
        encode_pixels::<U16, 0, 1, 2, 3>,
    ),
    desc(
        Opaque,
        6,
        2,
        decode_pixels::<F16, 0, 1, 2, { NO_ALPHA }>,
        encode_pixels::<F16, 0, 1, 2, { NO_ALPHA }>,
    ),
    desc(
        Premultiplied,
        8,
        2,
        decode_pixels::<F16, 0, 1, 2, 3>,
        encode_pixels::<F16, 0, 1, 2, 3>,
    ),
    desc(
        Opaque,
        12,
        4,
        decode_pixels::<F32, 0, 1, 2, { NO_ALPHA }>,
        encode_pixels::<F32, 0, 1, 2, { NO_ALPHA }>,
    ),
    desc(
        Premultiplied,
        16,
        4,
        decode_pixels::<F32, 0, 1, 2, 3>,
        encode_pixels::<F32, 0, 1, 2, 3>,
    ),
];

impl MemoryFormat {
    /// Number of supported formats.
    pub const COUNT: usize = 15;

    /// Every supported format, in identifier order.
    pub const ALL: [MemoryFormat; Self::COUNT] = [
        Self::B8g8r8a8Premultiplied,
        Self::A8r8g8b8Premultiplied,
        Self::R8g8b8a8Premultiplied,
        Self::B8g8r8a8,
        Self::A8r8g8b8,
        Self::R8g8b8a8,
        Self::A8b8g8r8,
        Self::R8g8b8,
        Self::B8g8r8,
        Self::R16g16b16,
        Self::R16g16b16a16Premultiplied,
        Self::R16g16b16Float,
        Self::R16g16b16a16FloatPremultiplied,
        Self::R32g32b32Float,
        Self::R32g32b32a32FloatPremultiplied,
    ];

    /// Static descriptor for this format.
    #[inline]
    pub fn descriptor(self) -> &'static FormatDescriptor {
        &FORMATS[self as usize]
    }

    /// Bytes per pixel.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        self.descriptor().bytes_per_pixel
    }

    /// Required alignment of each channel element (1, 2, or 4).
    #[inline]
    pub fn alignment(self) -> usize {
        self.descriptor().alignment
    }

    /// Alpha convention.
    #[inline]
    pub fn alpha(self) -> AlphaMode {
        self.descriptor().alpha
    }

    /// Whether this format stores an alpha channel.
    #[inline]
    pub fn has_alpha(self) -> bool {
        self.alpha() != AlphaMode::Opaque
    }

    /// Whether color channels are stored premultiplied by alpha.
    #[inline]
    pub fn is_premultiplied(self) -> bool {
        self.alpha() == AlphaMode::Premultiplied
    }

    /// Stable identifier.
    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Canonical upper-case name, e.g. `R8G8B8A8_PREMULTIPLIED`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::B8g8r8a8Premultiplied => "B8G8R8A8_PREMULTIPLIED",
            Self::A8r8g8b8Premultiplied => "A8R8G8B8_PREMULTIPLIED",
            Self::R8g8b8a8Premultiplied => "R8G8B8A8_PREMULTIPLIED",
            Self::B8g8r8a8 => "B8G8R8A8",
            Self::A8r8g8b8 => "A8R8G8B8",
            Self::R8g8b8a8 => "R8G8B8A8",
            Self::A8b8g8r8 => "A8B8G8R8",
            Self::R8g8b8 => "R8G8B8",
            Self::B8g8r8 => "B8G8R8",
            Self::R16g16b16 => "R16G16B16",
            Self::R16g16b16a16Premultiplied => "R16G16B16A16_PREMULTIPLIED",
            Self::R16g16b16Float => "R16G16B16_FLOAT",
            Self::R16g16b16a16FloatPremultiplied => "R16G16B16A16_FLOAT_PREMULTIPLIED",
            Self::R32g32b32Float => "R32G32B32_FLOAT",
            Self::R32g32b32a32FloatPremultiplied => "R32G32B32A32_FLOAT_PREMULTIPLIED",
        }
    }

    /// Decode `count` pixels from `src` into `cir` (4 floats per pixel).
    ///
    /// Alpha keeps this format's convention.
    ///
    /// # Panics
    ///
    /// Panics if `src` holds fewer than `count` pixels or `cir` fewer than
    /// `count * 4` floats.
    pub fn decode(self, src: &[u8], cir: &mut [f32], count: usize) {
        let desc = self.descriptor();
        assert!(
            src.len() >= count * desc.bytes_per_pixel && cir.len() >= count * 4,
            "decode of {count} {self} pixels out of bounds"
        );
        (desc.decode)(cir, src, count);
    }

    /// Encode `count` pixels from `cir` (4 floats per pixel) into `dest`.
    ///
    /// # Panics
    ///
    /// Panics if `dest` holds fewer than `count` pixels or `cir` fewer than
    /// `count * 4` floats.
    pub fn encode(self, dest: &mut [u8], cir: &[f32], count: usize) {
        let desc = self.descriptor();
        assert!(
            dest.len() >= count * desc.bytes_per_pixel && cir.len() >= count * 4,
            "encode of {count} {self} pixels out of bounds"
        );
        (desc.encode)(dest, cir, count);
    }
}

impl TryFrom<u32> for MemoryFormat {
    type Error = ConvertError;

    fn try_from(id: u32) -> Result<Self, ConvertError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(ConvertError::InvalidFormat(id))
    }
}

impl From<MemoryFormat> for u32 {
    fn from(format: MemoryFormat) -> u32 {
        format.id()
    }
}

impl fmt::Display for MemoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MemoryFormat {
    type Err = ConvertError;

    /// Parse a canonical name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, ConvertError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or(ConvertError::InvalidFormat(u32::MAX))
    }
}

/// Bytes per pixel for a raw format identifier.
pub fn bytes_per_pixel(id: u32) -> Result<usize, ConvertError> {
    MemoryFormat::try_from(id).map(MemoryFormat::bytes_per_pixel)
}

/// Channel alignment for a raw format identifier.
pub fn alignment(id: u32) -> Result<usize, ConvertError> {
    MemoryFormat::try_from(id).map(MemoryFormat::alignment)
}
