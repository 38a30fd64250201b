//! Row pipeline driver.
//!
//! Converts a whole image one scanline at a time: decode into an `f32` RGBA
//! row, fix up the alpha convention, optionally run the color transform,
//! then encode into the destination format.

use crate::alpha::{premultiply, unpremultiply};
use crate::buffer::{PixelSlice, PixelSliceMut, check_layout};
use crate::error::{BufferError, ConvertError};
use crate::format::{AlphaMode, MemoryFormat};
use crate::limits::ConvertLimits;
use crate::profile::ColorProfile;
use crate::transform::{ColorTransform, RenderingIntent};

/// Settings for a [`Converter`].
///
/// # Example
///
/// ```
/// use memconvert::{ConvertLimits, ConvertOptions, RenderingIntent};
///
/// let options = ConvertOptions::new()
///     .with_limits(ConvertLimits::none().with_max_pixels(1 << 26))
///     .with_rendering_intent(RenderingIntent::RelativeColorimetric);
/// assert_eq!(options.rendering_intent, RenderingIntent::RelativeColorimetric);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ConvertOptions {
    /// Resource limits checked before any work.
    pub limits: ConvertLimits,
    /// Intent used when the profiles differ. Perceptual by default.
    pub rendering_intent: RenderingIntent,
}

impl ConvertOptions {
    /// Default options: no limits, perceptual intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: ConvertLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the rendering intent.
    pub fn with_rendering_intent(mut self, intent: RenderingIntent) -> Self {
        self.rendering_intent = intent;
        self
    }
}

/// Converts pixel memory between formats and color profiles.
///
/// A converter holds only configuration. Every call owns its scratch row and
/// color transform, so one converter can serve many threads at once.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `height` rows of `width` pixels from `src` into `dest`.
    ///
    /// Padding bytes between rows are neither read nor written. A zero
    /// `width` or `height` returns `Ok(())` without looking at the buffers.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::InvalidArgument`] if a stride is smaller than a
    ///   packed row or a buffer is too short for `height` rows.
    /// - [`ConvertError::LimitExceeded`] if the configured limits reject
    ///   the image.
    /// - [`ConvertError::ColorTransformCreationFailed`] if the profiles
    ///   differ and no transform between them can be built.
    ///
    /// `dest` is untouched when any of these is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn convert(
        &self,
        dest: &mut [u8],
        dest_stride: usize,
        dest_format: MemoryFormat,
        dest_profile: &ColorProfile,
        src: &[u8],
        src_stride: usize,
        src_format: MemoryFormat,
        src_profile: &ColorProfile,
        width: usize,
        height: usize,
    ) -> Result<(), ConvertError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        check_layout(dest.len(), width, height, dest_stride, dest_format)?;
        check_layout(src.len(), width, height, src_stride, src_format)?;
        self.options.limits.check_dimensions(width, height)?;

        let needs_transform = src_profile != dest_profile;
        let scratch_rows: u64 = if needs_transform { 2 } else { 1 };
        let scratch_bytes = (width as u64)
            .saturating_mul(4 * size_of::<f32>() as u64)
            .saturating_mul(scratch_rows);
        self.options.limits.check_scratch(scratch_bytes)?;

        let mut transform =
            ColorTransform::between(src_profile, dest_profile, self.options.rendering_intent)?;

        log::trace!(
            "convert {width}x{height} {src_format} -> {dest_format}, transform: {}",
            transform.is_some()
        );

        let src_desc = src_format.descriptor();
        let dest_desc = dest_format.descriptor();
        let src_row_bytes = width * src_desc.bytes_per_pixel;
        let dest_row_bytes = width * dest_desc.bytes_per_pixel;
        let mut tmp = vec![0f32; width * 4];

        let rows = src.chunks(src_stride).zip(dest.chunks_mut(dest_stride));
        for (src_row, dest_row) in rows.take(height) {
            (src_desc.decode)(&mut tmp, &src_row[..src_row_bytes], width);
            if let Some(transform) = transform.as_mut() {
                if src_desc.alpha == AlphaMode::Premultiplied {
                    unpremultiply(&mut tmp, width);
                }
                transform.apply(&mut tmp, width)?;
                if dest_desc.alpha != AlphaMode::Straight {
                    premultiply(&mut tmp, width);
                }
            } else if src_desc.alpha == AlphaMode::Premultiplied
                && dest_desc.alpha == AlphaMode::Straight
            {
                unpremultiply(&mut tmp, width);
            } else if src_desc.alpha == AlphaMode::Straight
                && dest_desc.alpha != AlphaMode::Straight
            {
                premultiply(&mut tmp, width);
            }
            (dest_desc.encode)(&mut dest_row[..dest_row_bytes], &tmp, width);
        }
        Ok(())
    }

    /// Like [`convert`](Self::convert), with formats given as their stable
    /// `u32` identifiers.
    ///
    /// # Errors
    ///
    /// [`ConvertError::InvalidFormat`] for an unknown identifier, otherwise
    /// as [`convert`](Self::convert).
    #[allow(clippy::too_many_arguments)]
    pub fn convert_raw(
        &self,
        dest: &mut [u8],
        dest_stride: usize,
        dest_format: u32,
        dest_profile: &ColorProfile,
        src: &[u8],
        src_stride: usize,
        src_format: u32,
        src_profile: &ColorProfile,
        width: usize,
        height: usize,
    ) -> Result<(), ConvertError> {
        let dest_format = MemoryFormat::try_from(dest_format)?;
        let src_format = MemoryFormat::try_from(src_format)?;
        self.convert(
            dest,
            dest_stride,
            dest_format,
            dest_profile,
            src,
            src_stride,
            src_format,
            src_profile,
            width,
            height,
        )
    }

    /// Convert between two validated views of equal dimensions.
    ///
    /// # Errors
    ///
    /// [`BufferError::DimensionMismatch`] if the views differ in size,
    /// otherwise as [`convert`](Self::convert).
    pub fn convert_slices(
        &self,
        dest: &mut PixelSliceMut<'_>,
        dest_profile: &ColorProfile,
        src: &PixelSlice<'_>,
        src_profile: &ColorProfile,
    ) -> Result<(), ConvertError> {
        if dest.width() != src.width() || dest.rows() != src.rows() {
            return Err(BufferError::DimensionMismatch.into());
        }
        let (dest_stride, dest_format) = (dest.stride(), dest.format());
        self.convert(
            dest.as_bytes_mut(),
            dest_stride,
            dest_format,
            dest_profile,
            src.as_bytes(),
            src.stride(),
            src.format(),
            src_profile,
            src.width() as usize,
            src.rows() as usize,
        )
    }
}

/// Convert with default options. See [`Converter::convert`].
#[allow(clippy::too_many_arguments)]
pub fn convert(
    dest: &mut [u8],
    dest_stride: usize,
    dest_format: MemoryFormat,
    dest_profile: &ColorProfile,
    src: &[u8],
    src_stride: usize,
    src_format: MemoryFormat,
    src_profile: &ColorProfile,
    width: usize,
    height: usize,
) -> Result<(), ConvertError> {
    Converter::default().convert(
        dest,
        dest_stride,
        dest_format,
        dest_profile,
        src,
        src_stride,
        src_format,
        src_profile,
        width,
        height,
    )
}

/// Convert with default options and raw format identifiers. See
/// [`Converter::convert_raw`].
#[allow(clippy::too_many_arguments)]
pub fn convert_raw(
    dest: &mut [u8],
    dest_stride: usize,
    dest_format: u32,
    dest_profile: &ColorProfile,
    src: &[u8],
    src_stride: usize,
    src_format: u32,
    src_profile: &ColorProfile,
    width: usize,
    height: usize,
) -> Result<(), ConvertError> {
    Converter::default().convert_raw(
        dest,
        dest_stride,
        dest_format,
        dest_profile,
        src,
        src_stride,
        src_format,
        src_profile,
        width,
        height,
    )
}

/// Convert between two views with default options. See
/// [`Converter::convert_slices`].
pub fn convert_slices(
    dest: &mut PixelSliceMut<'_>,
    dest_profile: &ColorProfile,
    src: &PixelSlice<'_>,
    src_profile: &ColorProfile,
) -> Result<(), ConvertError> {
    Converter::default().convert_slices(dest, dest_profile, src, src_profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;
    use crate::limits::LimitExceeded;
    use crate::profile::NamedProfile;

    fn srgb() -> ColorProfile {
        ColorProfile::srgb()
    }

    fn p3() -> ColorProfile {
        ColorProfile::named(NamedProfile::DisplayP3)
    }

    /// Convert a tightly packed `width x height` image.
    fn convert_packed(
        src: &[u8],
        src_format: MemoryFormat,
        dest_format: MemoryFormat,
        width: usize,
        height: usize,
    ) -> Vec<u8> {
        let mut dest = vec![0u8; width * height * dest_format.bytes_per_pixel()];
        convert(
            &mut dest,
            width * dest_format.bytes_per_pixel(),
            dest_format,
            &srgb(),
            src,
            width * src_format.bytes_per_pixel(),
            src_format,
            &srgb(),
            width,
            height,
        )
        .unwrap();
        dest
    }

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    fn f32_values(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn straight_to_premultiplied_rgba() {
        let dest = convert_packed(
            &[255, 0, 0, 128],
            MemoryFormat::R8g8b8a8,
            MemoryFormat::R8g8b8a8Premultiplied,
            1,
            1,
        );
        assert_eq!(dest, [128, 0, 0, 128]);
    }

    #[test]
    fn straight_rgba_to_premultiplied_bgra() {
        let dest = convert_packed(
            &[255, 0, 0, 255, 0, 255, 0, 0],
            MemoryFormat::R8g8b8a8,
            MemoryFormat::B8g8r8a8Premultiplied,
            2,
            1,
        );
        assert_eq!(dest, [0, 0, 255, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn premultiplied_to_straight() {
        let dest = convert_packed(
            &[64, 32, 0, 128],
            MemoryFormat::R8g8b8a8Premultiplied,
            MemoryFormat::A8r8g8b8,
            1,
            1,
        );
        assert_eq!(dest, [128, 128, 64, 0]);
    }

    #[test]
    fn transparent_premultiplied_pixel_keeps_color() {
        let dest = convert_packed(
            &[10, 20, 30, 0],
            MemoryFormat::R8g8b8a8Premultiplied,
            MemoryFormat::R8g8b8a8,
            1,
            1,
        );
        assert_eq!(dest, [10, 20, 30, 0]);
    }

    #[test]
    fn opaque_source_gets_full_alpha() {
        let dest = convert_packed(
            &[1, 2, 3],
            MemoryFormat::B8g8r8,
            MemoryFormat::R8g8b8a8,
            1,
            1,
        );
        assert_eq!(dest, [3, 2, 1, 255]);
    }

    #[test]
    fn straight_to_opaque_composites_on_black() {
        let dest = convert_packed(
            &[255, 255, 255, 128],
            MemoryFormat::R8g8b8a8,
            MemoryFormat::R8g8b8,
            1,
            1,
        );
        assert_eq!(dest, [128, 128, 128]);
    }

    #[test]
    fn eight_bit_to_float() {
        let dest = convert_packed(
            &[255, 0, 51, 255],
            MemoryFormat::R8g8b8a8Premultiplied,
            MemoryFormat::R32g32b32a32FloatPremultiplied,
            1,
            1,
        );
        assert_eq!(f32_values(&dest), [1.0, 0.0, 0.2, 1.0]);
    }

    #[test]
    fn identity_conversion_for_every_format() {
        const HIGH_U16: [u16; 8] = [65535, 65534, 65408, 60000, 32768, 255, 1, 0];
        let (width, height) = (3, 2);
        for format in MemoryFormat::ALL {
            let len = width * height * format.bytes_per_pixel();
            match format {
                MemoryFormat::R16g16b16 | MemoryFormat::R16g16b16a16Premultiplied => {
                    let src: Vec<u8> = (0..len / 2)
                        .flat_map(|i| HIGH_U16[i % HIGH_U16.len()].to_ne_bytes())
                        .collect();
                    let dest = convert_packed(&src, format, format, width, height);
                    for (a, b) in dest.chunks_exact(2).zip(src.chunks_exact(2)) {
                        let a = u16::from_ne_bytes([a[0], a[1]]);
                        let b = u16::from_ne_bytes([b[0], b[1]]);
                        assert!(a == b || a == b + 1, "{format}: {b} -> {a}");
                    }
                }
                MemoryFormat::R16g16b16Float
                | MemoryFormat::R16g16b16a16FloatPremultiplied
                | MemoryFormat::R32g32b32Float
                | MemoryFormat::R32g32b32a32FloatPremultiplied => {
                    // Small bytes keep every float finite.
                    let src: Vec<u8> = (0..len).map(|i| (i * 7 % 0x3b) as u8).collect();
                    let dest = convert_packed(&src, format, format, width, height);
                    assert_eq!(dest, src, "{format}");
                }
                _ => {
                    let src: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
                    let dest = convert_packed(&src, format, format, width, height);
                    assert_eq!(dest, src, "{format}");
                }
            }
        }
    }

    #[test]
    fn stride_padding_does_not_change_result() {
        let (width, height) = (3, 2);
        let src_format = MemoryFormat::R8g8b8a8;
        let dest_format = MemoryFormat::R16g16b16a16Premultiplied;
        let packed: Vec<u8> = (0..24).map(|i| (i * 37 % 256) as u8).collect();
        let expected = convert_packed(&packed, src_format, dest_format, width, height);

        let src_stride = 12 + 5;
        let mut padded_src = vec![0xCDu8; src_stride * 2];
        padded_src[..12].copy_from_slice(&packed[..12]);
        padded_src[src_stride..src_stride + 12].copy_from_slice(&packed[12..]);

        let dest_stride = 24 + 7;
        let mut dest = vec![0xEEu8; dest_stride + 24];
        convert(
            &mut dest,
            dest_stride,
            dest_format,
            &srgb(),
            &padded_src,
            src_stride,
            src_format,
            &srgb(),
            width,
            height,
        )
        .unwrap();

        assert_eq!(&dest[..24], &expected[..24]);
        assert_eq!(&dest[24..dest_stride], &[0xEE; 7]);
        assert_eq!(&dest[dest_stride..], &expected[24..]);
    }

    #[test]
    fn zero_sized_conversion_is_a_no_op() {
        let mut dest: [u8; 0] = [];
        convert(
            &mut dest,
            0,
            MemoryFormat::R8g8b8,
            &srgb(),
            &[],
            0,
            MemoryFormat::R8g8b8a8,
            &p3(),
            0,
            10,
        )
        .unwrap();
    }

    #[test]
    fn stride_too_small_is_invalid_argument() {
        let src = [0u8; 16];
        let mut dest = [0x55u8; 16];
        let err = convert(
            &mut dest,
            7,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            &src,
            8,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            2,
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidArgument(BufferError::StrideTooSmall)
        ));
        assert_eq!(dest, [0x55; 16]);
    }

    #[test]
    fn short_source_is_invalid_argument() {
        let src = [0u8; 15];
        let mut dest = [0u8; 16];
        let err = convert(
            &mut dest,
            8,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            &src,
            8,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            2,
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidArgument(BufferError::InsufficientData)
        ));
    }

    #[test]
    fn unknown_raw_format_is_rejected() {
        let mut dest = [0u8; 4];
        let err = convert_raw(&mut dest, 4, 15, &srgb(), &[0; 4], 4, 5, &srgb(), 1, 1)
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidFormat(15)));
        let err = convert_raw(&mut dest, 4, 5, &srgb(), &[0; 4], 4, 1000, &srgb(), 1, 1)
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidFormat(1000)));
    }

    #[test]
    fn raw_identifiers_convert() {
        let mut dest = [0u8; 4];
        convert_raw(
            &mut dest,
            4,
            MemoryFormat::B8g8r8a8.id(),
            &srgb(),
            &[1, 2, 3, 4],
            4,
            MemoryFormat::R8g8b8a8.id(),
            &srgb(),
            1,
            1,
        )
        .unwrap();
        assert_eq!(dest, [3, 2, 1, 4]);
    }

    #[test]
    fn limits_reject_before_writing() {
        let converter =
            Converter::new(ConvertOptions::new().with_limits(ConvertLimits::none().with_max_pixels(3)));
        let src = [0u8; 16];
        let mut dest = [0x55u8; 16];
        let err = converter
            .convert(
                &mut dest,
                8,
                MemoryFormat::R8g8b8a8,
                &srgb(),
                &src,
                8,
                MemoryFormat::R8g8b8a8,
                &srgb(),
                2,
                2,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::LimitExceeded(LimitExceeded::Pixels { actual: 4, max: 3 })
        ));
        assert_eq!(dest, [0x55; 16]);
    }

    #[test]
    fn scratch_limit_counts_transform_row() {
        // One pixel needs 16 bytes of scratch, 32 with a transform.
        let converter = Converter::new(
            ConvertOptions::new().with_limits(ConvertLimits::none().with_max_scratch_bytes(16)),
        );
        let mut dest = [0u8; 4];
        let same = converter.convert(
            &mut dest,
            4,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            &[0; 4],
            4,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            1,
            1,
        );
        assert!(same.is_ok());
        let err = converter
            .convert(
                &mut dest,
                4,
                MemoryFormat::R8g8b8a8,
                &p3(),
                &[0; 4],
                4,
                MemoryFormat::R8g8b8a8,
                &srgb(),
                1,
                1,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::LimitExceeded(LimitExceeded::Scratch { actual: 32, max: 16 })
        ));
    }

    #[test]
    fn differing_profiles_transform_color() {
        let mut dest = [0u8; 4];
        convert(
            &mut dest,
            4,
            MemoryFormat::R8g8b8a8,
            &p3(),
            &[255, 0, 0, 255],
            4,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            1,
            1,
        )
        .unwrap();
        assert!(dest[0] < 250, "{dest:?}");
        assert!(dest[1] > 20, "{dest:?}");
        assert_eq!(dest[3], 255);
    }

    #[test]
    fn srgb_to_linear_applies_transfer_curve() {
        let linear = ColorProfile::named(NamedProfile::LinearSrgb);
        let mut dest = [0u8; 4];
        convert(
            &mut dest,
            4,
            MemoryFormat::R8g8b8a8,
            &linear,
            &[128, 128, 128, 255],
            4,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            1,
            1,
        )
        .unwrap();
        // sRGB 128 is about 0.216 in linear light.
        for c in &dest[..3] {
            assert!((*c as i32 - 55).abs() <= 1, "{dest:?}");
        }
        assert_eq!(dest[3], 255);

        let mut back = [0u8; 4];
        convert(
            &mut back,
            4,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            &[55, 55, 55, 255],
            4,
            MemoryFormat::R8g8b8a8,
            &linear,
            1,
            1,
        )
        .unwrap();
        for c in &back[..3] {
            assert!((*c as i32 - 128).abs() <= 2, "{back:?}");
        }
    }

    #[test]
    fn gray_icc_profile_cannot_drive_rgba_conversion() {
        let icc = moxcms::ColorProfile::new_gray_with_gamma(2.2).encode().unwrap();
        let gray = ColorProfile::from_icc(icc).unwrap();
        let mut dest = [0x55u8; 8];
        let err = convert(
            &mut dest,
            8,
            MemoryFormat::R8g8b8a8,
            &srgb(),
            &[10, 20, 30, 40, 50, 60, 70, 80],
            8,
            MemoryFormat::R8g8b8a8,
            &gray,
            2,
            1,
        )
        .unwrap_err();
        assert!(
            matches!(err, ConvertError::ColorTransformCreationFailed { .. }),
            "{err:?}"
        );
        assert!(err.to_string().starts_with("failed to create color transform"));
        assert_eq!(dest, [0x55; 8]);
    }

    #[test]
    fn icc_profile_converts_like_its_named_twin() {
        let icc = moxcms::ColorProfile::new_display_p3().encode().unwrap();
        let from_icc = ColorProfile::from_icc(icc).unwrap();
        let src = [255u8, 0, 0, 255, 40, 160, 220, 128];

        let mut via_named = [0u8; 8];
        let mut via_icc = [0u8; 8];
        for (dest, profile) in [(&mut via_named, p3()), (&mut via_icc, from_icc)] {
            convert(
                dest,
                8,
                MemoryFormat::R8g8b8a8,
                &profile,
                &src,
                8,
                MemoryFormat::R8g8b8a8,
                &srgb(),
                2,
                1,
            )
            .unwrap();
        }
        for (a, b) in via_icc.iter().zip(via_named.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 2, "{via_icc:?} vs {via_named:?}");
        }
    }

    #[test]
    fn zero_width_crop_is_a_no_op() {
        let src = PixelBuffer::new(4, 3, MemoryFormat::R8g8b8a8);
        let crop = src.crop_view(2, 0, 0, 3);
        let mut data: [u8; 0] = [];
        let mut dest = PixelSliceMut::new(&mut data, 0, 3, 0, MemoryFormat::B8g8r8).unwrap();
        convert_slices(&mut dest, &p3(), &crop, &srgb()).unwrap();
    }

    #[test]
    fn transparent_pixels_survive_differing_profiles() {
        let src = f32_bytes(&[0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let mut dest = vec![0u8; 32];
        convert(
            &mut dest,
            32,
            MemoryFormat::R32g32b32a32FloatPremultiplied,
            &p3(),
            &src,
            32,
            MemoryFormat::R32g32b32a32FloatPremultiplied,
            &srgb(),
            2,
            1,
        )
        .unwrap();
        let values = f32_values(&dest);
        assert!(values.iter().all(|v| v.is_finite()), "{values:?}");
        assert_eq!(values[3], 0.0);
        assert_eq!(&values[..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn transform_unpremultiplies_then_premultiplies() {
        // Half-transparent white stays half-transparent white: white maps to
        // white and alpha is applied exactly once.
        let mut dest = [0u8; 4];
        convert(
            &mut dest,
            4,
            MemoryFormat::R8g8b8a8Premultiplied,
            &p3(),
            &[128, 128, 128, 128],
            4,
            MemoryFormat::R8g8b8a8Premultiplied,
            &srgb(),
            1,
            1,
        )
        .unwrap();
        for c in &dest[..3] {
            assert!((*c as i32 - 128).abs() <= 2, "{dest:?}");
        }
        assert_eq!(dest[3], 128);
    }

    #[test]
    fn buffer_round_trip_through_wide_gamut() {
        let pixels: Vec<u8> = (0..16u8).flat_map(|i| [i * 16, 255 - i * 8, i * 5, 255]).collect();
        let buffer = PixelBuffer::from_vec(pixels.clone(), 4, 4, MemoryFormat::R8g8b8a8).unwrap();
        let wide = buffer
            .convert_to(MemoryFormat::R32g32b32a32FloatPremultiplied, &srgb(), &p3())
            .unwrap();
        let back = wide
            .convert_to(MemoryFormat::R8g8b8a8, &p3(), &srgb())
            .unwrap();
        for (a, b) in back.into_vec().iter().zip(pixels.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 3, "{a} vs {b}");
        }
    }

    #[test]
    fn slices_must_match_in_size() {
        let src = PixelBuffer::new(2, 2, MemoryFormat::R8g8b8);
        let mut dest = PixelBuffer::new(2, 3, MemoryFormat::R8g8b8);
        let err = Converter::default()
            .convert_slices(&mut dest.as_slice_mut(), &srgb(), &src.as_slice(), &srgb())
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::InvalidArgument(BufferError::DimensionMismatch)
        ));
    }

    #[test]
    fn cropped_view_converts_only_its_region() {
        let mut src = PixelBuffer::new(4, 4, MemoryFormat::R8g8b8);
        {
            let mut view = src.as_slice_mut();
            for y in 0..4 {
                for (x, px) in view.row_mut(y).chunks_exact_mut(3).enumerate() {
                    px.copy_from_slice(&[x as u8, y as u8, 0]);
                }
            }
        }
        let mut dest = PixelBuffer::new(2, 2, MemoryFormat::B8g8r8);
        Converter::default()
            .convert_slices(&mut dest.as_slice_mut(), &srgb(), &src.crop_view(1, 2, 2, 2), &srgb())
            .unwrap();
        assert_eq!(dest.as_slice().row(0), &[0, 2, 1, 0, 2, 2]);
        assert_eq!(dest.as_slice().row(1), &[0, 3, 1, 0, 3, 2]);
    }

    #[test]
    fn bands_convert_in_parallel() {
        use rayon::prelude::*;

        let (width, height) = (5u32, 9u32);
        let pixels: Vec<u8> = (0..width * height * 4).map(|i| (i * 13 % 256) as u8).collect();
        let src = PixelBuffer::from_vec(pixels, width, height, MemoryFormat::R8g8b8a8).unwrap();
        let expected = src
            .convert_to(MemoryFormat::R16g16b16a16FloatPremultiplied, &srgb(), &p3())
            .unwrap()
            .into_vec();

        let converter = Converter::default();
        let mut dest = PixelBuffer::new(width, height, MemoryFormat::R16g16b16a16FloatPremultiplied);
        let band_rows = 2;
        let src_view = src.as_slice();
        dest.as_slice_mut()
            .into_bands(band_rows)
            .into_par_iter()
            .enumerate()
            .try_for_each(|(i, mut band)| {
                let rows = src_view.sub_rows(i as u32 * band_rows, band.rows());
                converter.convert_slices(&mut band, &p3(), &rows, &srgb())
            })
            .unwrap();
        assert_eq!(dest.into_vec(), expected);
    }
}
