//! Stride-aware pixel buffer views.
//!
//! [`PixelSlice`] and [`PixelSliceMut`] borrow caller memory and carry the
//! [`MemoryFormat`] of their pixels. [`PixelBuffer`] owns a tightly packed
//! buffer. Construction validates stride and length, so conversions on these
//! types can only fail on format or color grounds.

use std::fmt;

use imgref::ImgRef;
use rgb::alt::BGRA;
use rgb::{Rgb, Rgba};

use crate::convert::Converter;
use crate::error::{BufferError, ConvertError};
use crate::format::MemoryFormat;
use crate::profile::ColorProfile;

// ---------------------------------------------------------------------------
// PixelSlice (borrowed, immutable)
// ---------------------------------------------------------------------------

/// Borrowed view of pixel data.
///
/// Represents a region of pixel rows, possibly a sub-region of a larger
/// buffer. All rows share the same stride.
pub struct PixelSlice<'a> {
    data: &'a [u8],
    width: u32,
    rows: u32,
    stride: usize,
    format: MemoryFormat,
}

impl<'a> PixelSlice<'a> {
    /// Create a new pixel slice with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride is smaller than a packed row or the
    /// data is too small for `rows` rows.
    pub fn new(
        data: &'a [u8],
        width: u32,
        rows: u32,
        stride: usize,
        format: MemoryFormat,
    ) -> Result<Self, BufferError> {
        check_layout(data.len(), width as usize, rows as usize, stride, format)?;
        Ok(Self {
            data,
            width,
            rows,
            stride,
            format,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in this slice.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Memory format of the pixels.
    #[inline]
    pub fn format(&self) -> MemoryFormat {
        self.format
    }

    /// Underlying bytes, from the first pixel to the end of the last row.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes for row `y` (no padding, exactly `width * bpp` bytes).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &self.data[start..start + len]
    }

    /// Borrow a sub-range of rows.
    ///
    /// # Panics
    ///
    /// Panics if `y + count > rows`.
    pub fn sub_rows(&self, y: u32, count: u32) -> PixelSlice<'a> {
        assert!(
            y.checked_add(count).is_some_and(|end| end <= self.rows),
            "sub_rows({y}, {count}) out of bounds (rows: {})",
            self.rows
        );
        let data: &'a [u8] = self.data;
        let (start, end) = row_span(y, count, 0, self.width, self.stride, self.format);
        PixelSlice {
            data: &data[start..end],
            width: self.width,
            rows: count,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Zero-copy crop view. Adjusts the data start and width; stride
    /// remains the same as the parent.
    ///
    /// # Panics
    ///
    /// Panics if the crop region is out of bounds.
    pub fn crop_view(&self, x: u32, y: u32, w: u32, h: u32) -> PixelSlice<'a> {
        assert!(
            x.checked_add(w).is_some_and(|end| end <= self.width),
            "crop x={x} w={w} exceeds width {}",
            self.width
        );
        assert!(
            y.checked_add(h).is_some_and(|end| end <= self.rows),
            "crop y={y} h={h} exceeds rows {}",
            self.rows
        );
        let (start, end, stride) = if w == 0 {
            (0, 0, 0)
        } else {
            let (start, end) = row_span(y, h, x, w, self.stride, self.format);
            (start, end, self.stride)
        };
        let data: &'a [u8] = self.data;
        PixelSlice {
            data: &data[start..end],
            width: w,
            rows: h,
            stride,
            format: self.format,
        }
    }
}

impl fmt::Debug for PixelSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelSlice({}x{}, {}, stride {})",
            self.width, self.rows, self.format, self.stride
        )
    }
}

// ---------------------------------------------------------------------------
// PixelSliceMut (borrowed, mutable)
// ---------------------------------------------------------------------------

/// Mutable borrowed view of pixel data.
///
/// Same semantics as [`PixelSlice`] but allows writing to rows.
pub struct PixelSliceMut<'a> {
    data: &'a mut [u8],
    width: u32,
    rows: u32,
    stride: usize,
    format: MemoryFormat,
}

impl<'a> PixelSliceMut<'a> {
    /// Create a new mutable pixel slice with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the stride is smaller than a packed row or the
    /// data is too small for `rows` rows.
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        rows: u32,
        stride: usize,
        format: MemoryFormat,
    ) -> Result<Self, BufferError> {
        check_layout(data.len(), width as usize, rows as usize, stride, format)?;
        Ok(Self {
            data,
            width,
            rows,
            stride,
            format,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in this slice.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Memory format of the pixels.
    #[inline]
    pub fn format(&self) -> MemoryFormat {
        self.format
    }

    /// Underlying bytes, mutable.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Immutable view of the same pixels.
    pub fn as_slice(&self) -> PixelSlice<'_> {
        PixelSlice {
            data: &*self.data,
            width: self.width,
            rows: self.rows,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Pixel bytes for row `y` (immutable, no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &self.data[start..start + len]
    }

    /// Mutable pixel bytes for row `y` (no padding).
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.rows,
            "row index {y} out of bounds (rows: {})",
            self.rows
        );
        let start = y as usize * self.stride;
        let len = self.width as usize * self.format.bytes_per_pixel();
        &mut self.data[start..start + len]
    }

    /// Borrow a mutable sub-range of rows.
    ///
    /// # Panics
    ///
    /// Panics if `y + count > rows`.
    pub fn sub_rows_mut(&mut self, y: u32, count: u32) -> PixelSliceMut<'_> {
        assert!(
            y.checked_add(count).is_some_and(|end| end <= self.rows),
            "sub_rows_mut({y}, {count}) out of bounds (rows: {})",
            self.rows
        );
        let (start, end) = row_span(y, count, 0, self.width, self.stride, self.format);
        PixelSliceMut {
            data: &mut self.data[start..end],
            width: self.width,
            rows: count,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Split into disjoint bands of at most `band_rows` rows each.
    ///
    /// Bands can be converted independently, e.g. on worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `band_rows` is zero.
    pub fn into_bands(self, band_rows: u32) -> Vec<PixelSliceMut<'a>> {
        assert!(band_rows > 0, "band_rows must be non-zero");
        let mut bands = Vec::new();
        let mut rest = self.data;
        let mut remaining = self.rows;
        while remaining > 0 {
            let rows = remaining.min(band_rows);
            remaining -= rows;
            let take = if remaining == 0 {
                rest.len()
            } else {
                rows as usize * self.stride
            };
            let (band, tail) = std::mem::take(&mut rest).split_at_mut(take);
            rest = tail;
            bands.push(PixelSliceMut {
                data: band,
                width: self.width,
                rows,
                stride: self.stride,
                format: self.format,
            });
        }
        bands
    }
}

impl fmt::Debug for PixelSliceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelSliceMut({}x{}, {}, stride {})",
            self.width, self.rows, self.format, self.stride
        )
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer (owned)
// ---------------------------------------------------------------------------

/// Owned, tightly packed pixel buffer with format metadata.
///
/// The backing vec can be recovered with [`into_vec`](Self::into_vec).
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: MemoryFormat,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer for the given dimensions and format.
    pub fn new(width: u32, height: u32, format: MemoryFormat) -> Self {
        let stride = width as usize * format.bytes_per_pixel();
        Self {
            data: vec![0u8; stride * height as usize],
            width,
            height,
            stride,
            format,
        }
    }

    /// Wrap an existing `Vec<u8>` of tightly packed rows.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if the vec is too small.
    pub fn from_vec(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: MemoryFormat,
    ) -> Result<Self, BufferError> {
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or(BufferError::InvalidDimensions)?;
        let total = stride
            .checked_mul(height as usize)
            .ok_or(BufferError::InvalidDimensions)?;
        if data.len() < total {
            return Err(BufferError::InsufficientData);
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    /// Consume the buffer and return the backing `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Memory format of the pixels.
    #[inline]
    pub fn format(&self) -> MemoryFormat {
        self.format
    }

    /// Borrow the full buffer as an immutable [`PixelSlice`].
    pub fn as_slice(&self) -> PixelSlice<'_> {
        let total = self.stride * self.height as usize;
        PixelSlice {
            data: &self.data[..total],
            width: self.width,
            rows: self.height,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Borrow the full buffer as a mutable [`PixelSliceMut`].
    pub fn as_slice_mut(&mut self) -> PixelSliceMut<'_> {
        let total = self.stride * self.height as usize;
        PixelSliceMut {
            data: &mut self.data[..total],
            width: self.width,
            rows: self.height,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Borrow a range of rows as an immutable [`PixelSlice`].
    ///
    /// # Panics
    ///
    /// Panics if `y + count > height`.
    pub fn rows(&self, y: u32, count: u32) -> PixelSlice<'_> {
        assert!(
            y.checked_add(count).is_some_and(|end| end <= self.height),
            "rows({y}, {count}) out of bounds (height: {})",
            self.height
        );
        let (start, end) = row_span(y, count, 0, self.width, self.stride, self.format);
        PixelSlice {
            data: &self.data[start..end],
            width: self.width,
            rows: count,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Zero-copy sub-region view.
    ///
    /// # Panics
    ///
    /// Panics if the crop region is out of bounds.
    pub fn crop_view(&self, x: u32, y: u32, w: u32, h: u32) -> PixelSlice<'_> {
        self.as_slice().crop_view(x, y, w, h)
    }

    /// Convert into a new buffer of another format and color profile.
    ///
    /// This buffer's pixels are interpreted in `src_profile`.
    ///
    /// # Errors
    ///
    /// Fails only if no color transform exists between the profiles.
    pub fn convert_to(
        &self,
        format: MemoryFormat,
        src_profile: &ColorProfile,
        dest_profile: &ColorProfile,
    ) -> Result<PixelBuffer, ConvertError> {
        let mut out = PixelBuffer::new(self.width, self.height, format);
        Converter::default().convert_slices(
            &mut out.as_slice_mut(),
            dest_profile,
            &self.as_slice(),
            src_profile,
        )?;
        Ok(out)
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelBuffer({}x{}, {})", self.width, self.height, self.format)
    }
}

// ---------------------------------------------------------------------------
// ImgRef → PixelSlice (zero-copy From impls)
// ---------------------------------------------------------------------------

macro_rules! impl_from_imgref {
    ($pixel:ty, $format:expr) => {
        impl<'a> From<ImgRef<'a, $pixel>> for PixelSlice<'a> {
            fn from(img: ImgRef<'a, $pixel>) -> Self {
                use rgb::ComponentBytes;
                let bytes = img.buf().as_bytes();
                let byte_stride = img.stride() * std::mem::size_of::<$pixel>();
                PixelSlice {
                    data: bytes,
                    width: img.width() as u32,
                    rows: img.height() as u32,
                    stride: byte_stride,
                    format: $format,
                }
            }
        }

        impl<'a> From<imgref::ImgRefMut<'a, $pixel>> for PixelSliceMut<'a> {
            fn from(img: imgref::ImgRefMut<'a, $pixel>) -> Self {
                use rgb::ComponentBytes;
                let width = img.width() as u32;
                let rows = img.height() as u32;
                let byte_stride = img.stride() * std::mem::size_of::<$pixel>();
                let buf = img.into_buf();
                PixelSliceMut {
                    data: buf.as_bytes_mut(),
                    width,
                    rows,
                    stride: byte_stride,
                    format: $format,
                }
            }
        }
    };
}

impl_from_imgref!(Rgb<u8>, MemoryFormat::R8g8b8);
impl_from_imgref!(Rgba<u8>, MemoryFormat::R8g8b8a8);
impl_from_imgref!(BGRA<u8>, MemoryFormat::B8g8r8a8);
impl_from_imgref!(Rgb<u16>, MemoryFormat::R16g16b16);
impl_from_imgref!(Rgb<f32>, MemoryFormat::R32g32b32Float);

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Validate that `len` bytes hold `rows` rows of `width` pixels at `stride`.
pub(crate) fn check_layout(
    len: usize,
    width: usize,
    rows: usize,
    stride: usize,
    format: MemoryFormat,
) -> Result<(), BufferError> {
    let min_stride = width
        .checked_mul(format.bytes_per_pixel())
        .ok_or(BufferError::InvalidDimensions)?;
    if stride < min_stride {
        return Err(BufferError::StrideTooSmall);
    }
    if rows > 0 && len < required_bytes(rows, stride, min_stride)? {
        return Err(BufferError::InsufficientData);
    }
    Ok(())
}

/// Minimum bytes needed: `(rows - 1) * stride + min_stride`.
fn required_bytes(rows: usize, stride: usize, min_stride: usize) -> Result<usize, BufferError> {
    let preceding = (rows - 1)
        .checked_mul(stride)
        .ok_or(BufferError::InvalidDimensions)?;
    preceding
        .checked_add(min_stride)
        .ok_or(BufferError::InvalidDimensions)
}

/// Byte range covering `count` rows from `y`, pixels `x .. x + w`.
fn row_span(y: u32, count: u32, x: u32, w: u32, stride: usize, format: MemoryFormat) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let bpp = format.bytes_per_pixel();
    let start = y as usize * stride + x as usize * bpp;
    let end = (y as usize + count as usize - 1) * stride + (x as usize + w as usize) * bpp;
    (start, end)
}
