//! Per-channel codecs between memory bytes and the `f32` RGBA row.
//!
//! One generic decoder and one generic encoder cover every format. They are
//! parameterized over the channel storage type and the byte-order position of
//! each channel; the format table stores the monomorphized function pointers.
//!
//! No premultiplication happens here. Alpha is passed through in whatever
//! convention the memory format uses.

use half::f16;

/// Channel position meaning "this format has no alpha channel".
pub(crate) const NO_ALPHA: usize = usize::MAX;

/// Decode `n` pixels from memory into `n * 4` floats.
pub(crate) type DecodeFn = fn(&mut [f32], &[u8], usize);

/// Encode `n * 4` floats into `n` pixels of memory.
pub(crate) type EncodeFn = fn(&mut [u8], &[f32], usize);

/// Storage type of a single channel.
pub(crate) trait Channel {
    /// Bytes per channel.
    const SIZE: usize;

    /// Read one channel from the start of `bytes`.
    fn read(bytes: &[u8]) -> f32;

    /// Write one channel to the start of `out`.
    fn write(value: f32, out: &mut [u8]);
}

/// 8-bit unsigned normalized.
pub(crate) struct U8;

/// 16-bit unsigned normalized, native byte order.
pub(crate) struct U16;

/// IEEE-754 binary16, native byte order.
pub(crate) struct F16;

/// IEEE-754 binary32, native byte order.
pub(crate) struct F32;

// Integer encodes scale by `max + 1` then clamp to `[0, max]` and truncate.
// 8-bit values survive `encode(decode(v))` exactly; 16-bit values may come
// back one step high.

impl Channel for U8 {
    const SIZE: usize = 1;

    #[inline]
    fn read(bytes: &[u8]) -> f32 {
        bytes[0] as f32 / 255.0
    }

    #[inline]
    fn write(value: f32, out: &mut [u8]) {
        out[0] = (value * 256.0).clamp(0.0, 255.0) as u8;
    }
}

impl Channel for U16 {
    const SIZE: usize = 2;

    #[inline]
    fn read(bytes: &[u8]) -> f32 {
        u16::from_ne_bytes([bytes[0], bytes[1]]) as f32 / 65535.0
    }

    #[inline]
    fn write(value: f32, out: &mut [u8]) {
        let v = (value * 65536.0).clamp(0.0, 65535.0) as u16;
        out[..2].copy_from_slice(&v.to_ne_bytes());
    }
}

impl Channel for F16 {
    const SIZE: usize = 2;

    #[inline]
    fn read(bytes: &[u8]) -> f32 {
        f16::from_bits(u16::from_ne_bytes([bytes[0], bytes[1]])).to_f32()
    }

    #[inline]
    fn write(value: f32, out: &mut [u8]) {
        out[..2].copy_from_slice(&f16::from_f32(value).to_bits().to_ne_bytes());
    }
}

impl Channel for F32 {
    const SIZE: usize = 4;

    #[inline]
    fn read(bytes: &[u8]) -> f32 {
        f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[inline]
    fn write(value: f32, out: &mut [u8]) {
        out[..4].copy_from_slice(&value.to_ne_bytes());
    }
}

#[inline]
const fn pixel_size<C: Channel>(a: usize) -> usize {
    C::SIZE * if a == NO_ALPHA { 3 } else { 4 }
}

/// Decode pixels whose red, green, blue and alpha channels sit at channel
/// indices `R`, `G`, `B`, `A`. `A == NO_ALPHA` decodes alpha as `1.0`.
pub(crate) fn decode_pixels<
    C: Channel,
    const R: usize,
    const G: usize,
    const B: usize,
    const A: usize,
>(
    dest: &mut [f32],
    src: &[u8],
    n: usize,
) {
    let bpp = pixel_size::<C>(A);
    for (px, out) in src
        .chunks_exact(bpp)
        .zip(dest.chunks_exact_mut(4))
        .take(n)
    {
        out[0] = C::read(&px[R * C::SIZE..]);
        out[1] = C::read(&px[G * C::SIZE..]);
        out[2] = C::read(&px[B * C::SIZE..]);
        out[3] = if A == NO_ALPHA {
            1.0
        } else {
            C::read(&px[A * C::SIZE..])
        };
    }
}

/// Inverse of [`decode_pixels`]. Alpha is dropped when `A == NO_ALPHA`.
pub(crate) fn encode_pixels<
    C: Channel,
    const R: usize,
    const G: usize,
    const B: usize,
    const A: usize,
>(
    dest: &mut [u8],
    src: &[f32],
    n: usize,
) {
    let bpp = pixel_size::<C>(A);
    for (px, rgba) in dest
        .chunks_exact_mut(bpp)
        .zip(src.chunks_exact(4))
        .take(n)
    {
        C::write(rgba[0], &mut px[R * C::SIZE..]);
        C::write(rgba[1], &mut px[G * C::SIZE..]);
        C::write(rgba[2], &mut px[B * C::SIZE..]);
        if A != NO_ALPHA {
            C::write(rgba[3], &mut px[A * C::SIZE..]);
        }
    }
}
