//! In-place alpha convention changes on `f32` RGBA rows.

/// Alpha at or below this is treated as transparent by [`unpremultiply`].
pub const UNPREMULTIPLY_EPSILON: f32 = 1.0 / 255.0;

/// Scale the color channels of the first `count` pixels by their alpha.
#[inline]
pub fn premultiply(rgba: &mut [f32], count: usize) {
    for px in rgba.chunks_exact_mut(4).take(count) {
        let a = px[3];
        px[0] *= a;
        px[1] *= a;
        px[2] *= a;
    }
}

/// Divide the color channels of the first `count` pixels by their alpha.
///
/// Pixels with alpha at or below [`UNPREMULTIPLY_EPSILON`] are left as is.
#[inline]
pub fn unpremultiply(rgba: &mut [f32], count: usize) {
    for px in rgba.chunks_exact_mut(4).take(count) {
        let a = px[3];
        if a > UNPREMULTIPLY_EPSILON {
            px[0] /= a;
            px[1] /= a;
            px[2] /= a;
        }
    }
}
