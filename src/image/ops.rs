//! Elementwise and geometric primitives on f32 planes.
//!
//! These are the building blocks the pipeline is assembled from: bilinear
//! resize between the full and downsampled grids, products against the range
//! weights, the guarded divide used by normalization steps, and accumulator
//! updates. All helpers assume matching plane dimensions; hot loops run over
//! contiguous rows.
use super::traits::{PlaneView, PlaneViewMut};
use super::ImageF32;

/// Bilinear resize to `dst_w × dst_h` with centre-aligned sampling and
/// border clamping.
pub fn resize_bilinear(src: &ImageF32, dst_w: usize, dst_h: usize) -> ImageF32 {
    let mut dst = ImageF32::new(dst_w, dst_h);
    if src.w == 0 || src.h == 0 || dst_w == 0 || dst_h == 0 {
        return dst;
    }
    if src.w == dst_w && src.h == dst_h {
        dst.data.copy_from_slice(&src.data);
        return dst;
    }

    let scale_x = src.w as f32 / dst_w as f32;
    let scale_y = src.h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        let v = ((dy as f32 + 0.5) * scale_y - 0.5).max(0.0);
        let iv = (v.trunc() as usize).min(src.h - 1);
        let frac_v = v - iv as f32;
        let iv1 = (iv + 1).min(src.h - 1);

        let row0 = src.row(iv);
        let row1 = src.row(iv1);
        let dst_row = dst.row_mut(dy);

        for (dx, out) in dst_row.iter_mut().enumerate() {
            let u = ((dx as f32 + 0.5) * scale_x - 0.5).max(0.0);
            let iu = (u.trunc() as usize).min(src.w - 1);
            let frac_u = u - iu as f32;
            let iu1 = (iu + 1).min(src.w - 1);

            let top = row0[iu] + (row0[iu1] - row0[iu]) * frac_u;
            let bottom = row1[iu] + (row1[iu1] - row1[iu]) * frac_u;
            *out = top + (bottom - top) * frac_v;
        }
    }
    dst
}

/// `a * b`, elementwise.
pub fn multiply(a: &ImageF32, b: &ImageF32) -> ImageF32 {
    debug_assert_eq!((a.w, a.h), (b.w, b.h));
    let mut out = ImageF32::zeros_like(a);
    for ((o, &x), &y) in out.data.iter_mut().zip(&a.data).zip(&b.data) {
        *o = x * y;
    }
    out
}

/// `dst *= m`, elementwise.
pub fn multiply_assign(dst: &mut ImageF32, m: &ImageF32) {
    debug_assert_eq!((dst.w, dst.h), (m.w, m.h));
    for (d, &v) in dst.data.iter_mut().zip(&m.data) {
        *d *= v;
    }
}

/// `dst += a`, elementwise.
pub fn add_assign(dst: &mut ImageF32, a: &ImageF32) {
    debug_assert_eq!((dst.w, dst.h), (a.w, a.h));
    for (d, &v) in dst.data.iter_mut().zip(&a.data) {
        *d += v;
    }
}

/// `num / den` elementwise, substituting 0 where the divisor underflows.
///
/// The substitution keeps NaN out of the manifold centroids and the final
/// reconstruction when a cluster turns out (numerically) empty.
pub fn divide_or_zero(num: &ImageF32, den: &ImageF32) -> ImageF32 {
    debug_assert_eq!((num.w, num.h), (den.w, den.h));
    let mut out = ImageF32::zeros_like(num);
    for ((o, &n), &d) in out.data.iter_mut().zip(&num.data).zip(&den.data) {
        *o = if d.abs() > f32::MIN_POSITIVE { n / d } else { 0.0 };
    }
    out
}

/// Divide in place: `num[i] = num[i] / den[i]`, 0 where the divisor underflows.
pub fn divide_or_zero_assign(num: &mut ImageF32, den: &ImageF32) {
    debug_assert_eq!((num.w, num.h), (den.w, den.h));
    for (n, &d) in num.data.iter_mut().zip(&den.data) {
        *n = if d.abs() > f32::MIN_POSITIVE { *n / d } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, (y * w + x) as f32);
            }
        }
        img
    }

    #[test]
    fn resize_identity_when_sizes_match() {
        let img = ramp(5, 3);
        let out = resize_bilinear(&img, 5, 3);
        assert_eq!(out.data, img.data);
    }

    #[test]
    fn resize_constant_plane_stays_constant() {
        let img = ImageF32::full(8, 8, 3.25);
        let down = resize_bilinear(&img, 3, 3);
        let up = resize_bilinear(&down, 8, 8);
        assert!(down.data.iter().all(|&v| (v - 3.25).abs() < 1e-6));
        assert!(up.data.iter().all(|&v| (v - 3.25).abs() < 1e-6));
    }

    #[test]
    fn resize_downsample_halves_dimensions() {
        let img = ramp(8, 4);
        let down = resize_bilinear(&img, 4, 2);
        assert_eq!((down.w, down.h), (4, 2));
        // samples stay within the input range
        for &v in &down.data {
            assert!((0.0..=31.0).contains(&v));
        }
    }

    #[test]
    fn divide_or_zero_suppresses_zero_divisors() {
        let num = ImageF32::full(2, 1, 4.0);
        let mut den = ImageF32::full(2, 1, 2.0);
        den.set(1, 0, 0.0);
        let out = divide_or_zero(&num, &den);
        assert_eq!(out.data, vec![2.0, 0.0]);
    }
}
