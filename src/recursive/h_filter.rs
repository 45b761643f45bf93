//! Separable first-order recursive low-pass.
//!
//! Used to build the root manifold and the cluster-averaged centroids. Each
//! axis gets a forward and a backward sweep of the first-order IIR
//! `y[i] = x[i] + a·(y[i−1] − x[i])` with `a = exp(−√2 / sigma)`, which
//! composes into a reasonably close Gaussian approximation.
use crate::image::traits::PlaneViewMut;
use crate::image::ImageF32;
use std::f32::consts::SQRT_2;

/// Filter `src` with feedback derived from `sigma`, returning a new plane.
pub fn h_filter(src: &ImageF32, sigma: f32) -> ImageF32 {
    let mut dst = src.clone();
    h_filter_in_place(&mut dst, sigma);
    dst
}

/// In-place variant of [`h_filter`].
pub fn h_filter_in_place(img: &mut ImageF32, sigma: f32) {
    let a = (-SQRT_2 / sigma).exp();
    let (w, h) = (img.w, img.h);
    if w == 0 || h == 0 {
        return;
    }

    for row in img.rows_mut() {
        for x in 1..w {
            row[x] += a * (row[x - 1] - row[x]);
        }
        for x in (0..w - 1).rev() {
            row[x] += a * (row[x + 1] - row[x]);
        }
    }

    for y in 1..h {
        let (top, bottom) = img.data.split_at_mut(y * w);
        let prev = &top[(y - 1) * w..];
        let cur = &mut bottom[..w];
        vert_row_pass(cur, prev, a);
    }
    for y in (0..h - 1).rev() {
        let (top, bottom) = img.data.split_at_mut((y + 1) * w);
        let cur = &mut top[y * w..];
        let prev = &bottom[..w];
        vert_row_pass(cur, prev, a);
    }
}

/// One vertical sweep step: blend the current row against the already
/// filtered neighbour row.
#[inline]
fn vert_row_pass(cur: &mut [f32], prev: &[f32], a: f32) {
    for (c, &p) in cur.iter_mut().zip(prev) {
        *c += a * (p - *c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variance(img: &ImageF32) -> f32 {
        let n = img.data.len() as f32;
        let mean = img.data.iter().sum::<f32>() / n;
        img.data.iter().map(|&v| (v - mean) * (v - mean)).sum::<f32>() / n
    }

    #[test]
    fn constant_plane_is_preserved() {
        let img = ImageF32::full(16, 9, 0.75);
        let out = h_filter(&img, 8.0);
        for &v in &out.data {
            assert!((v - 0.75).abs() < 1e-5);
        }
    }

    #[test]
    fn filtering_reduces_variance_of_checkerboard() {
        let mut img = ImageF32::new(16, 16);
        for y in 0..16 {
            for x in 0..16 {
                img.set(x, y, ((x + y) % 2) as f32);
            }
        }
        let out = h_filter(&img, 4.0);
        assert!(variance(&out) < variance(&img) * 0.5);
    }

    #[test]
    fn impulse_spreads_symmetrically_along_a_row() {
        let mut img = ImageF32::new(33, 1);
        img.set(16, 0, 1.0);
        let out = h_filter(&img, 2.0);
        for d in 1..=4 {
            let left = out.get(16 - d, 0);
            let right = out.get(16 + d, 0);
            assert!((left - right).abs() < 1e-5, "asymmetric at offset {d}");
            assert!(left < out.get(16 - d + 1, 0), "not decaying at offset {d}");
        }
    }
}
