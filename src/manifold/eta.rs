//! Manifold centroid construction.
//!
//! A child manifold's centroid is a weighted low-pass of the guide channels
//! on the downsampled grid, weighted by `teta = 1 − w_k` restricted to the
//! child cluster: pixels the parent manifold already represents well
//! contribute little to where the child centroid lands.
use super::mask::MaskU8;
use crate::image::ops::{divide_or_zero_assign, resize_bilinear};
use crate::image::ImageF32;
use crate::recursive::h_filter_in_place;

/// Compute the child centroid planes at the working resolution.
///
/// `sigma` is the spatial deviation already rescaled to the downsampled grid.
/// Where the blurred cluster weight underflows, the centroid value is 0; a
/// NaN must never leave this function.
pub fn compute_eta(
    teta: &ImageF32,
    cluster: &MaskU8,
    joint: &[ImageF32],
    sigma: f32,
    small_w: usize,
    small_h: usize,
) -> Vec<ImageF32> {
    debug_assert_eq!((teta.w, teta.h), (cluster.w, cluster.h));

    let mut teta_masked = ImageF32::zeros_like(teta);
    for ((m, &t), &c) in teta_masked
        .data
        .iter_mut()
        .zip(&teta.data)
        .zip(&cluster.data)
    {
        if c != 0 {
            *m = t;
        }
    }

    let mut weight_blur = resize_bilinear(&teta_masked, small_w, small_h);
    h_filter_in_place(&mut weight_blur, sigma);

    let mut scratch = ImageF32::zeros_like(teta);
    joint
        .iter()
        .map(|plane| {
            for ((s, &m), &j) in scratch
                .data
                .iter_mut()
                .zip(&teta_masked.data)
                .zip(&plane.data)
            {
                *s = m * j;
            }
            let mut eta = resize_bilinear(&scratch, small_w, small_h);
            h_filter_in_place(&mut eta, sigma);
            divide_or_zero_assign(&mut eta, &weight_blur);
            eta
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_guide_yields_constant_centroid() {
        let teta = ImageF32::full(8, 8, 1.0);
        let cluster = MaskU8::all_set(8, 8);
        let joint = vec![ImageF32::full(8, 8, 0.7)];
        let eta = compute_eta(&teta, &cluster, &joint, 2.0, 4, 4);
        assert_eq!(eta.len(), 1);
        assert_eq!((eta[0].w, eta[0].h), (4, 4));
        for &v in &eta[0].data {
            assert!((v - 0.7).abs() < 1e-4, "centroid {v} should stay at 0.7");
        }
    }

    #[test]
    fn empty_cluster_produces_zeros_not_nan() {
        let teta = ImageF32::full(8, 8, 1.0);
        let cluster = MaskU8::new(8, 8);
        let joint = vec![ImageF32::full(8, 8, 0.7)];
        let eta = compute_eta(&teta, &cluster, &joint, 2.0, 4, 4);
        for &v in &eta[0].data {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn centroid_tracks_the_cluster_side() {
        // guide: 0.2 on the left half, 0.8 on the right; cluster = left half
        let (w, h) = (16, 8);
        let mut guide = ImageF32::new(w, h);
        let mut cluster = MaskU8::new(w, h);
        for y in 0..h {
            for x in 0..w {
                guide.set(x, y, if x < w / 2 { 0.2 } else { 0.8 });
                if x < w / 2 {
                    cluster.set(x, y);
                }
            }
        }
        let teta = ImageF32::full(w, h, 1.0);
        let eta = compute_eta(&teta, &cluster, &[guide], 2.0, 8, 4);
        // well inside the cluster the centroid matches the cluster's value
        assert!((eta[0].get(1, 2) - 0.2).abs() < 0.05);
        // the ratio can never overshoot the masked guide values
        for &v in &eta[0].data {
            assert!(v.is_finite());
            assert!((-0.01..=0.81).contains(&v), "centroid {v} out of range");
        }
    }
}
