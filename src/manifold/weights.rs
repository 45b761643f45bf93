//! Gaussian range weights against the current manifold centroid.
//!
//! For each pixel, `w_k = exp(−‖joint − eta_k‖² / (2σ²))`. When outlier
//! adjustment is active, the squared distance also feeds a running per-pixel
//! minimum over all manifolds visited so far.
use crate::image::traits::PlaneView;
use crate::image::ImageF32;

/// Compute `w_k` into `dst` from the full-resolution centroid planes.
///
/// `min_dist2` tracks the minimum squared distance to any manifold;
/// `first_manifold` initialises it instead of taking the minimum.
pub fn compute_range_weights(
    joint: &[ImageF32],
    eta: &[ImageF32],
    sigma: f32,
    dst: &mut ImageF32,
    min_dist2: Option<&mut ImageF32>,
    first_manifold: bool,
) {
    debug_assert_eq!(joint.len(), eta.len());
    debug_assert!(!joint.is_empty());
    let arg_const = -0.5 / (sigma * sigma);
    compute_impl(joint, eta, arg_const, dst, min_dist2, first_manifold);
}

/// Squared channel distance for one row, accumulated into `dst_row`.
#[inline]
fn distance_row(joint: &[ImageF32], eta: &[ImageF32], y: usize, dst_row: &mut [f32]) {
    for (cn, (jp, ep)) in joint.iter().zip(eta).enumerate() {
        let j_row = jp.row(y);
        let e_row = ep.row(y);
        if cn == 0 {
            for ((d, &j), &e) in dst_row.iter_mut().zip(j_row).zip(e_row) {
                let diff = e - j;
                *d = diff * diff;
            }
        } else {
            for ((d, &j), &e) in dst_row.iter_mut().zip(j_row).zip(e_row) {
                let diff = e - j;
                *d += diff * diff;
            }
        }
    }
}

#[inline]
fn finish_row(dst_row: &mut [f32], min_row: Option<&mut [f32]>, first: bool, arg_const: f32) {
    if let Some(min_row) = min_row {
        if first {
            min_row.copy_from_slice(dst_row);
        } else {
            for (m, &d) in min_row.iter_mut().zip(dst_row.iter()) {
                *m = m.min(d);
            }
        }
    }
    for d in dst_row.iter_mut() {
        *d = (*d * arg_const).exp();
    }
}

#[cfg(not(feature = "parallel"))]
fn compute_impl(
    joint: &[ImageF32],
    eta: &[ImageF32],
    arg_const: f32,
    dst: &mut ImageF32,
    min_dist2: Option<&mut ImageF32>,
    first_manifold: bool,
) {
    let w = dst.w;
    match min_dist2 {
        Some(min) => {
            for (y, (dst_row, min_row)) in dst
                .data
                .chunks_mut(w)
                .zip(min.data.chunks_mut(w))
                .enumerate()
            {
                distance_row(joint, eta, y, dst_row);
                finish_row(dst_row, Some(min_row), first_manifold, arg_const);
            }
        }
        None => {
            for (y, dst_row) in dst.data.chunks_mut(w).enumerate() {
                distance_row(joint, eta, y, dst_row);
                finish_row(dst_row, None, first_manifold, arg_const);
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn compute_impl(
    joint: &[ImageF32],
    eta: &[ImageF32],
    arg_const: f32,
    dst: &mut ImageF32,
    min_dist2: Option<&mut ImageF32>,
    first_manifold: bool,
) {
    use rayon::prelude::*;

    let w = dst.w;
    match min_dist2 {
        Some(min) => {
            dst.data
                .par_chunks_mut(w)
                .zip(min.data.par_chunks_mut(w))
                .enumerate()
                .for_each(|(y, (dst_row, min_row))| {
                    distance_row(joint, eta, y, dst_row);
                    finish_row(dst_row, Some(min_row), first_manifold, arg_const);
                });
        }
        None => {
            dst.data
                .par_chunks_mut(w)
                .enumerate()
                .for_each(|(y, dst_row)| {
                    distance_row(joint, eta, y, dst_row);
                    finish_row(dst_row, None, first_manifold, arg_const);
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_yields_unit_weight() {
        let joint = vec![ImageF32::full(4, 4, 0.3)];
        let eta = vec![ImageF32::full(4, 4, 0.3)];
        let mut w_k = ImageF32::new(4, 4);
        compute_range_weights(&joint, &eta, 0.2, &mut w_k, None, true);
        for &v in &w_k.data {
            assert!((v - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn weights_decay_with_distance_and_stay_positive() {
        let mut j = ImageF32::new(3, 1);
        j.set(0, 0, 0.0);
        j.set(1, 0, 0.2);
        j.set(2, 0, 0.9);
        let joint = vec![j];
        let eta = vec![ImageF32::new(3, 1)];
        let mut w_k = ImageF32::new(3, 1);
        compute_range_weights(&joint, &eta, 0.3, &mut w_k, None, true);
        assert!(w_k.get(0, 0) > w_k.get(1, 0));
        assert!(w_k.get(1, 0) > w_k.get(2, 0));
        for &v in &w_k.data {
            assert!(v > 0.0 && v <= 1.0);
        }
    }

    #[test]
    fn min_distance_is_monotone_over_manifolds() {
        let joint = vec![ImageF32::full(4, 2, 0.5)];
        let far = vec![ImageF32::full(4, 2, 0.9)];
        let near = vec![ImageF32::full(4, 2, 0.6)];
        let mut w_k = ImageF32::new(4, 2);
        let mut min_d2 = ImageF32::new(4, 2);

        compute_range_weights(&joint, &far, 0.2, &mut w_k, Some(&mut min_d2), true);
        let after_first = min_d2.clone();
        compute_range_weights(&joint, &near, 0.2, &mut w_k, Some(&mut min_d2), false);

        for (&before, &after) in after_first.data.iter().zip(&min_d2.data) {
            assert!(after <= before);
        }
        assert!((min_d2.get(0, 0) - 0.01).abs() < 1e-6);
    }
}
