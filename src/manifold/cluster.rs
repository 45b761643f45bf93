//! PCA-driven cluster splitting.
//!
//! A manifold's pixels are split by the sign of their projection onto the
//! dominant eigenvector of the residuals `joint − eta_full`, estimated with a
//! few power iterations restricted to the parent cluster. The residual matrix
//! is never materialised; rows are recomputed from the planes on the fly.
use super::mask::MaskU8;
use crate::image::ImageF32;
use log::debug;
use nalgebra::DVector;

/// The two child clusters of a split. Disjoint; their union is the parent.
pub struct ClusterPair {
    pub minus: MaskU8,
    pub plus: MaskU8,
}

/// Split `parent` by the sign of the residual projection.
///
/// Zero projections (including the degenerate all-zero eigenvector) land in
/// the plus branch, so the split always covers the parent exactly.
pub fn split_clusters(
    joint: &[ImageF32],
    eta_full: &[ImageF32],
    parent: &MaskU8,
    init: DVector<f32>,
    num_pca_iterations: usize,
) -> ClusterPair {
    let (w, h) = (parent.w, parent.h);
    let v = dominant_eigenvector(joint, eta_full, parent, init, num_pca_iterations);

    let mut minus = MaskU8::new(w, h);
    let mut plus = MaskU8::new(w, h);
    for y in 0..h {
        for x in 0..w {
            if !parent.is_set(x, y) {
                continue;
            }
            let mut proj = 0.0f32;
            for (c, (jp, ep)) in joint.iter().zip(eta_full).enumerate() {
                proj += (jp.get(x, y) - ep.get(x, y)) * v[c];
            }
            if proj < 0.0 {
                minus.set(x, y);
            } else {
                plus.set(x, y);
            }
        }
    }
    ClusterPair { minus, plus }
}

/// Power iteration for the dominant eigenvector of the masked residuals.
///
/// Underflowed norms collapse to the zero vector rather than dividing into
/// NaN; the caller's sign split then routes the whole parent to one branch.
pub fn dominant_eigenvector(
    joint: &[ImageF32],
    eta_full: &[ImageF32],
    mask: &MaskU8,
    init: DVector<f32>,
    num_pca_iterations: usize,
) -> DVector<f32> {
    let cn = joint.len();
    debug_assert_eq!(eta_full.len(), cn);
    debug_assert_eq!(init.len(), cn);
    let (w, h) = (mask.w, mask.h);

    let mut v = init;
    let mut residual = vec![0.0f32; cn];
    for _ in 0..num_pca_iterations.max(1) {
        let mut acc = DVector::<f32>::zeros(cn);
        for y in 0..h {
            for x in 0..w {
                if !mask.is_set(x, y) {
                    continue;
                }
                let mut dot = 0.0f32;
                for (c, (jp, ep)) in joint.iter().zip(eta_full).enumerate() {
                    let r = jp.get(x, y) - ep.get(x, y);
                    residual[c] = r;
                    dot += v[c] * r;
                }
                for (a, &r) in acc.iter_mut().zip(residual.iter()) {
                    *a += dot * r;
                }
            }
        }
        v = acc;
    }

    let n = v.norm();
    if n > f32::MIN_POSITIVE {
        v / n
    } else {
        debug!("power iteration collapsed; routing entire cluster to the plus branch");
        DVector::zeros(cn)
    }
}
