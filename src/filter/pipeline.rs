//! Adaptive manifold filter pipeline.
//!
//! The [`AdaptiveManifoldFilter`] exposes a simple API: feed a source image
//! (plus an optional guide) and get the edge-aware smoothed result at the
//! source depth. Internally it coordinates:
//!
//! - Setup: parameter validation, plane splitting and normalization, scale
//!   selection (downsampling ratio, working-grid size, tree height), and
//!   deterministic RNG seeding from the guide itself.
//! - The recursive tree walk over manifolds: per node, range weights →
//!   splatting → domain-transform blur on the working grid → slicing into the
//!   running accumulators; non-leaf nodes then split their cluster by PCA
//!   sign and descend minus-first.
//! - Assembly: the per-pixel weighted average, optionally blended back
//!   toward the input where no manifold represented a pixel well.
//!
//! Typical usage:
//! ```no_run
//! use manifold_filter::{AdaptiveManifoldFilter, AmfOptions};
//! use manifold_filter::image::ImageRef;
//!
//! # fn example(src: ImageRef<'_>) -> Result<(), manifold_filter::FilterError> {
//! let mut filter = AdaptiveManifoldFilter::new(AmfOptions::default());
//! let out = filter.filter(&src, None)?;
//! # let _ = out;
//! # Ok(())
//! # }
//! ```

use super::options::{manifold_tree_height, resize_ratio, small_size, AmfOptions};
use super::workspace::FilterWorkspace;
use crate::error::FilterError;
use crate::image::ops::{add_assign, divide_or_zero, multiply, multiply_assign, resize_bilinear};
use crate::image::{ImageBuf, ImageF32, ImageRef, PixelDepth};
use crate::manifold::{compute_eta, compute_range_weights, split_clusters, MaskU8};
use crate::recursive::{h_filter, DtFilterRf};
use log::debug;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::SQRT_2;

/// Edge-aware smoother projecting pixels onto a binary tree of adaptive
/// manifolds.
pub struct AdaptiveManifoldFilter {
    options: AmfOptions,
    workspace: FilterWorkspace,
}

impl AdaptiveManifoldFilter {
    /// Create a filter with the supplied parameters.
    pub fn new(options: AmfOptions) -> Self {
        Self {
            options,
            workspace: FilterWorkspace::new(),
        }
    }

    /// Current parameters.
    pub fn options(&self) -> &AmfOptions {
        &self.options
    }

    /// Update the spatial standard deviation.
    pub fn set_sigma_s(&mut self, sigma_s: f64) {
        self.options.sigma_s = sigma_s;
    }

    /// Update the range standard deviation.
    pub fn set_sigma_r(&mut self, sigma_r: f64) {
        self.options.sigma_r = sigma_r;
    }

    /// Update the manifold tree height (<= 0 selects the heuristic).
    pub fn set_tree_height(&mut self, tree_height: i32) {
        self.options.tree_height = tree_height;
    }

    /// Update the power-iteration count.
    pub fn set_num_pca_iterations(&mut self, iterations: usize) {
        self.options.num_pca_iterations = iterations;
    }

    /// Toggle the outlier-adjusted reconstruction.
    pub fn set_adjust_outliers(&mut self, adjust: bool) {
        self.options.adjust_outliers = adjust;
    }

    /// Toggle the random PCA init vector.
    pub fn set_use_rng(&mut self, use_rng: bool) {
        self.options.use_rng = use_rng;
    }

    /// Update the domain-transform iteration count K.
    pub fn set_dt_iterations(&mut self, iterations: usize) {
        self.options.dt_iterations = iterations.max(1);
    }

    /// Filter `src` guided by `joint` (the source itself when `None`).
    ///
    /// The output matches the source in size, channel count, and depth.
    pub fn filter(
        &mut self,
        src: &ImageRef<'_>,
        joint: Option<&ImageRef<'_>>,
    ) -> Result<ImageBuf, FilterError> {
        self.options.validate()?;
        if src.is_empty() {
            return Err(FilterError::EmptySource);
        }
        if let Some(j) = joint {
            if j.w != src.w || j.h != src.h {
                return Err(FilterError::JointSizeMismatch {
                    src_w: src.w,
                    src_h: src.h,
                    joint_w: j.w,
                    joint_h: j.h,
                });
            }
        }

        // Source planes keep their native units; guide planes are
        // normalized into [0, 1] so sigma_r is depth independent.
        let src_cn = src.split_planes(1.0);
        let joint_cn = match joint {
            Some(j) => j.split_planes(j.depth().normalizer()),
            None => match src.depth() {
                PixelDepth::F32 => src_cn.clone(),
                depth => src.split_planes(depth.normalizer()),
            },
        };

        let opts = &self.options;
        let df = resize_ratio(opts.sigma_s, opts.sigma_r);
        let (small_w, small_h) = small_size(src.w, src.h, df);
        let tree_height = if opts.tree_height <= 0 {
            manifold_tree_height(opts.sigma_s, opts.sigma_r)
        } else {
            opts.tree_height
        };
        let sigma_r_over_sqrt_2 = (opts.sigma_r / SQRT_2) as f32;

        // Reproducible across runs on the same input: the RNG state is a
        // function of one guide sample at the image centre.
        let seed_coef = joint_cn[0].get(src.w / 2, src.h / 2);
        let seed = ((u64::MAX / 0xFFFF) as f64 * seed_coef as f64) as u64;
        let rng = StdRng::seed_from_u64(seed);

        debug!(
            "amf: {}x{}x{} -> working grid {}x{} (df={df}), tree height {tree_height}",
            src.w,
            src.h,
            src.channels,
            small_w,
            small_h
        );

        self.workspace
            .reset(src.w, src.h, src_cn.len(), opts.adjust_outliers);

        let mut walk = TreeWalk {
            src_cn: &src_cn,
            joint_cn: &joint_cn,
            eta_full: Vec::new(),
            src_w: src.w,
            src_h: src.h,
            small_w,
            small_h,
            sigma_s_small: (opts.sigma_s / df) as f32,
            sigma_r_over_sqrt_2,
            tree_height,
            num_pca_iterations: opts.num_pca_iterations.max(1),
            use_rng: opts.use_rng,
            dt_iterations: opts.dt_iterations.max(1),
            rng,
            workspace: &mut self.workspace,
        };

        let eta_0 = joint_cn
            .iter()
            .map(|plane| h_filter(plane, opts.sigma_s as f32))
            .collect();
        let cluster_0 = MaskU8::all_set(src.w, src.h);
        walk.build_manifolds(eta_0, cluster_0, 1);

        let dst_planes = self.gather_result(&src_cn);
        Ok(ImageBuf::merge_planes(&dst_planes, src.depth()))
    }

    /// Release every workspace buffer; the next call re-allocates on demand.
    pub fn collect_garbage(&mut self) {
        self.workspace.release();
    }

    /// Divide the accumulators into the final planes, optionally blending
    /// back toward the input where the nearest manifold is still far away.
    fn gather_result(&mut self, src_cn: &[ImageF32]) -> Vec<ImageF32> {
        let ws = &mut self.workspace;
        if !self.options.adjust_outliers {
            return ws
                .sum_wk_psi
                .iter()
                .map(|p| divide_or_zero(p, &ws.sum_wk))
                .collect();
        }

        let sigma_r = self.options.sigma_r as f32;
        let alpha = ws
            .min_dist2
            .as_mut()
            .expect("outlier buffer allocated in reset");
        for v in &mut alpha.data {
            *v = (*v * (-0.5 / (sigma_r * sigma_r))).exp();
        }

        src_cn
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let mut g = divide_or_zero(&ws.sum_wk_psi[i], &ws.sum_wk);
                for ((gv, &fv), &av) in g.data.iter_mut().zip(&f.data).zip(&alpha.data) {
                    *gv = av * (*gv - fv) + fv;
                }
                g
            })
            .collect()
    }
}

/// One filter invocation's tree recursion, borrowing the split planes and
/// the filter's workspace.
struct TreeWalk<'a> {
    src_cn: &'a [ImageF32],
    joint_cn: &'a [ImageF32],
    /// Current node's centroid at source resolution; rewritten per node.
    eta_full: Vec<ImageF32>,
    src_w: usize,
    src_h: usize,
    small_w: usize,
    small_h: usize,
    sigma_s_small: f32,
    sigma_r_over_sqrt_2: f32,
    tree_height: i32,
    num_pca_iterations: usize,
    use_rng: bool,
    dt_iterations: usize,
    rng: StdRng,
    workspace: &'a mut FilterWorkspace,
}

impl TreeWalk<'_> {
    /// Process one manifold and, below the leaf level, its two children.
    ///
    /// Children are visited minus-first; the parent's centroid, cluster and
    /// working-grid buffers are dropped before descending so peak memory
    /// scales with the tree depth rather than the node count.
    fn build_manifolds(&mut self, eta: Vec<ImageF32>, cluster: MaskU8, level: i32) {
        let at_src_res = eta[0].w == self.src_w && eta[0].h == self.src_h;
        let first_manifold = level == 1;

        let eta_small: Vec<ImageF32> = if at_src_res {
            compute_range_weights(
                self.joint_cn,
                &eta,
                self.sigma_r_over_sqrt_2,
                &mut self.workspace.w_k,
                self.workspace.min_dist2.as_mut(),
                first_manifold,
            );
            self.eta_full = eta;
            self.eta_full
                .iter()
                .map(|p| resize_bilinear(p, self.small_w, self.small_h))
                .collect()
        } else {
            self.eta_full = eta
                .iter()
                .map(|p| resize_bilinear(p, self.src_w, self.src_h))
                .collect();
            compute_range_weights(
                self.joint_cn,
                &self.eta_full,
                self.sigma_r_over_sqrt_2,
                &mut self.workspace.w_k,
                self.workspace.min_dist2.as_mut(),
                first_manifold,
            );
            eta
        };

        // Splat: weighted source samples onto the working grid.
        let w_k = &self.workspace.w_k;
        let mut psi_splat: Vec<ImageF32> = self
            .src_cn
            .iter()
            .map(|p| resize_bilinear(&multiply(p, w_k), self.small_w, self.small_h))
            .collect();
        let mut psi_splat_0 = resize_bilinear(w_k, self.small_w, self.small_h);

        // Blur along the manifold with the guide-aware recursive filter.
        let dtf = DtFilterRf::from_guide(
            &eta_small,
            self.sigma_s_small,
            self.sigma_r_over_sqrt_2,
            self.dt_iterations,
        );
        for plane in &mut psi_splat {
            dtf.filter_in_place(plane);
        }
        dtf.filter_in_place(&mut psi_splat_0);

        // Slice: bring the blurred values back and accumulate.
        for (i, plane) in psi_splat.iter().enumerate() {
            let mut up = resize_bilinear(plane, self.src_w, self.src_h);
            multiply_assign(&mut up, &self.workspace.w_k);
            add_assign(&mut self.workspace.sum_wk_psi[i], &up);
        }
        let mut up = resize_bilinear(&psi_splat_0, self.src_w, self.src_h);
        multiply_assign(&mut up, &self.workspace.w_k);
        add_assign(&mut self.workspace.sum_wk, &up);

        if level >= self.tree_height {
            return;
        }

        debug!(
            "amf: splitting level {level} cluster of {} px",
            cluster.count_set()
        );

        let init = self.init_vector(self.joint_cn.len());
        let pair = split_clusters(
            self.joint_cn,
            &self.eta_full,
            &cluster,
            init,
            self.num_pca_iterations,
        );

        // Both child centroids are built from this node's weights before
        // either child overwrites them.
        let mut teta = ImageF32::zeros_like(&self.workspace.w_k);
        for (t, &w) in teta.data.iter_mut().zip(&self.workspace.w_k.data) {
            *t = 1.0 - w;
        }
        let eta_minus = compute_eta(
            &teta,
            &pair.minus,
            self.joint_cn,
            self.sigma_s_small,
            self.small_w,
            self.small_h,
        );
        let eta_plus = compute_eta(
            &teta,
            &pair.plus,
            self.joint_cn,
            self.sigma_s_small,
            self.small_w,
            self.small_h,
        );

        // Free the parent's buffers before descending.
        drop(teta);
        drop(eta_small);
        drop(cluster);
        self.eta_full.clear();

        self.build_manifolds(eta_minus, pair.minus, level + 1);
        self.build_manifolds(eta_plus, pair.plus, level + 1);
    }

    /// PCA candidate vector: seeded-uniform per component, or the fixed
    /// ±0.5 alternation when the RNG is disabled.
    fn init_vector(&mut self, cn: usize) -> DVector<f32> {
        if self.use_rng {
            DVector::from_iterator(cn, (0..cn).map(|_| self.rng.random_range(-0.5..0.5)))
        } else {
            DVector::from_iterator(
                cn,
                (0..cn).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }),
            )
        }
    }
}

/// One-shot convenience: build a filter and apply it once.
///
/// Mirrors the classic `amFilter(joint, src, ...)` entry point; `joint` may
/// be the source view itself.
pub fn am_filter(
    joint: &ImageRef<'_>,
    src: &ImageRef<'_>,
    sigma_s: f64,
    sigma_r: f64,
    adjust_outliers: bool,
) -> Result<ImageBuf, FilterError> {
    let mut filter = AdaptiveManifoldFilter::new(AmfOptions {
        sigma_s,
        sigma_r,
        adjust_outliers,
        ..Default::default()
    });
    filter.filter(src, Some(joint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_joint_before_allocating() {
        let src_data = vec![0u8; 16];
        let joint_data = vec![0u8; 4];
        let src = ImageRef::from_u8(4, 4, 1, &src_data).unwrap();
        let joint = ImageRef::from_u8(2, 2, 1, &joint_data).unwrap();
        let mut filter = AdaptiveManifoldFilter::new(AmfOptions::default());
        assert!(matches!(
            filter.filter(&src, Some(&joint)),
            Err(FilterError::JointSizeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_invalid_sigmas() {
        let data = vec![0u8; 16];
        let src = ImageRef::from_u8(4, 4, 1, &data).unwrap();
        let mut filter = AdaptiveManifoldFilter::new(AmfOptions {
            sigma_s: 0.25,
            ..Default::default()
        });
        assert!(matches!(
            filter.filter(&src, None),
            Err(FilterError::InvalidSigmaS(_))
        ));
    }

    #[test]
    fn setters_update_options() {
        let mut filter = AdaptiveManifoldFilter::new(AmfOptions::default());
        filter.set_sigma_s(8.0);
        filter.set_sigma_r(0.5);
        filter.set_tree_height(3);
        filter.set_adjust_outliers(true);
        filter.set_use_rng(false);
        filter.set_num_pca_iterations(4);
        let opts = filter.options();
        assert_eq!(opts.sigma_s, 8.0);
        assert_eq!(opts.sigma_r, 0.5);
        assert_eq!(opts.tree_height, 3);
        assert!(opts.adjust_outliers);
        assert!(!opts.use_rng);
        assert_eq!(opts.num_pca_iterations, 4);
    }
}
