//! Parameter types and derived scale selection for the filter.
//!
//! Defaults match the reference implementation of the adaptive manifold
//! filter. For tuning, start with `sigma_s`/`sigma_r`; the tree height and
//! the downsampling ratio are derived from them unless overridden.

use crate::error::FilterError;
use serde::Deserialize;

/// Filter-wide parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct AmfOptions {
    /// Spatial standard deviation in pixels. Must be >= 1.
    pub sigma_s: f64,
    /// Range standard deviation in normalized intensity. Must lie in (0, 1].
    pub sigma_r: f64,
    /// Manifold tree height; values <= 0 select [`manifold_tree_height`].
    pub tree_height: i32,
    /// Power-iteration count for the clustering eigenvector (min 1).
    pub num_pca_iterations: usize,
    /// Blend the result back toward the input where no manifold fits well.
    pub adjust_outliers: bool,
    /// Seeded random PCA init vector; false uses a fixed ±0.5 alternation.
    pub use_rng: bool,
    /// Domain-transform iteration count K.
    pub dt_iterations: usize,
}

impl Default for AmfOptions {
    fn default() -> Self {
        Self {
            sigma_s: 16.0,
            sigma_r: 0.2,
            tree_height: -1,
            num_pca_iterations: 1,
            adjust_outliers: false,
            use_rng: true,
            dt_iterations: 1,
        }
    }
}

impl AmfOptions {
    /// Check the sigma preconditions. Runs before any buffer is allocated.
    pub fn validate(&self) -> Result<(), FilterError> {
        if !(self.sigma_s >= 1.0) {
            return Err(FilterError::InvalidSigmaS(self.sigma_s));
        }
        if !(self.sigma_r > 0.0 && self.sigma_r <= 1.0) {
            return Err(FilterError::InvalidSigmaR(self.sigma_r));
        }
        Ok(())
    }
}

/// Automatic manifold tree height: `max(2, ceil((⌊log2 σs⌋ − 1)·(1 − σr)))`.
///
/// Wide spatial kernels warrant more manifolds; a wide range kernel needs
/// fewer because each manifold already represents more of the range space.
pub fn manifold_tree_height(sigma_s: f64, sigma_r: f64) -> i32 {
    let hs = sigma_s.log2().floor() - 1.0;
    let lr = 1.0 - sigma_r;
    ((hs * lr).ceil() as i32).max(2)
}

/// Power-of-two downsampling ratio: `max(1, pow2_floor(min(σs/4, 256·σr)))`.
pub fn resize_ratio(sigma_s: f64, sigma_r: f64) -> f64 {
    let df = (sigma_s / 4.0).min(256.0 * sigma_r);
    floor_to_power_of_two(df).max(1.0)
}

/// Working-grid dimensions for a `w × h` image at ratio `df`, floored at 1.
pub fn small_size(w: usize, h: usize, df: f64) -> (usize, usize) {
    let sw = (w as f64 / df).round() as usize;
    let sh = (h as f64 / df).round() as usize;
    (sw.max(1), sh.max(1))
}

fn floor_to_power_of_two(r: f64) -> f64 {
    2f64.powf(r.log2().floor())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_pass_validation() {
        assert!(AmfOptions::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_sigmas_are_rejected() {
        let mut opts = AmfOptions {
            sigma_s: 0.5,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(FilterError::InvalidSigmaS(_))));

        opts.sigma_s = 4.0;
        opts.sigma_r = 0.0;
        assert!(matches!(opts.validate(), Err(FilterError::InvalidSigmaR(_))));
        opts.sigma_r = 1.5;
        assert!(matches!(opts.validate(), Err(FilterError::InvalidSigmaR(_))));
    }

    #[test]
    fn tree_height_follows_the_heuristic() {
        assert_eq!(manifold_tree_height(16.0, 0.2), 3);
        assert_eq!(manifold_tree_height(64.0, 0.2), 4);
        // small spatial kernels clamp to the minimum height of 2
        assert_eq!(manifold_tree_height(2.0, 0.5), 2);
        assert_eq!(manifold_tree_height(1.0, 0.9), 2);
    }

    #[test]
    fn resize_ratio_is_a_power_of_two_at_least_one() {
        assert_eq!(resize_ratio(16.0, 0.2), 4.0);
        assert_eq!(resize_ratio(2.0, 0.5), 1.0);
        assert_eq!(resize_ratio(64.0, 1.0), 16.0);
        // tight range kernels limit the ratio
        assert_eq!(resize_ratio(64.0, 0.01), 2.0);
    }

    #[test]
    fn small_size_rounds_and_never_hits_zero() {
        assert_eq!(small_size(640, 480, 4.0), (160, 120));
        assert_eq!(small_size(3, 3, 8.0), (1, 1));
    }
}
