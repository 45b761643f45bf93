//! Per-call workspace holding the slicing accumulators and range weights.
//!
//! The filter reuses these planes across tree nodes (and across calls with
//! matching geometry) to avoid repeated allocations in the recursion.
use crate::image::ImageF32;

/// Accumulators and scratch owned by the filter instance, mutably borrowed by
/// the tree walk.
pub struct FilterWorkspace {
    /// Per source channel: running `Σ_k upsample(blur(down(src·w_k)))·w_k`.
    pub(crate) sum_wk_psi: Vec<ImageF32>,
    /// Running `Σ_k upsample(blur(down(w_k)))·w_k`.
    pub(crate) sum_wk: ImageF32,
    /// Range weights of the manifold currently being processed.
    pub(crate) w_k: ImageF32,
    /// Minimum squared distance to any visited manifold (outlier adjustment).
    pub(crate) min_dist2: Option<ImageF32>,
}

impl FilterWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed accumulators for a `w × h` source with `src_channels` planes.
    pub(crate) fn reset(&mut self, w: usize, h: usize, src_channels: usize, adjust_outliers: bool) {
        let fits = self.sum_wk.w == w && self.sum_wk.h == h && self.sum_wk_psi.len() == src_channels;
        if fits {
            for plane in &mut self.sum_wk_psi {
                plane.data.fill(0.0);
            }
            self.sum_wk.data.fill(0.0);
        } else {
            self.sum_wk_psi = (0..src_channels).map(|_| ImageF32::new(w, h)).collect();
            self.sum_wk = ImageF32::new(w, h);
            self.w_k = ImageF32::new(w, h);
        }
        if self.w_k.w != w || self.w_k.h != h {
            self.w_k = ImageF32::new(w, h);
        }
        self.min_dist2 = adjust_outliers.then(|| ImageF32::new(w, h));
    }

    /// Drop every buffer. Subsequent calls re-allocate on demand.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

impl Default for FilterWorkspace {
    fn default() -> Self {
        Self {
            sum_wk_psi: Vec::new(),
            sum_wk: ImageF32::new(0, 0),
            w_k: ImageF32::new(0, 0),
            min_dist2: None,
        }
    }
}
