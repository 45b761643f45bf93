//! Domain-Transform recursive filter (RF mode).
//!
//! Edge-aware separable smoother: per-edge feedback weights are derived from
//! neighbour differences in a guide image, so the recursive sweeps stop at
//! guide edges. The filter is independent of the manifold pipeline and can be
//! reused on its own.
//!
//! Weights follow the recursive-filtering formulation of Gastal & Oliveira's
//! domain transform: for a horizontal edge between columns x and x+1,
//! `adth = exp(ln_alpha · √(1 + (σs/σr)² · Σ_c Δc²))` with
//! `ln_alpha = −√2/σs`. Multiple iterations rescale the tables according to
//! the standard σ_H schedule; the default single iteration uses them as-is.
use crate::image::traits::{PlaneView, PlaneViewMut};
use crate::image::ImageF32;
use std::f32::consts::SQRT_2;

/// Edge-aware recursive smoother with precomputed per-edge feedback tables.
#[derive(Clone, Debug)]
pub struct DtFilterRf {
    /// Horizontal feedback weights, one per edge: `h × (w−1)`.
    adth: ImageF32,
    /// Vertical feedback weights, one per edge: `(h−1) × w`.
    adtv: ImageF32,
    sigma_s: f32,
    sigma_r: f32,
    iterations: usize,
    w: usize,
    h: usize,
}

impl DtFilterRf {
    /// Build from precomputed edge tables.
    ///
    /// `adth` must be `h × (w−1)` and `adtv` `(h−1) × w` for a `w × h`
    /// target; `iterations` is the K of the σ_H schedule (1 applies the raw
    /// tables once).
    pub fn new(
        adth: ImageF32,
        adtv: ImageF32,
        sigma_s: f32,
        sigma_r: f32,
        iterations: usize,
    ) -> Self {
        let w = adtv.w.max(adth.w + 1);
        let h = adth.h.max(adtv.h + 1);
        Self {
            adth,
            adtv,
            sigma_s,
            sigma_r,
            iterations: iterations.max(1),
            w,
            h,
        }
    }

    /// Build the edge tables from a planar guide image.
    pub fn from_guide(guide: &[ImageF32], sigma_s: f32, sigma_r: f32, iterations: usize) -> Self {
        let adth = compute_dt_hor(guide, sigma_s, sigma_r);
        let adtv = compute_dt_ver(guide, sigma_s, sigma_r);
        Self::new(adth, adtv, sigma_s, sigma_r, iterations)
    }

    /// Spatial standard deviation the tables were built with.
    pub fn sigma_s(&self) -> f32 {
        self.sigma_s
    }

    /// Range standard deviation the tables were built with.
    pub fn sigma_r(&self) -> f32 {
        self.sigma_r
    }

    /// Filter a plane in place. The plane must match the guide dimensions.
    pub fn filter_in_place(&self, plane: &mut ImageF32) {
        debug_assert_eq!((plane.w, plane.h), (self.w, self.h));

        let k_total = self.iterations as i32;
        for k in 1..=k_total {
            // Rescaling exponent for iteration k of the σ_H schedule; equals
            // 1 for the single-iteration default.
            let exponent =
                (4f32.powi(k_total) - 1.0).sqrt() / (3f32.sqrt() * 2f32.powi(k_total - k));
            if (exponent - 1.0).abs() < 1e-6 {
                horizontal_pass(plane, &self.adth);
                vertical_pass(plane, &self.adtv);
            } else {
                let adth = powered(&self.adth, exponent);
                let adtv = powered(&self.adtv, exponent);
                horizontal_pass(plane, &adth);
                vertical_pass(plane, &adtv);
            }
        }
    }
}

fn powered(table: &ImageF32, exponent: f32) -> ImageF32 {
    let mut out = table.clone();
    for v in &mut out.data {
        *v = v.powf(exponent);
    }
    out
}

/// Forward then backward recursive sweep along rows.
fn horizontal_pass(plane: &mut ImageF32, adth: &ImageF32) {
    let w = plane.w;
    if w < 2 {
        return;
    }
    for y in 0..plane.h {
        let weights = adth.row(y);
        let row = plane.row_mut(y);
        for x in 1..w {
            row[x] += weights[x - 1] * (row[x - 1] - row[x]);
        }
        for x in (0..w - 1).rev() {
            row[x] += weights[x] * (row[x + 1] - row[x]);
        }
    }
}

/// Forward then backward recursive sweep along columns, expressed as
/// row-against-neighbour-row passes to stay cache friendly.
fn vertical_pass(plane: &mut ImageF32, adtv: &ImageF32) {
    let (w, h) = (plane.w, plane.h);
    if h < 2 {
        return;
    }
    for y in 1..h {
        let weights = adtv.row(y - 1);
        let (top, bottom) = plane.data.split_at_mut(y * w);
        let prev = &top[(y - 1) * w..];
        let cur = &mut bottom[..w];
        for x in 0..w {
            cur[x] += weights[x] * (prev[x] - cur[x]);
        }
    }
    for y in (0..h - 1).rev() {
        let weights = adtv.row(y);
        let (top, bottom) = plane.data.split_at_mut((y + 1) * w);
        let cur = &mut top[y * w..];
        let prev = &bottom[..w];
        for x in 0..w {
            cur[x] += weights[x] * (prev[x] - cur[x]);
        }
    }
}

/// Horizontal edge table: feedback weight for each (x, x+1) neighbour pair.
pub fn compute_dt_hor(guide: &[ImageF32], sigma_s: f32, sigma_r: f32) -> ImageF32 {
    let (w, h) = (guide[0].w, guide[0].h);
    let ratio_sqr = (sigma_s / sigma_r) * (sigma_s / sigma_r);
    let ln_alpha = -SQRT_2 / sigma_s;

    let mut dst = ImageF32::new(w.saturating_sub(1), h);
    for y in 0..h {
        let dst_row = dst.row_mut(y);
        for (cn, plane) in guide.iter().enumerate() {
            let row = plane.row(y);
            for x in 0..w - 1 {
                let d = row[x + 1] - row[x];
                if cn == 0 {
                    dst_row[x] = d * d;
                } else {
                    dst_row[x] += d * d;
                }
            }
        }
        for v in dst_row.iter_mut() {
            *v = (ln_alpha * (1.0 + ratio_sqr * *v).sqrt()).exp();
        }
    }
    dst
}

/// Vertical edge table: feedback weight for each (y, y+1) neighbour pair.
pub fn compute_dt_ver(guide: &[ImageF32], sigma_s: f32, sigma_r: f32) -> ImageF32 {
    let (w, h) = (guide[0].w, guide[0].h);
    let ratio_sqr = (sigma_s / sigma_r) * (sigma_s / sigma_r);
    let ln_alpha = -SQRT_2 / sigma_s;

    let mut dst = ImageF32::new(w, h.saturating_sub(1));
    for y in 0..h.saturating_sub(1) {
        let dst_row = dst.row_mut(y);
        for (cn, plane) in guide.iter().enumerate() {
            let row0 = plane.row(y);
            let row1 = plane.row(y + 1);
            for x in 0..w {
                let d = row1[x] - row0[x];
                if cn == 0 {
                    dst_row[x] = d * d;
                } else {
                    dst_row[x] += d * d;
                }
            }
        }
        for v in dst_row.iter_mut() {
            *v = (ln_alpha * (1.0 + ratio_sqr * *v).sqrt()).exp();
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_guide(w: usize, h: usize) -> Vec<ImageF32> {
        vec![ImageF32::full(w, h, 0.5)]
    }

    fn step_guide(w: usize, h: usize, split_x: usize) -> Vec<ImageF32> {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, if x < split_x { 0.0 } else { 1.0 });
            }
        }
        vec![img]
    }

    #[test]
    fn edge_weights_lie_in_unit_interval() {
        let guide = step_guide(8, 8, 4);
        let adth = compute_dt_hor(&guide, 4.0, 0.2);
        assert_eq!((adth.w, adth.h), (7, 8));
        for &v in &adth.data {
            assert!(v > 0.0 && v < 1.0, "weight {v} outside (0, 1)");
        }
        // the crossing edge must be far weaker than flat-region edges
        let at_edge = adth.get(3, 4);
        let flat = adth.get(0, 4);
        assert!(at_edge < flat * 0.05, "edge weight {at_edge} vs flat {flat}");
    }

    #[test]
    fn constant_plane_is_preserved() {
        let guide = flat_guide(12, 10);
        let dtf = DtFilterRf::from_guide(&guide, 6.0, 0.3, 1);
        let mut plane = ImageF32::full(12, 10, 2.5);
        dtf.filter_in_place(&mut plane);
        for &v in &plane.data {
            assert!((v - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn guide_edge_stops_smoothing() {
        let (w, h) = (16, 4);
        let guide = step_guide(w, h, 8);
        let dtf = DtFilterRf::from_guide(&guide, 8.0, 0.1, 1);

        let mut plane = guide[0].clone();
        dtf.filter_in_place(&mut plane);

        // far side of the step barely leaks across the guide edge
        assert!(plane.get(1, 2) < 0.05, "left half contaminated: {}", plane.get(1, 2));
        assert!(plane.get(14, 2) > 0.95, "right half contaminated: {}", plane.get(14, 2));
    }

    #[test]
    fn multiple_iterations_preserve_constants_too() {
        let guide = flat_guide(9, 9);
        let dtf = DtFilterRf::from_guide(&guide, 4.0, 0.5, 3);
        let mut plane = ImageF32::full(9, 9, -1.25);
        dtf.filter_in_place(&mut plane);
        for &v in &plane.data {
            assert!((v + 1.25).abs() < 1e-5);
        }
    }
}
