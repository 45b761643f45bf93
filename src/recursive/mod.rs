//! Recursive separable filters.
//!
//! - `h_filter`: plain first-order low-pass used to average guide channels
//!   into manifold centroids.
//! - `dt_filter`: the edge-aware Domain-Transform recursive filter that blurs
//!   splatted values along manifolds. Reusable outside the pipeline.
pub mod dt_filter;
pub mod h_filter;

pub use dt_filter::{compute_dt_hor, compute_dt_ver, DtFilterRf};
pub use h_filter::{h_filter, h_filter_in_place};
