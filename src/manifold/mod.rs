//! Manifold construction: cluster masks, range weights, PCA splitting, and
//! centroid (eta) computation.
//!
//! The pipeline in `filter::pipeline` walks a binary tree of clusters; the
//! pieces here are the per-node operations. Numerical degeneracies (empty
//! clusters, collapsed eigenvectors) degrade gracefully instead of erroring:
//! see the individual modules.
pub mod cluster;
pub mod eta;
pub mod mask;
pub mod weights;

pub use cluster::{dominant_eigenvector, split_clusters, ClusterPair};
pub use eta::compute_eta;
pub use mask::MaskU8;
pub use weights::compute_range_weights;
