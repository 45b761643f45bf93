//! Filter module: options, the pipeline driver, and the reusable workspace.
//!
//! Overview
//! - Validates parameters and splits the source/guide into f32 planes
//!   (integer guides normalized to [0, 1]).
//! - Builds the root manifold by recursive low-pass of the guide, then walks
//!   a binary tree of clusters: each node splats `src · w_k` onto a
//!   downsampled grid, blurs it with a guide-aware domain-transform filter,
//!   and slices the result back into running accumulators.
//! - Non-leaf nodes split their cluster by the sign of the projection onto
//!   the dominant residual eigenvector and descend minus-first, releasing
//!   parent buffers so peak memory follows tree depth.
//! - The final image is the accumulated weighted average, optionally blended
//!   back toward the input where every manifold was a poor fit.
//!
//! Modules
//! - `options` – parameters, validation, and derived scale selection.
//! - `pipeline` – the main [`AdaptiveManifoldFilter`] implementation.
//! - `workspace` – reusable accumulator buffers.

pub mod options;
mod pipeline;
mod workspace;

pub use options::{manifold_tree_height, resize_ratio, small_size, AmfOptions};
pub use pipeline::{am_filter, AdaptiveManifoldFilter};
pub use workspace::FilterWorkspace;
