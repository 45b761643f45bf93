//! Error type surfaced by the filter's public entry points.
//!
//! Precondition violations are reported before any working buffer is
//! allocated; numerical degeneracies inside the pipeline are handled in place
//! and never surface as errors (see the module docs of `manifold`).

/// Errors returned by filter construction and application.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    /// The spatial standard deviation must be at least one pixel.
    #[error("sigma_s must be >= 1 (got {0})")]
    InvalidSigmaS(f64),

    /// The range standard deviation must lie in (0, 1].
    #[error("sigma_r must lie in (0, 1] (got {0})")]
    InvalidSigmaR(f64),

    /// The source image has zero pixels or zero channels.
    #[error("source image is empty")]
    EmptySource,

    /// The joint image dimensions differ from the source dimensions.
    #[error("joint size {joint_w}x{joint_h} does not match source size {src_w}x{src_h}")]
    JointSizeMismatch {
        src_w: usize,
        src_h: usize,
        joint_w: usize,
        joint_h: usize,
    },

    /// The sample buffer length does not match `w * h * channels`.
    #[error("sample buffer holds {got} values, expected {expected} ({w}x{h}x{channels})")]
    InvalidSampleCount {
        w: usize,
        h: usize,
        channels: usize,
        expected: usize,
        got: usize,
    },
}
