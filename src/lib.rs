#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod error;
pub mod filter;
pub mod image;

// “Expert” modules – still public, but considered unstable internals.
pub mod manifold;
pub mod recursive;

// --- High-level re-exports -------------------------------------------------

// Main entry points: the filter, its options, the one-shot helper.
pub use crate::error::FilterError;
pub use crate::filter::{am_filter, AdaptiveManifoldFilter, AmfOptions};

// Image types most callers touch.
pub use crate::image::{ImageBuf, ImageRef, PixelDepth};

// The domain-transform filter is generally useful on its own.
pub use crate::recursive::DtFilterRf;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use manifold_filter::prelude::*;
///
/// # fn main() -> Result<(), manifold_filter::FilterError> {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let src = ImageRef::from_u8(w, h, 1, &gray)?;
///
/// let mut filter = AdaptiveManifoldFilter::new(AmfOptions {
///     sigma_s: 16.0,
///     sigma_r: 0.2,
///     ..Default::default()
/// });
/// let out = filter.filter(&src, None)?;
/// println!("filtered {}x{}x{}", out.w, out.h, out.channels);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageBuf, ImageRef, PixelDepth};
    pub use crate::{am_filter, AdaptiveManifoldFilter, AmfOptions, FilterError};
}
