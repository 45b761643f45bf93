//! Row access over dense f32 planes.
//!
//! Every plane in this crate stores its pixels contiguously in row-major
//! order, so row iteration is plain slice chunking: no stride arithmetic and
//! no unsafe re-borrowing. The traits exist so helpers that only read or
//! write rows (the recursive sweeps, the resampler, the range-weight kernel)
//! do not care which concrete buffer they are handed.
use std::slice::{Chunks, ChunksMut};

/// Read access to the rows of a dense f32 plane.
pub trait PlaneView {
    /// Row length in pixels.
    fn width(&self) -> usize;

    /// Backing storage, row-major and contiguous.
    fn plane(&self) -> &[f32];

    /// Single row as a slice.
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let w = self.width();
        &self.plane()[y * w..(y + 1) * w]
    }

    /// Top-to-bottom row iterator.
    fn rows(&self) -> Chunks<'_, f32> {
        self.plane().chunks(self.width().max(1))
    }
}

/// Mutable access to the rows of a dense f32 plane.
pub trait PlaneViewMut: PlaneView {
    /// Mutable backing storage, row-major and contiguous.
    fn plane_mut(&mut self) -> &mut [f32];

    /// Single row as a mutable slice.
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let w = self.width();
        &mut self.plane_mut()[y * w..(y + 1) * w]
    }

    /// Top-to-bottom mutable row iterator.
    fn rows_mut(&mut self) -> ChunksMut<'_, f32> {
        let w = self.width().max(1);
        self.plane_mut().chunks_mut(w)
    }
}
