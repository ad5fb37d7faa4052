//! Cost kernels for window-based disparity search.
//!
//! A kernel fixes the per-pixel cost at compile time so the block matcher's
//! inner loop is monomorphized per metric. The scalar module holds the
//! reference row scan; the `rayon` module parallelizes it over output rows.

use crate::cost::Metric;
use crate::ImageView;

/// Scan configuration shared by the sequential and parallel row scans.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Largest disparity considered (inclusive).
    pub max_disparity: usize,
    /// Odd side length of the square matching window.
    pub window_size: usize,
}

/// Kernel trait for window cost evaluation.
pub trait CostKernel {
    /// Metric implemented by this kernel.
    const METRIC: Metric;

    /// Cost between two scalar intensities.
    fn pixel_cost(a: u8, b: u8) -> u64;

    /// Accumulated cost between two patches of identical shape.
    ///
    /// Shapes are not checked here; callers guarantee them.
    fn patch_cost(a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> u64 {
        a.rows()
            .zip(b.rows())
            .map(|(row_a, row_b)| {
                row_a
                    .iter()
                    .zip(row_b)
                    .map(|(&p, &q)| Self::pixel_cost(p, q))
                    .sum::<u64>()
            })
            .sum()
    }
}

pub mod scalar;

pub use scalar::{SadKernel, SsdKernel};

#[cfg(feature = "rayon")]
pub mod rayon;
