//! Scalar reference kernels and the sequential row scan.

use crate::cost::Metric;
use crate::kernel::{CostKernel, ScanParams};
use crate::util::StereoResult;
use crate::ImageView;

/// Sum-of-absolute-differences kernel.
pub struct SadKernel;

/// Sum-of-squared-differences kernel.
pub struct SsdKernel;

impl CostKernel for SadKernel {
    const METRIC: Metric = Metric::Sad;

    #[inline]
    fn pixel_cost(a: u8, b: u8) -> u64 {
        u64::from(a.abs_diff(b))
    }
}

impl CostKernel for SsdKernel {
    const METRIC: Metric = Metric::Ssd;

    #[inline]
    fn pixel_cost(a: u8, b: u8) -> u64 {
        let diff = u64::from(a.abs_diff(b));
        diff * diff
    }
}

/// Computes the winning disparity for every in-range pixel of row `y`.
///
/// `values` and `mask` are the output row. Pixels in the border band of width
/// `window_size / 2` are left untouched, as are whole rows inside that band.
/// Candidates run from `d = 0` upward and only a strictly smaller cost
/// replaces the current best, so ties resolve to the smallest disparity.
pub(crate) fn scan_row<K: CostKernel>(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    y: usize,
    params: ScanParams,
    values: &mut [u32],
    mask: &mut [u8],
) -> StereoResult<()> {
    let window = params.window_size;
    let half = window / 2;
    let width = left.width();
    let height = left.height();
    if y < half || y + half >= height {
        return Ok(());
    }

    for x in half..(width - half) {
        let left_patch = left.centered_window(x, y, window)?;
        let reachable = params.max_disparity.min(x - half);

        let mut best_disparity = 0usize;
        let mut best_cost = u64::MAX;
        for d in 0..=reachable {
            let right_patch = right.centered_window(x - d, y, window)?;
            let cost = K::patch_cost(left_patch, right_patch);
            if cost < best_cost {
                best_cost = cost;
                best_disparity = d;
            }
        }

        values[x] = best_disparity as u32;
        mask[x] = 1;
    }

    Ok(())
}

/// Sequential scan over all rows of the output buffers.
pub(crate) fn scan_rows<K: CostKernel>(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    params: ScanParams,
    values: &mut [u32],
    mask: &mut [u8],
) -> StereoResult<()> {
    let width = left.width();
    for (y, (value_row, mask_row)) in values
        .chunks_mut(width)
        .zip(mask.chunks_mut(width))
        .enumerate()
    {
        scan_row::<K>(left, right, y, params, value_row, mask_row)?;
    }
    Ok(())
}
