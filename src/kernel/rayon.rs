//! Rayon-parallel row scans (feature-gated).
//!
//! Output rows are disjoint `&mut` chunks, so each worker writes only its own
//! row while both input views are shared read-only.

use crate::kernel::scalar::scan_row;
use crate::kernel::{CostKernel, ScanParams};
use crate::util::StereoResult;
use crate::ImageView;
use rayon::prelude::*;

/// Row-parallel counterpart of the sequential block-matching scan.
///
/// Produces bit-identical output to the sequential scan.
pub(crate) fn scan_rows_par<K: CostKernel>(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    params: ScanParams,
    values: &mut [u32],
    mask: &mut [u8],
) -> StereoResult<()> {
    let width = left.width();
    values
        .par_chunks_mut(width)
        .zip(mask.par_chunks_mut(width))
        .enumerate()
        .try_for_each(|(y, (value_row, mask_row))| {
            scan_row::<K>(left, right, y, params, value_row, mask_row)
        })
}
