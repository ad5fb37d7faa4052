//! Left/right consistency filtering.

use crate::disparity::DisparityMap;
use crate::util::{StereoError, StereoResult};

/// Keeps left-referenced disparities confirmed by the right-referenced map.
///
/// A valid left disparity `d` at `(x, y)` survives when `x >= d`, the right
/// map is valid at `(x - d, y)` and the two disparities differ by at most
/// `tolerance`. Every other cell is invalidated. Neither input is modified.
pub fn left_right_check(
    left: &DisparityMap,
    right: &DisparityMap,
    tolerance: u32,
) -> StereoResult<DisparityMap> {
    if left.width() != right.width() {
        return Err(StereoError::LengthMismatch {
            context: "disparity map width",
            left: left.width(),
            right: right.width(),
        });
    }
    if left.height() != right.height() {
        return Err(StereoError::LengthMismatch {
            context: "disparity map height",
            left: left.height(),
            right: right.height(),
        });
    }

    let mut out = DisparityMap::new(left.width(), left.height(), left.max_disparity())?;
    for y in 0..left.height() {
        for x in 0..left.width() {
            let Some(d) = left.get(x, y) else {
                continue;
            };
            let Some(xr) = x.checked_sub(d as usize) else {
                continue;
            };
            if let Some(dr) = right.get(xr, y) {
                if d.abs_diff(dr) <= tolerance {
                    out.set(x, y, Some(d));
                }
            }
        }
    }
    Ok(out)
}
