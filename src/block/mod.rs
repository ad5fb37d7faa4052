//! Local block-matching disparity estimation.
//!
//! For every pixel outside the border band the matcher compares the
//! `window_size x window_size` patch centered on it in the left image with
//! patches centered at `(x - d, y)` in the right image, for every candidate
//! `d` in `[0, max_disparity]` with `x - d >= window_size / 2`, and keeps the
//! cheapest. Ties go to the smallest disparity.
//!
//! Border band policy: the `window_size / 2` pixels along every image edge
//! have no full window and are left at [`NO_DISPARITY`](crate::NO_DISPARITY)
//! with an invalid mask. Edge disparities are therefore missing rather than
//! extrapolated.
//!
//! Cost is `O(H * W * max_disparity * window_size^2)`; this is the reference
//! baseline, not a tuned path.

use crate::cost::Metric;
use crate::disparity::DisparityMap;
use crate::image::check_same_size;
use crate::kernel::scalar::scan_rows;
use crate::kernel::{CostKernel, SadKernel, ScanParams, SsdKernel};
use crate::trace::{trace_event, trace_span};
use crate::util::{StereoError, StereoResult};
use crate::ImageView;

/// Configuration for block matching.
///
/// The metric has no default: callers pick SAD or SSD explicitly.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockMatchConfig {
    /// Largest disparity searched (inclusive).
    pub max_disparity: usize,
    /// Odd side length of the square matching window.
    pub window_size: usize,
    /// Patch cost metric.
    pub metric: Metric,
    /// Scan rows in parallel (requires the `rayon` feature, otherwise ignored).
    pub parallel: bool,
}

impl BlockMatchConfig {
    /// Default search range of 16 pixels with a 5x5 window.
    pub fn new(metric: Metric) -> Self {
        Self {
            max_disparity: 16,
            window_size: 5,
            metric,
            parallel: false,
        }
    }

    /// Checks the image-independent constraints.
    pub fn validate(&self) -> StereoResult<()> {
        if self.window_size == 0 {
            return Err(StereoError::InvalidParameter {
                name: "window_size",
                reason: "must be positive",
            });
        }
        if self.window_size % 2 == 0 {
            return Err(StereoError::InvalidParameter {
                name: "window_size",
                reason: "must be odd",
            });
        }
        if u32::try_from(self.max_disparity).is_err() {
            return Err(StereoError::InvalidParameter {
                name: "max_disparity",
                reason: "must fit in u32",
            });
        }
        Ok(())
    }
}

/// Block matcher over rectified grayscale image pairs.
#[derive(Clone, Debug)]
pub struct BlockMatcher {
    cfg: BlockMatchConfig,
}

impl BlockMatcher {
    /// Creates a matcher with the given configuration.
    pub fn new(cfg: BlockMatchConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &BlockMatchConfig {
        &self.cfg
    }

    /// Computes the left-referenced disparity map.
    ///
    /// Fails before any work with `InvalidParameter` for an even or zero
    /// window or one larger than `min(H, W)`, and with `LengthMismatch` when
    /// the images differ in size. Empty images yield an empty map.
    pub fn compute(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
    ) -> StereoResult<DisparityMap> {
        self.cfg.validate()?;
        check_same_size(left, right)?;

        let width = left.width();
        let height = left.height();
        let max_disparity = self.cfg.max_disparity as u32;
        let mut map = DisparityMap::new(width, height, max_disparity)?;
        if left.is_empty() {
            return Ok(map);
        }
        if self.cfg.window_size > width.min(height) {
            return Err(StereoError::InvalidParameter {
                name: "window_size",
                reason: "must not exceed the smaller image dimension",
            });
        }

        let params = ScanParams {
            max_disparity: self.cfg.max_disparity,
            window_size: self.cfg.window_size,
        };
        match self.cfg.metric {
            Metric::Sad => self.run::<SadKernel>(left, right, params, &mut map)?,
            Metric::Ssd => self.run::<SsdKernel>(left, right, params, &mut map)?,
        }
        Ok(map)
    }

    fn run<K: CostKernel>(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
        params: ScanParams,
        map: &mut DisparityMap,
    ) -> StereoResult<()> {
        debug_assert_eq!(K::METRIC, self.cfg.metric);
        let _span = trace_span!(
            "block_match",
            width = left.width(),
            height = left.height(),
            max_disparity = params.max_disparity,
            window = params.window_size,
            metric = K::METRIC.name()
        )
        .entered();

        let (values, mask) = map.buffers_mut();
        dispatch_scan::<K>(self.cfg.parallel, left, right, params, values, mask)?;

        trace_event!("block_match_done", valid = map.valid_count());
        Ok(())
    }
}

#[cfg(feature = "rayon")]
fn dispatch_scan<K: CostKernel>(
    parallel: bool,
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    params: ScanParams,
    values: &mut [u32],
    mask: &mut [u8],
) -> StereoResult<()> {
    if parallel {
        crate::kernel::rayon::scan_rows_par::<K>(left, right, params, values, mask)
    } else {
        scan_rows::<K>(left, right, params, values, mask)
    }
}

#[cfg(not(feature = "rayon"))]
fn dispatch_scan<K: CostKernel>(
    _parallel: bool,
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    params: ScanParams,
    values: &mut [u32],
    mask: &mut [u8],
) -> StereoResult<()> {
    scan_rows::<K>(left, right, params, values, mask)
}

/// Block-matching disparity with an explicit metric.
///
/// Convenience wrapper around [`BlockMatcher`] with sequential execution.
pub fn block_match_disparity(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    max_disparity: usize,
    window_size: usize,
    metric: Metric,
) -> StereoResult<DisparityMap> {
    BlockMatcher::new(BlockMatchConfig {
        max_disparity,
        window_size,
        metric,
        parallel: false,
    })
    .compute(left, right)
}
