//! Row-by-row assembly of left- and right-referenced disparity maps.

use crate::disparity::DisparityMap;
use crate::image::check_same_size;
use crate::scanline::aligner::{RowOutput, ScanlineAligner};
use crate::scanline::ScanlineConfig;
use crate::trace::{trace_event, trace_span};
use crate::util::{StereoError, StereoResult};
use crate::ImageView;

/// Disparity maps referenced to each view of the pair.
#[derive(Clone, Debug, PartialEq)]
pub struct StereoDisparity {
    /// Indexed by left-image pixels.
    pub left: DisparityMap,
    /// Indexed by right-image pixels.
    pub right: DisparityMap,
}

/// Applies the scanline aligner to every row pair of an image pair.
///
/// All rows use the same `sigma` and occlusion cost and are aligned
/// independently of each other.
#[derive(Clone, Debug, Default)]
pub struct DisparityMapBuilder {
    cfg: ScanlineConfig,
}

impl DisparityMapBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: ScanlineConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ScanlineConfig {
        &self.cfg
    }

    /// Builds both disparity maps.
    ///
    /// Maps record `width - 1` as their disparity bound. Empty images yield
    /// empty maps.
    pub fn build(
        &self,
        left: ImageView<'_, u8>,
        right: ImageView<'_, u8>,
    ) -> StereoResult<StereoDisparity> {
        self.cfg.validate()?;
        check_same_size(left, right)?;

        let width = left.width();
        let height = left.height();
        let max_disparity = u32::try_from(width.saturating_sub(1))
            .map_err(|_| StereoError::InvalidDimensions { width, height })?;
        let mut left_map = DisparityMap::new(width, height, max_disparity)?;
        let mut right_map = DisparityMap::new(width, height, max_disparity)?;
        if left.is_empty() {
            return Ok(StereoDisparity {
                left: left_map,
                right: right_map,
            });
        }

        let _span = trace_span!("scanline_disparity", width = width, height = height).entered();
        dispatch_rows(&self.cfg, left, right, &mut left_map, &mut right_map)?;
        trace_event!(
            "scanline_rows_done",
            rows = height,
            left_valid = left_map.valid_count(),
            right_valid = right_map.valid_count()
        );

        Ok(StereoDisparity {
            left: left_map,
            right: right_map,
        })
    }
}

fn align_rows(
    cfg: &ScanlineConfig,
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    left_map: &mut DisparityMap,
    right_map: &mut DisparityMap,
) -> StereoResult<()> {
    let mut aligner = ScanlineAligner::new(cfg.clone());
    let rows = left.rows().zip(right.rows());
    let outputs = left_map.rows_mut().zip(right_map.rows_mut());
    for ((l_row, r_row), ((left_values, left_mask), (right_values, right_mask))) in
        rows.zip(outputs)
    {
        aligner.align_into(
            l_row,
            r_row,
            RowOutput {
                left_values,
                left_mask,
                right_values,
                right_mask,
            },
        )?;
    }
    Ok(())
}

#[cfg(feature = "rayon")]
fn align_rows_par(
    cfg: &ScanlineConfig,
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    left_map: &mut DisparityMap,
    right_map: &mut DisparityMap,
) -> StereoResult<()> {
    use rayon::prelude::*;

    let width = left.width();
    let (lv, lm) = left_map.buffers_mut();
    let (rv, rm) = right_map.buffers_mut();
    lv.par_chunks_mut(width)
        .zip(lm.par_chunks_mut(width))
        .zip(rv.par_chunks_mut(width).zip(rm.par_chunks_mut(width)))
        .enumerate()
        .try_for_each_init(
            || ScanlineAligner::new(cfg.clone()),
            |aligner, (y, ((left_values, left_mask), (right_values, right_mask)))| {
                let (l_row, r_row) = match (left.row(y), right.row(y)) {
                    (Some(l), Some(r)) => (l, r),
                    _ => {
                        return Err(StereoError::InvalidDimensions {
                            width,
                            height: left.height(),
                        })
                    }
                };
                aligner.align_into(
                    l_row,
                    r_row,
                    RowOutput {
                        left_values,
                        left_mask,
                        right_values,
                        right_mask,
                    },
                )
            },
        )
}

#[cfg(feature = "rayon")]
fn dispatch_rows(
    cfg: &ScanlineConfig,
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    left_map: &mut DisparityMap,
    right_map: &mut DisparityMap,
) -> StereoResult<()> {
    if cfg.parallel {
        align_rows_par(cfg, left, right, left_map, right_map)
    } else {
        align_rows(cfg, left, right, left_map, right_map)
    }
}

#[cfg(not(feature = "rayon"))]
fn dispatch_rows(
    cfg: &ScanlineConfig,
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    left_map: &mut DisparityMap,
    right_map: &mut DisparityMap,
) -> StereoResult<()> {
    align_rows(cfg, left, right, left_map, right_map)
}

/// Scanline disparity for an image pair with explicit `sigma` and `c0`.
///
/// Convenience wrapper around [`DisparityMapBuilder`] with sequential
/// execution; the documented defaults are `sigma = 2.0`, `c0 = 1.0`.
pub fn scanline_disparity(
    left: ImageView<'_, u8>,
    right: ImageView<'_, u8>,
    sigma: f64,
    c0: f64,
) -> StereoResult<StereoDisparity> {
    DisparityMapBuilder::new(ScanlineConfig {
        sigma,
        occlusion_cost: c0,
        parallel: false,
    })
    .build(left, right)
}
