//! Dynamic-programming scanline stereo.
//!
//! Each row pair is aligned independently by a three-way recurrence (match,
//! skip a left pixel, skip a right pixel) over an `(N+1) x (N+1)` cost matrix,
//! then backtracked into per-pixel disparities for both views. Skipped pixels
//! are occlusions and carry no disparity.
//!
//! Rows share no state. Neighbouring rows can settle on different
//! match/occlusion trade-offs for the same surface, which shows up as
//! horizontal streaks in the output; that is a property of the scanline
//! formulation and is left as is.

mod aligner;
mod builder;

pub use aligner::{
    align_scanline, AlignmentPath, CostMatrix, PathStep, ScanlineAligner, ScanlineAlignment, Step,
};
pub use builder::{scanline_disparity, DisparityMapBuilder, StereoDisparity};

use crate::util::{StereoError, StereoResult};

/// Parameters of the scanline recurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanlineConfig {
    /// Intensity normalization; local cost is `(l - r)^2 / sigma^2`.
    pub sigma: f64,
    /// Cost of skipping one pixel on either side (`c0`).
    pub occlusion_cost: f64,
    /// Align rows in parallel (requires the `rayon` feature, otherwise ignored).
    pub parallel: bool,
}

impl Default for ScanlineConfig {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            occlusion_cost: 1.0,
            parallel: false,
        }
    }
}

impl ScanlineConfig {
    /// Validates `sigma` and `occlusion_cost`.
    ///
    /// A zero `sigma`, or one whose square underflows to zero, is reported as
    /// `DivisionByZero`; negative or non-finite values of either parameter, and
    /// a non-positive occlusion cost, as `InvalidParameter`.
    pub fn validate(&self) -> StereoResult<()> {
        if self.sigma * self.sigma == 0.0 {
            return Err(StereoError::DivisionByZero { name: "sigma" });
        }
        if self.sigma < 0.0 || !self.sigma.is_finite() {
            return Err(StereoError::InvalidParameter {
                name: "sigma",
                reason: "must be positive and finite",
            });
        }
        if self.occlusion_cost <= 0.0 || !self.occlusion_cost.is_finite() {
            return Err(StereoError::InvalidParameter {
                name: "occlusion_cost",
                reason: "must be positive and finite",
            });
        }
        Ok(())
    }
}
