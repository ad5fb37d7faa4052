//! Patch dissimilarity metrics.
//!
//! Costs are accumulated in `u64` over `u8` samples, so they are exact and
//! comparisons between candidates never depend on rounding. SSD grows
//! quadratically with the per-pixel difference and therefore punishes a single
//! large mismatch harder than several small ones.

use crate::image::ImageView;
use crate::kernel::{CostKernel, SadKernel, SsdKernel};
use crate::util::{StereoError, StereoResult};

/// Patch cost metric used by the block matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Sum of absolute differences.
    Sad,
    /// Sum of squared differences.
    Ssd,
}

impl Metric {
    /// Returns the lowercase metric name.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Sad => "sad",
            Metric::Ssd => "ssd",
        }
    }

    /// Cost between two scalar intensities.
    pub fn pixel_cost(self, a: u8, b: u8) -> u64 {
        match self {
            Metric::Sad => SadKernel::pixel_cost(a, b),
            Metric::Ssd => SsdKernel::pixel_cost(a, b),
        }
    }

    /// Cost between two equally sized sample slices.
    pub fn cost(self, a: &[u8], b: &[u8]) -> StereoResult<u64> {
        if a.len() != b.len() {
            return Err(StereoError::LengthMismatch {
                context: "patch length",
                left: a.len(),
                right: b.len(),
            });
        }
        Ok(a.iter().zip(b).map(|(&p, &q)| self.pixel_cost(p, q)).sum())
    }

    /// Cost between two image patches of identical shape.
    pub fn patch_cost(self, a: ImageView<'_, u8>, b: ImageView<'_, u8>) -> StereoResult<u64> {
        if a.width() != b.width() {
            return Err(StereoError::LengthMismatch {
                context: "patch width",
                left: a.width(),
                right: b.width(),
            });
        }
        if a.height() != b.height() {
            return Err(StereoError::LengthMismatch {
                context: "patch height",
                left: a.height(),
                right: b.height(),
            });
        }
        Ok(match self {
            Metric::Sad => SadKernel::patch_cost(a, b),
            Metric::Ssd => SsdKernel::patch_cost(a, b),
        })
    }
}

/// Sum of absolute differences between two equally sized slices.
pub fn sad(a: &[u8], b: &[u8]) -> StereoResult<u64> {
    Metric::Sad.cost(a, b)
}

/// Sum of squared differences between two equally sized slices.
pub fn ssd(a: &[u8], b: &[u8]) -> StereoResult<u64> {
    Metric::Ssd.cost(a, b)
}
