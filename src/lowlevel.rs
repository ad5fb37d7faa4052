//! Low-level building blocks for custom stereo pipelines.
//!
//! These expose the per-metric kernels, slice-level costs and the dynamic
//! programming internals (cost matrix, backtrace path) for callers that want
//! to inspect or reuse them. Most users should prefer [`BlockMatcher`] and
//! [`DisparityMapBuilder`].
//!
//! [`BlockMatcher`]: crate::BlockMatcher
//! [`DisparityMapBuilder`]: crate::DisparityMapBuilder

pub use crate::cost::{sad, ssd};
pub use crate::kernel::{CostKernel, SadKernel, SsdKernel};
pub use crate::scanline::{AlignmentPath, CostMatrix, PathStep, Step};
