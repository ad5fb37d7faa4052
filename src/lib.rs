//! Stereo disparity estimation for rectified grayscale image pairs.
//!
//! Two independent estimators are provided:
//!
//! - [`BlockMatcher`]: local window matching under SAD or SSD, searching a
//!   bounded disparity range per pixel.
//! - [`DisparityMapBuilder`]: per-row dynamic-programming alignment with
//!   explicit occlusions, producing left- and right-referenced maps.
//!
//! Both operate on borrowed [`ImageView`]s and return [`DisparityMap`]s.
//! Optional features: `rayon` (row-parallel execution with bit-identical
//! output), `image-io` (load images / save disparity maps), `tracing`
//! (spans and events around the main entry points).

pub mod block;
pub mod cost;
pub mod disparity;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod scanline;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;

pub use block::{block_match_disparity, BlockMatchConfig, BlockMatcher};
pub use cost::Metric;
pub use disparity::{left_right_check, DisparityMap, DisparityStats, NO_DISPARITY};
pub use image::{ImageView, OwnedImage};
pub use scanline::{
    align_scanline, scanline_disparity, DisparityMapBuilder, ScanlineAligner, ScanlineAlignment,
    ScanlineConfig, StereoDisparity,
};
pub use util::{StereoError, StereoResult};
