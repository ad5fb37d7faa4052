//! Dense disparity maps.
//!
//! A map stores one raw integer disparity per pixel plus a validity mask.
//! Cells without a disparity (the block matcher's border band, occluded
//! positions from the scanline aligner) hold [`NO_DISPARITY`] and mask 0.

use crate::image::OwnedImage;
use crate::util::{StereoError, StereoResult};

mod check;

pub use check::left_right_check;

/// Marker stored in cells that carry no disparity.
pub const NO_DISPARITY: u32 = 0;

/// Dense per-pixel disparity map with a validity mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisparityMap {
    width: usize,
    height: usize,
    max_disparity: u32,
    values: Vec<u32>,
    mask: Vec<u8>,
}

/// Summary statistics over the valid cells of a map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisparityStats {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
    /// Number of valid cells.
    pub valid: usize,
}

impl DisparityMap {
    /// Creates a map where every cell holds [`NO_DISPARITY`].
    pub fn new(width: usize, height: usize, max_disparity: u32) -> StereoResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(StereoError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            max_disparity,
            values: vec![NO_DISPARITY; len],
            mask: vec![0; len],
        })
    }

    /// Returns the map width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the map height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns true when the map holds no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Upper bound on the disparities stored in this map.
    pub fn max_disparity(&self) -> u32 {
        self.max_disparity
    }

    /// Returns the disparity at `(x, y)`, or `None` for invalid or
    /// out-of-range cells.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        let idx = self.index(x, y)?;
        (self.mask[idx] != 0).then_some(self.values[idx])
    }

    /// Returns the raw cell at `(x, y)`, including [`NO_DISPARITY`] markers.
    pub fn value(&self, x: usize, y: usize) -> Option<u32> {
        self.index(x, y).map(|idx| self.values[idx])
    }

    /// Returns true if `(x, y)` holds a disparity.
    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some()
    }

    /// Raw cells in row-major order.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Validity mask in row-major order (1 = valid).
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Returns raw cells for row `y`.
    pub fn row(&self, y: usize) -> Option<&[u32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.values.get(start..start + self.width)
    }

    /// Number of valid cells.
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m != 0).count()
    }

    /// Min, max and mean over the valid cells; `None` if there are none.
    pub fn stats(&self) -> Option<DisparityStats> {
        let mut min = u32::MAX;
        let mut max = 0u32;
        let mut sum = 0u64;
        let mut valid = 0usize;
        for (&value, &m) in self.values.iter().zip(&self.mask) {
            if m == 0 {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
            sum += u64::from(value);
            valid += 1;
        }
        if valid == 0 {
            return None;
        }
        Some(DisparityStats {
            min,
            max,
            mean: sum as f64 / valid as f64,
            valid,
        })
    }

    /// Scales every cell to `[0, 255]` as `round(d * 255 / max_disparity)`.
    ///
    /// Invalid cells map to 0, as does everything when `max_disparity` is 0.
    pub fn to_scaled_u8(&self) -> StereoResult<OwnedImage> {
        self.to_scaled_u8_with_bound(self.max_disparity)
    }

    /// Like [`to_scaled_u8`](Self::to_scaled_u8) but maps `bound` to 255
    /// instead of the map's own bound. Disparities above `bound` saturate.
    pub fn to_scaled_u8_with_bound(&self, bound: u32) -> StereoResult<OwnedImage> {
        let max = u64::from(bound);
        let data = self
            .values
            .iter()
            .zip(&self.mask)
            .map(|(&value, &m)| {
                if m == 0 || max == 0 {
                    return 0u8;
                }
                let value = u64::from(value).min(max);
                ((value * 255 + max / 2) / max) as u8
            })
            .collect();
        OwnedImage::new(data, self.width, self.height)
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, disparity: Option<u32>) {
        if let Some(idx) = self.index(x, y) {
            self.values[idx] = disparity.unwrap_or(NO_DISPARITY);
            self.mask[idx] = u8::from(disparity.is_some());
        }
    }

    pub(crate) fn buffers_mut(&mut self) -> (&mut [u32], &mut [u8]) {
        (&mut self.values, &mut self.mask)
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = (&mut [u32], &mut [u8])> {
        let width = self.width.max(1);
        self.values
            .chunks_mut(width)
            .zip(self.mask.chunks_mut(width))
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }
}
