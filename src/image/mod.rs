//! Image views and owned grayscale buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. Windows are zero-copy
//! views into the same backing slice and retain the original stride.
//!
//! Views with zero width or height are valid and describe an empty image; the
//! disparity algorithms return empty maps for them.

use crate::util::{StereoError, StereoResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> StereoResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> StereoResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(StereoError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns true when the view holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Iterates over the rows of the view, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Returns a zero-copy view of the `width x height` region at `(x, y)`.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> StereoResult<ImageView<'a, T>> {
        let out_of_bounds = StereoError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }
        if width == 0 || height == 0 {
            return ImageView::new(&self.data[..0], width, height, self.stride);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(StereoError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(StereoError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.stride)
    }

    /// Returns the square `size x size` window centered at `(cx, cy)`.
    ///
    /// `size` is expected to be odd; the window spans `size / 2` pixels on
    /// each side of the center.
    pub fn centered_window(&self, cx: usize, cy: usize, size: usize) -> StereoResult<Self> {
        let half = size / 2;
        let out_of_bounds = || StereoError::RoiOutOfBounds {
            x: cx,
            y: cy,
            width: size,
            height: size,
            img_width: self.width,
            img_height: self.height,
        };
        let x0 = cx.checked_sub(half).ok_or_else(out_of_bounds)?;
        let y0 = cy.checked_sub(half).ok_or_else(out_of_bounds)?;
        self.roi(x0, y0, size, size)
    }
}

/// Checks that two views describe images of the same size.
///
/// Fails with `LengthMismatch` naming the first differing dimension.
pub(crate) fn check_same_size<T>(
    left: ImageView<'_, T>,
    right: ImageView<'_, T>,
) -> StereoResult<()> {
    if left.width() != right.width() {
        return Err(StereoError::LengthMismatch {
            context: "image width",
            left: left.width(),
            right: right.width(),
        });
    }
    if left.height() != right.height() {
        return Err(StereoError::LengthMismatch {
            context: "image height",
            left: left.height(),
            right: right.height(),
        });
    }
    Ok(())
}

fn required_len(width: usize, height: usize, stride: usize) -> StereoResult<usize> {
    if stride < width {
        return Err(StereoError::InvalidStride { width, stride });
    }
    if width == 0 || height == 0 {
        return Ok(0);
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(StereoError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous grayscale image buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Wraps a row-major buffer whose length must equal `width * height`.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> StereoResult<Self> {
        let needed = width
            .checked_mul(height)
            .ok_or(StereoError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(StereoError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(StereoError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> StereoResult<Self> {
        let width = view.width();
        let height = view.height();
        let needed = width
            .checked_mul(height)
            .ok_or(StereoError::InvalidDimensions { width, height })?;
        let mut data = Vec::with_capacity(needed);
        for row in view.rows() {
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pixel buffer in row-major order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its pixel buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{check_same_size, ImageView};
    use crate::util::StereoError;

    #[test]
    fn same_size_check_reports_first_differing_dimension() {
        let data = [0u8; 12];
        let a = ImageView::from_slice(&data, 4, 3).unwrap();
        let b = ImageView::from_slice(&data, 3, 4).unwrap();
        let c = ImageView::from_slice(&data[..8], 4, 2).unwrap();

        assert!(check_same_size(a, a).is_ok());
        assert_eq!(
            check_same_size(a, b),
            Err(StereoError::LengthMismatch {
                context: "image width",
                left: 4,
                right: 3,
            })
        );
        assert_eq!(
            check_same_size(a, c),
            Err(StereoError::LengthMismatch {
                context: "image height",
                left: 3,
                right: 2,
            })
        );
    }

    #[test]
    fn padding_does_not_affect_size_check() {
        let padded = [0u8; 10];
        let tight = [0u8; 6];
        let a = ImageView::new(&padded, 3, 2, 5).unwrap();
        let b = ImageView::from_slice(&tight, 3, 2).unwrap();
        assert!(check_same_size(a, b).is_ok());
    }
}
