//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::disparity::DisparityMap;
use crate::image::{ImageView, OwnedImage};
use crate::util::{StereoError, StereoResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> StereoResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> StereoResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::new(img.as_raw().clone(), width, height)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> StereoResult<OwnedImage> {
    let img = image::open(path).map_err(|err| StereoError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Converts an owned grayscale image into an `image::GrayImage`.
pub fn to_gray_image(img: &OwnedImage) -> StereoResult<image::GrayImage> {
    let width = u32::try_from(img.width()).map_err(|_| StereoError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    let height = u32::try_from(img.height()).map_err(|_| StereoError::InvalidDimensions {
        width: img.width(),
        height: img.height(),
    })?;
    image::GrayImage::from_raw(width, height, img.data().to_vec()).ok_or(
        StereoError::BufferTooSmall {
            needed: img.width() * img.height(),
            got: img.data().len(),
        },
    )
}

/// Saves a disparity map as an 8-bit grayscale image scaled to `[0, 255]`.
///
/// The output format is inferred from the path extension.
pub fn save_disparity_image<P: AsRef<Path>>(map: &DisparityMap, path: P) -> StereoResult<()> {
    save_disparity_image_with_bound(map, map.max_disparity(), path)
}

/// Saves a disparity map with `bound` mapped to 255.
///
/// Useful for scanline maps, whose recorded bound is the full image width.
pub fn save_disparity_image_with_bound<P: AsRef<Path>>(
    map: &DisparityMap,
    bound: u32,
    path: P,
) -> StereoResult<()> {
    let gray = to_gray_image(&map.to_scaled_u8_with_bound(bound)?)?;
    gray.save(path).map_err(|err| StereoError::ImageIo {
        reason: err.to_string(),
    })
}
