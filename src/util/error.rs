//! Error types for stereomatch.

use thiserror::Error;

/// Result alias for stereomatch operations.
pub type Result<T> = std::result::Result<T, StereoError>;

/// Errors that can occur when running stereomatch algorithms.
///
/// Every variant is raised by a precondition check, so a failed call never
/// leaves a partially computed disparity map behind.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StereoError {
    /// A configuration value is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// Left and right inputs differ in a dimension that must match.
    #[error("{context} mismatch: left has {left}, right has {right}")]
    LengthMismatch {
        /// Which dimension was compared.
        context: &'static str,
        left: usize,
        right: usize,
    },
    /// A normalization constant is zero.
    #[error("division by zero: `{name}` must be non-zero")]
    DivisionByZero { name: &'static str },
    /// Image dimensions overflow or disagree with the buffer length.
    #[error("invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Stride is smaller than the row width.
    #[error("invalid stride: width={width}, stride={stride}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer does not cover the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Requested region does not fit inside the image.
    #[error("roi out of bounds: x={x}, y={y}, width={width}, height={height}, image={img_width}x{img_height}")]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Image decoding or encoding failed.
    #[error("image io failed: {reason}")]
    ImageIo { reason: String },
}
