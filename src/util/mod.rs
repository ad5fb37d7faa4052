//! Shared utility helpers.

pub mod error;

pub use error::{Result as StereoResult, StereoError};
