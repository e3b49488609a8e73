//! Geometric operations: rotation, flip, resize and crop.
//!
//! # Transform Order
//!
//! A render pass applies, from the source outwards:
//! 1. Stretch to the resize target
//! 2. Flip (horizontal, vertical)
//! 3. Quarter-turn rotation
//! 4. Free rotation
//!
//! Colour filters run on the rendered buffer afterwards (see [`crate::filter`]).
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Crop coordinates are buffer pixels
//! - Origin is top-left corner

mod crop;
mod render;
mod state;

use thiserror::Error;

pub use crop::{extract, CropRect, MIN_CROP_SIZE};
pub use render::{
    check_canvas_size, compose_matrix, render, Affine, InterpolationFilter, MAX_CANVAS_PIXELS,
};
pub use state::TransformState;

/// Errors from rendering a transformed bitmap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// Target (or source) has a zero dimension.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Target is larger than the canvas pixel limit.
    #[error("Canvas {width}x{height} exceeds the {MAX_CANVAS_PIXELS} pixel limit")]
    TooLarge { width: u32, height: u32 },
}

/// Errors from extracting a crop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CropError {
    /// The buffer being cropped has a zero dimension.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The selection is smaller than the minimum crop size.
    #[error("Crop selection {width}x{height} is below the minimum size")]
    DegenerateSelection { width: u32, height: u32 },

    /// The selection does not overlap the buffer.
    #[error("Crop selection lies outside the image")]
    OutOfBounds,
}
