//! Crop extraction.
//!
//! Crops cut a rectangle out of the rendered buffer in buffer pixel space and
//! copy it into a standalone bitmap that becomes the new base image.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel of the buffer
//! - Selections may start outside the buffer; they are intersected with it
//! - Selections smaller than the minimum size on either axis are rejected

use serde::{Deserialize, Serialize};

use crate::bitmap::{Bitmap, BitmapOrigin, CHANNELS};

use super::CropError;

/// Smallest accepted crop edge, in buffer pixels.
pub const MIN_CROP_SIZE: u32 = 10;

/// A crop selection in buffer pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from two drag corners in any order.
    pub fn from_corners(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: x0.abs_diff(x1).min(u32::MAX as u64) as u32,
            height: y0.abs_diff(y1).min(u32::MAX as u64) as u32,
        }
    }

    /// Intersect with a `width × height` buffer, returning `(x, y, w, h)`.
    fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.x.saturating_add(self.width as i64).min(width as i64);
        let bottom = self.y.saturating_add(self.height as i64).min(height as i64);

        if right <= left || bottom <= top {
            return None;
        }
        Some((
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// Extract `rect` from `buffer` into a new bitmap.
///
/// # Errors
///
/// - `CropError::InvalidDimensions` if the source buffer is empty
/// - `CropError::DegenerateSelection` if either edge is below `min_size`,
///   before or after clamping to the buffer
/// - `CropError::OutOfBounds` if the selection misses the buffer entirely
pub fn extract(buffer: &Bitmap, rect: CropRect, min_size: u32) -> Result<Bitmap, CropError> {
    if buffer.is_empty() {
        return Err(CropError::InvalidDimensions {
            width: buffer.width,
            height: buffer.height,
        });
    }

    if rect.width < min_size || rect.height < min_size {
        return Err(CropError::DegenerateSelection {
            width: rect.width,
            height: rect.height,
        });
    }

    let (left, top, out_width, out_height) = rect
        .clamp_to(buffer.width, buffer.height)
        .ok_or(CropError::OutOfBounds)?;

    if out_width < min_size || out_height < min_size {
        return Err(CropError::DegenerateSelection {
            width: out_width,
            height: out_height,
        });
    }

    let row_bytes = out_width as usize * CHANNELS;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in top..top + out_height {
        let start = buffer.offset(left, y);
        output.extend_from_slice(&buffer.pixels[start..start + row_bytes]);
    }

    Ok(Bitmap::new(
        out_width,
        out_height,
        output,
        BitmapOrigin::Cropped,
    ))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
