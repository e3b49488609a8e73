//! Image import for the editor.
//!
//! This module provides functionality for:
//! - Validating the MIME type of an imported file (PNG and JPEG only)
//! - Decoding PNG/JPEG bytes into RGBA bitmaps
//! - Applying EXIF orientation so photos appear upright
//!
//! # Architecture
//!
//! Decoding runs synchronously on the caller's thread. A failed import never
//! touches editor state; the session only swaps in the new bitmap once
//! decoding has fully succeeded.

mod image;
mod types;

pub use self::image::{decode_image, get_orientation};
pub use types::{DecodeError, ImageFormat, Orientation, SUPPORTED_MIME_TYPES};
