//! Export encoding.
//!
//! This module provides functionality for:
//! - Encoding the displayed image to PNG (alpha preserved)
//! - Encoding to JPEG with configurable quality (alpha composited onto white)
//! - Naming the download `epigimp-export.<ext>`

mod export;

pub use export::{
    encode, export, export_file_name, EncodeError, ExportedFile, DEFAULT_JPEG_QUALITY,
    EXPORT_BASE_NAME,
};
