//! Image export WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_image, export_file_name } from '@epigimp/wasm';
//!
//! const bytes = encode_image(image, 'jpg', 92);
//! download(new Blob([bytes], { type: 'image/jpeg' }), export_file_name('jpg'));
//! ```

use crate::types::{parse_format, to_js_error, JsBitmap};
use epigimp_core::encode;
use wasm_bindgen::prelude::*;

/// Encode a bitmap as PNG or JPEG.
///
/// # Arguments
///
/// * `image` - The RGBA bitmap to encode
/// * `format` - `"png"`, `"jpg"` or `"jpeg"`
/// * `quality` - JPEG quality (1-100); ignored for PNG
///
/// # Errors
///
/// Returns an error for an unknown format, a pixel buffer that doesn't match
/// the dimensions, or an encoder failure.
#[wasm_bindgen]
pub fn encode_image(image: &JsBitmap, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    let format = parse_format(format)
        .ok_or_else(|| to_js_error(format!("Unknown export format '{}'", format)))?;
    let bitmap = image.to_bitmap().ok_or_else(|| {
        to_js_error(format!(
            "Pixel data does not match {}x{}",
            image.width(),
            image.height()
        ))
    })?;
    encode::encode(&bitmap, format, quality).map_err(to_js_error)
}

/// Download name for an export: `epigimp-export.png` or `epigimp-export.jpg`.
#[wasm_bindgen]
pub fn export_file_name(format: &str) -> Result<String, JsValue> {
    parse_format(format)
        .map(encode::export_file_name)
        .ok_or_else(|| to_js_error(format!("Unknown export format '{}'", format)))
}
