//! Image import WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, is_supported_mime_type } from '@epigimp/wasm';
//!
//! if (!is_supported_mime_type(file.type)) {
//!   showError('Please import a PNG or JPG image');
//! }
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes, file.type);
//! ```

use crate::types::{to_js_error, JsBitmap};
use epigimp_core::decode;
use wasm_bindgen::prelude::*;

/// Decode PNG or JPEG bytes into an RGBA bitmap.
///
/// JPEG EXIF orientation is applied, so the result is upright.
///
/// # Errors
///
/// Returns an error if the MIME type is not PNG/JPEG or the bytes cannot be
/// decoded.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8], mime_type: &str) -> Result<JsBitmap, JsValue> {
    decode::decode_image(bytes, mime_type)
        .map(JsBitmap::from_bitmap)
        .map_err(to_js_error)
}

/// Check whether a MIME type can be imported.
#[wasm_bindgen]
pub fn is_supported_mime_type(mime_type: &str) -> bool {
    decode::ImageFormat::from_mime(mime_type).is_ok()
}
