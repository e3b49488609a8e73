//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core EpiGimp
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use epigimp_core::bitmap::buffer_len;
use epigimp_core::{Bitmap, BitmapOrigin, DrawingMode, ExportedFile, FilterKind, ImageFormat};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use web_sys::ImageData;

/// An RGBA bitmap wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`. To draw onto a canvas, prefer
/// `to_image_data()`, which hands the buffer straight to an `ImageData`.
///
/// The generated `free()` method releases WASM memory early; otherwise
/// wasm-bindgen's finalizer handles cleanup.
#[wasm_bindgen]
pub struct JsBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    origin: BitmapOrigin,
}

#[wasm_bindgen]
impl JsBitmap {
    /// Create a new JsBitmap from dimensions and RGBA pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsBitmap {
        JsBitmap {
            width,
            height,
            pixels,
            origin: BitmapOrigin::Decoded,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// How the bitmap was produced: "decoded", "cropped", "flattened" or "rendered".
    #[wasm_bindgen(getter)]
    pub fn origin(&self) -> String {
        origin_name(self.origin).to_string()
    }

    /// Returns RGBA pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Wrap the pixels in an `ImageData` for `putImageData`.
    pub fn to_image_data(&self) -> Result<ImageData, JsValue> {
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(&self.pixels), self.width, self.height)
    }
}

impl JsBitmap {
    /// Create a JsBitmap from a core Bitmap.
    pub(crate) fn from_bitmap(bitmap: Bitmap) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            pixels: bitmap.pixels,
            origin: bitmap.origin,
        }
    }

    /// Convert back to a core Bitmap (clones the pixel data).
    ///
    /// Returns `None` if the pixel buffer does not match the dimensions.
    pub(crate) fn to_bitmap(&self) -> Option<Bitmap> {
        if Some(self.pixels.len()) != buffer_len(self.width, self.height) {
            return None;
        }
        Some(Bitmap::new(
            self.width,
            self.height,
            self.pixels.clone(),
            self.origin,
        ))
    }
}

/// An encoded export ready for download.
#[wasm_bindgen]
pub struct JsExportedFile {
    inner: ExportedFile,
}

#[wasm_bindgen]
impl JsExportedFile {
    /// Suggested download name, e.g. `epigimp-export.png`.
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime_type.clone()
    }

    /// Encoded file bytes as Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }
}

impl From<ExportedFile> for JsExportedFile {
    fn from(inner: ExportedFile) -> Self {
        Self { inner }
    }
}

fn origin_name(origin: BitmapOrigin) -> &'static str {
    match origin {
        BitmapOrigin::Decoded => "decoded",
        BitmapOrigin::Cropped => "cropped",
        BitmapOrigin::Flattened => "flattened",
        BitmapOrigin::Rendered => "rendered",
    }
}

/// Parse a filter name: "grayscale" or "sepia".
pub(crate) fn parse_filter_kind(name: &str) -> Option<FilterKind> {
    match name.trim().to_ascii_lowercase().as_str() {
        "grayscale" | "greyscale" => Some(FilterKind::Grayscale),
        "sepia" => Some(FilterKind::Sepia),
        _ => None,
    }
}

/// Parse a drawing tool name: "none", "brush" or "eraser".
pub(crate) fn parse_drawing_mode(name: &str) -> Option<DrawingMode> {
    match name.trim().to_ascii_lowercase().as_str() {
        "none" | "" => Some(DrawingMode::None),
        "brush" => Some(DrawingMode::Brush),
        "eraser" => Some(DrawingMode::Eraser),
        _ => None,
    }
}

/// Parse an export format: "png", "jpg" or "jpeg".
pub(crate) fn parse_format(name: &str) -> Option<ImageFormat> {
    ImageFormat::from_name(name)
}

/// Convert any displayable error into a JavaScript `Error`.
pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_bitmap_creation() {
        let img = JsBitmap::new(100, 50, vec![0u8; 100 * 50 * 4]);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
        assert_eq!(img.origin(), "decoded");
    }

    #[test]
    fn test_js_bitmap_pixels() {
        let pixels = vec![255u8, 128, 64, 255, 32, 16, 8, 0];
        let img = JsBitmap::new(2, 1, pixels.clone());
        assert_eq!(img.pixels(), pixels);
    }

    #[test]
    fn test_bitmap_round_trip() {
        let bitmap = Bitmap::new(2, 2, vec![9u8; 16], BitmapOrigin::Cropped);
        let js = JsBitmap::from_bitmap(bitmap.clone());
        assert_eq!(js.origin(), "cropped");
        assert_eq!(js.to_bitmap(), Some(bitmap));
    }

    #[test]
    fn test_to_bitmap_rejects_bad_length() {
        let img = JsBitmap::new(2, 2, vec![0u8; 15]);
        assert_eq!(img.to_bitmap(), None);

        let huge = JsBitmap::new(u32::MAX, u32::MAX, vec![0u8; 4]);
        assert_eq!(huge.to_bitmap(), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_filter_kind("Sepia"), Some(FilterKind::Sepia));
        assert_eq!(parse_filter_kind("grayscale"), Some(FilterKind::Grayscale));
        assert_eq!(parse_filter_kind("blur"), None);

        assert_eq!(parse_drawing_mode("brush"), Some(DrawingMode::Brush));
        assert_eq!(parse_drawing_mode("none"), Some(DrawingMode::None));
        assert_eq!(parse_drawing_mode("pencil"), None);

        assert_eq!(parse_format("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(parse_format("PNG"), Some(ImageFormat::Png));
        assert_eq!(parse_format("gif"), None);
    }

    #[test]
    fn test_exported_file_accessors() {
        let file = JsExportedFile::from(ExportedFile {
            file_name: "epigimp-export.png".to_string(),
            mime_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });
        assert_eq!(file.file_name(), "epigimp-export.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.bytes(), vec![1, 2, 3]);
    }
}
