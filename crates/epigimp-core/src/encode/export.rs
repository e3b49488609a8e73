//! PNG/JPEG encoding for export.
//!
//! PNG keeps the alpha channel. JPEG has none, so transparent areas are
//! composited onto white before encoding. This differs from a browser
//! canvas `toBlob("image/jpeg")`, which fills transparency with black.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

use crate::bitmap::{buffer_len, Bitmap, CHANNELS};
use crate::decode::ImageFormat;

/// Base name of every exported file.
pub const EXPORT_BASE_NAME: &str = "epigimp-export";

/// Default JPEG quality for export.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Errors that can occur during export encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec rejected the image
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// A finished export, ready to hand to the browser as a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Download name for an export in the given format.
pub fn export_file_name(format: ImageFormat) -> String {
    format!("{}.{}", EXPORT_BASE_NAME, format.extension())
}

/// Encode a bitmap in the given format.
///
/// `quality` only applies to JPEG and is clamped to 1-100.
pub fn encode(bitmap: &Bitmap, format: ImageFormat, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len =
        buffer_len(width, height).ok_or(EncodeError::InvalidDimensions { width, height })?;
    if bitmap.pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: bitmap.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => PngEncoder::new(&mut buffer)
            .write_image(&bitmap.pixels, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?,
        ImageFormat::Jpeg => {
            let rgb = flatten_onto_white(&bitmap.pixels);
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?
        }
    }

    Ok(buffer.into_inner())
}

/// Encode and wrap with the download name and MIME type.
pub fn export(bitmap: &Bitmap, format: ImageFormat, quality: u8) -> Result<ExportedFile, EncodeError> {
    let bytes = encode(bitmap, format, quality)?;
    log::info!(
        "Exported {}x{} image as {} ({} bytes)",
        bitmap.width,
        bitmap.height,
        format.mime_type(),
        bytes.len()
    );
    Ok(ExportedFile {
        file_name: export_file_name(format),
        mime_type: format.mime_type().to_string(),
        bytes,
    })
}

/// Composite straight-alpha RGBA onto an opaque white background, dropping alpha.
fn flatten_onto_white(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / CHANNELS * 3);
    for px in rgba.chunks_exact(CHANNELS) {
        let a = px[3] as u32;
        for &c in &px[..3] {
            // c * a + 255 * (1 - a), rounded
            rgb.push(((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::BitmapOrigin;
    use crate::decode::decode_image;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Bitmap {
        Bitmap::new(
            width,
            height,
            rgba.repeat((width * height) as usize),
            BitmapOrigin::Rendered,
        )
    }

    #[test]
    fn test_encode_png_magic_and_alpha_preserved() {
        let bitmap = solid(4, 3, [10, 20, 30, 77]);
        let bytes = encode(&bitmap, ImageFormat::Png, 0).unwrap();

        assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let decoded = decode_image(&bytes, "image/png").unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.pixels, bitmap.pixels);
    }

    #[test]
    fn test_encode_jpeg_markers() {
        let bitmap = solid(16, 16, [128, 128, 128, 255]);
        let bytes = encode(&bitmap, ImageFormat::Jpeg, 90).unwrap();

        // SOI and EOI markers
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_jpeg_transparent_becomes_white() {
        let bitmap = solid(8, 8, [0, 0, 0, 0]);
        let bytes = encode(&bitmap, ImageFormat::Jpeg, 100).unwrap();
        let decoded = decode_image(&bytes, "image/jpeg").unwrap();

        let [r, g, b, a] = decoded.pixel(4, 4).unwrap();
        assert!(r > 245 && g > 245 && b > 245, "got {:?}", (r, g, b));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_flatten_onto_white() {
        assert_eq!(flatten_onto_white(&[200, 100, 0, 255]), vec![200, 100, 0]);
        assert_eq!(flatten_onto_white(&[0, 0, 0, 0]), vec![255, 255, 255]);
        assert_eq!(flatten_onto_white(&[0, 0, 0, 128]), vec![127, 127, 127]);
    }

    #[test]
    fn test_encode_zero_dimensions() {
        let bitmap = Bitmap::transparent(0, 5, BitmapOrigin::Rendered);
        assert_eq!(
            encode(&bitmap, ImageFormat::Png, 90),
            Err(EncodeError::InvalidDimensions { width: 0, height: 5 })
        );
    }

    #[test]
    fn test_encode_invalid_pixel_data() {
        let bitmap = Bitmap {
            width: 2,
            height: 2,
            pixels: vec![0; 12],
            origin: BitmapOrigin::Rendered,
        };
        assert_eq!(
            encode(&bitmap, ImageFormat::Jpeg, 90),
            Err(EncodeError::InvalidPixelData {
                expected: 16,
                actual: 12
            })
        );
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(export_file_name(ImageFormat::Png), "epigimp-export.png");
        assert_eq!(export_file_name(ImageFormat::Jpeg), "epigimp-export.jpg");
    }

    #[test]
    fn test_export_wraps_metadata() {
        let file = export(&solid(2, 2, [1, 2, 3, 255]), ImageFormat::Jpeg, 92).unwrap();
        assert_eq!(file.file_name, "epigimp-export.jpg");
        assert_eq!(file.mime_type, "image/jpeg");
        assert!(!file.bytes.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::bitmap::BitmapOrigin;
    use proptest::prelude::*;

    fn format_strategy() -> impl Strategy<Value = ImageFormat> {
        prop_oneof![Just(ImageFormat::Png), Just(ImageFormat::Jpeg)]
    }

    proptest! {
        /// Property: every quality value works after clamping.
        #[test]
        fn prop_all_quality_values_work(quality in 0u8..=255) {
            let bitmap = Bitmap::new(10, 10, vec![128u8; 10 * 10 * 4], BitmapOrigin::Rendered);
            let result = encode(&bitmap, ImageFormat::Jpeg, quality);
            prop_assert!(result.is_ok(), "Quality {} should work after clamping", quality);
        }

        /// Property: same input always produces the same bytes.
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            format in format_strategy(),
        ) {
            let bitmap = Bitmap::new(
                width,
                height,
                vec![100u8; buffer_len(width, height).unwrap()],
                BitmapOrigin::Rendered,
            );
            let first = encode(&bitmap, format, 90);
            let second = encode(&bitmap, format, 90);
            prop_assert!(first.is_ok());
            prop_assert_eq!(first, second);
        }

        /// Property: PNG export is lossless for any pixel content.
        #[test]
        fn prop_png_lossless(
            (width, height) in (1u32..=12, 1u32..=12),
            seed in any::<u8>(),
        ) {
            let pixels: Vec<u8> = (0..buffer_len(width, height).unwrap())
                .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
                .collect();
            let bitmap = Bitmap::new(width, height, pixels.clone(), BitmapOrigin::Rendered);
            let bytes = encode(&bitmap, ImageFormat::Png, 0).unwrap();
            let decoded = crate::decode::decode_image(&bytes, "image/png").unwrap();
            prop_assert_eq!(decoded.pixels, pixels);
        }
    }
}
