//! PNG/JPEG decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, ImageFormat, Orientation};
use crate::bitmap::{Bitmap, BitmapOrigin};

/// Decode an imported file into an RGBA bitmap.
///
/// The MIME type is checked first: anything other than PNG or JPEG is
/// rejected before a single byte is parsed. JPEG files get their EXIF
/// orientation applied so the image shows upright.
///
/// # Errors
///
/// Returns `DecodeError::UnsupportedFileType` for other MIME types.
/// Returns `DecodeError::ImageDecodeFailure` if the bytes cannot be decoded.
pub fn decode_image(bytes: &[u8], mime_type: &str) -> Result<Bitmap, DecodeError> {
    let format = ImageFormat::from_mime(mime_type)?;
    if bytes.is_empty() {
        return Err(DecodeError::ImageDecodeFailure("file is empty".to_string()));
    }

    // Trust the content over the declared type; fall back to the declared one
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::ImageDecodeFailure(e.to_string()))?;
    if reader.format().is_none() {
        reader.set_format(format.to_image_format());
    }
    let is_jpeg = reader.format() == Some(image::ImageFormat::Jpeg);

    let img = reader
        .decode()
        .map_err(|e| DecodeError::ImageDecodeFailure(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::ImageDecodeFailure(
            "image has no pixels".to_string(),
        ));
    }

    let oriented = if is_jpeg {
        apply_orientation(img, get_orientation(bytes))
    } else {
        img
    };

    log::debug!(
        "Decoded {} image: {}x{}",
        format.extension(),
        oriented.width(),
        oriented.height()
    );

    Ok(Bitmap::from_rgba_image(
        oriented.into_rgba8(),
        BitmapOrigin::Decoded,
    ))
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
