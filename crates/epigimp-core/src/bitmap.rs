//! Raw RGBA pixel buffers.
//!
//! A [`Bitmap`] is the unit every pipeline stage hands to the next. Once built
//! it is treated as immutable: stages that change pixels produce a new bitmap
//! instead of editing one that history may still reference.

use serde::{Deserialize, Serialize};

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Where a bitmap's pixels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitmapOrigin {
    /// Decoded from an imported PNG/JPEG file.
    #[default]
    Decoded,
    /// Extracted from a crop selection.
    Cropped,
    /// Produced by flattening the drawing overlay.
    Flattened,
    /// Produced by a render pass (transforms and filters applied).
    Rendered,
}

/// A decoded image with RGBA8 pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
    /// How this bitmap was produced.
    pub origin: BitmapOrigin,
}

impl Bitmap {
    /// Create a new Bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, origin: BitmapOrigin) -> Self {
        debug_assert_eq!(
            Some(pixels.len()),
            buffer_len(width, height),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
            origin,
        }
    }

    /// Create a fully transparent bitmap.
    ///
    /// Dimensions whose buffer length overflows `usize` yield an empty
    /// bitmap; callers validate sizes before allocating.
    pub fn transparent(width: u32, height: u32, origin: BitmapOrigin) -> Self {
        match buffer_len(width, height) {
            Some(len) => Self {
                width,
                height,
                pixels: vec![0u8; len],
                origin,
            },
            None => Self {
                width: 0,
                height: 0,
                pixels: Vec::new(),
                origin,
            },
        }
    }

    /// Create a Bitmap from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage, origin: BitmapOrigin) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
            origin,
        }
    }

    /// Convert to an image::RgbaImage for encoding.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Width and height as a tuple.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte offset of pixel (x, y). Caller guarantees the point is in bounds.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// RGBA value at (x, y), or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Length in bytes of an RGBA8 buffer of the given dimensions, or `None`
/// when it does not fit in `usize`.
#[inline]
pub fn buffer_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

/// An RGB colour used for brush strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Format as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
