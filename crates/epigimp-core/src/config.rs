//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::bitmap::Rgb;
use crate::encode::DEFAULT_JPEG_QUALITY;
use crate::history::DEFAULT_CAPACITY;
use crate::overlay::DEFAULT_STROKE_WIDTH;
use crate::transform::{InterpolationFilter, MIN_CROP_SIZE};

/// Tunable editor settings. Missing fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of history entries kept.
    pub history_capacity: usize,
    /// Smallest crop edge accepted, in buffer pixels.
    pub min_crop_size: u32,
    /// JPEG export quality (1-100).
    pub jpeg_quality: u8,
    /// Sampling used when rendering transforms.
    pub interpolation: InterpolationFilter,
    /// Brush width for a new session.
    pub default_brush_size: u32,
    /// Brush colour for a new session, as `#rrggbb`.
    pub default_brush_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            min_crop_size: MIN_CROP_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            interpolation: InterpolationFilter::default(),
            default_brush_size: DEFAULT_STROKE_WIDTH,
            default_brush_color: Rgb::BLACK.to_hex(),
        }
    }
}

impl EditorConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with out-of-range values pulled back into range.
    ///
    /// An unparseable brush colour falls back to black.
    pub fn normalized(&self) -> Self {
        let default_brush_color = match Rgb::from_hex(&self.default_brush_color) {
            Some(color) => color.to_hex(),
            None => {
                log::warn!(
                    "Invalid default brush colour '{}', using black",
                    self.default_brush_color
                );
                Rgb::BLACK.to_hex()
            }
        };
        Self {
            history_capacity: self.history_capacity.max(1),
            min_crop_size: self.min_crop_size.max(1),
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            interpolation: self.interpolation,
            default_brush_size: self.default_brush_size.max(1),
            default_brush_color,
        }
    }

    /// Default brush colour, parsed.
    pub fn brush_color(&self) -> Rgb {
        Rgb::from_hex(&self.default_brush_color).unwrap_or(Rgb::BLACK)
    }
}
