//! Per-pixel colour filters.
//!
//! ## Filter Order
//! 1. Grayscale or sepia (never both)
//! 2. Contrast
//!
//! Filters work on RGBA8 buffers in place and never touch the alpha channel.

use serde::{Deserialize, Serialize};

/// Lowest accepted contrast value.
pub const CONTRAST_MIN: i32 = -100;
/// Highest accepted contrast value.
pub const CONTRAST_MAX: i32 = 100;

/// A toggleable colour filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Grayscale,
    Sepia,
}

/// Active colour filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Average the RGB channels.
    pub grayscale: bool,
    /// Apply the sepia tone matrix.
    pub sepia: bool,
    /// Contrast (-100 to 100)
    pub contrast: i32,
}

impl FilterState {
    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Flip one tone filter. Switching one on switches the other off.
    pub fn toggle(&mut self, kind: FilterKind) {
        match kind {
            FilterKind::Grayscale => {
                self.grayscale = !self.grayscale;
                if self.grayscale {
                    self.sepia = false;
                }
            }
            FilterKind::Sepia => {
                self.sepia = !self.sepia;
                if self.sepia {
                    self.grayscale = false;
                }
            }
        }
    }
}

/// Check that a contrast value lies in [-100, 100].
#[inline]
pub fn is_valid_contrast(contrast: i32) -> bool {
    (CONTRAST_MIN..=CONTRAST_MAX).contains(&contrast)
}

/// Apply all active filters to RGBA pixel data in place.
///
/// Trailing bytes that do not form a whole pixel are left alone. The contrast
/// value is clamped defensively; callers are expected to have validated it.
pub fn apply_filters(pixels: &mut [u8], filters: &FilterState) {
    if filters.is_default() {
        return;
    }

    let contrast = filters.contrast.clamp(CONTRAST_MIN, CONTRAST_MAX);
    let factor = contrast_factor(contrast);

    for chunk in pixels.chunks_exact_mut(4) {
        let mut rgb = [chunk[0], chunk[1], chunk[2]];

        if filters.grayscale {
            rgb = grayscale(rgb);
        } else if filters.sepia {
            rgb = sepia(rgb);
        }

        if contrast != 0 {
            rgb = apply_contrast(rgb, factor);
        }

        chunk[..3].copy_from_slice(&rgb);
    }
}

/// Unweighted mean of the three channels.
#[inline]
fn grayscale([r, g, b]: [u8; 3]) -> [u8; 3] {
    let sum = r as u16 + g as u16 + b as u16;
    let mean = (sum as f32 / 3.0).round() as u8;
    [mean, mean, mean]
}

/// Classic sepia tone matrix.
#[inline]
fn sepia([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    [
        to_channel(0.393 * r + 0.769 * g + 0.189 * b),
        to_channel(0.349 * r + 0.686 * g + 0.168 * b),
        to_channel(0.272 * r + 0.534 * g + 0.131 * b),
    ]
}

/// Contrast multiplier for `c` in [-100, 100]. `c = 0` gives exactly 1.
///
/// Formula: `259 * (c + 255) / (255 * (259 - c))`
#[inline]
pub fn contrast_factor(contrast: i32) -> f32 {
    let c = contrast as f32;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

#[inline]
fn apply_contrast(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    rgb.map(|v| to_channel(factor * (v as f32 - 128.0) + 128.0))
}

#[inline]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> Vec<u8> {
        vec![r, g, b, 255]
    }

    fn apply(pixels: &[u8], filters: &FilterState) -> Vec<u8> {
        let mut out = pixels.to_vec();
        apply_filters(&mut out, filters);
        out
    }

    #[test]
    fn test_default_is_noop() {
        let pixels = vec![12, 34, 56, 78, 90, 120, 200, 10];
        assert_eq!(apply(&pixels, &FilterState::default()), pixels);
    }

    #[test]
    fn test_zero_contrast_is_identity() {
        assert_eq!(contrast_factor(0), 1.0);
        let pixels: Vec<u8> = (0..=255).flat_map(|v| [v, 255 - v, v / 2, 77]).collect();
        let mut filters = FilterState::default();
        filters.contrast = 0;
        assert_eq!(apply(&pixels, &filters), pixels);
    }

    #[test]
    fn test_grayscale_uses_plain_mean() {
        let filters = FilterState {
            grayscale: true,
            ..Default::default()
        };
        // (90 + 150 + 210) / 3 = 150
        assert_eq!(apply(&pixel(90, 150, 210), &filters), vec![150, 150, 150, 255]);
        // (255 + 0 + 0) / 3 = 85
        assert_eq!(apply(&pixel(255, 0, 0), &filters), vec![85, 85, 85, 255]);
    }

    #[test]
    fn test_sepia_matrix() {
        let filters = FilterState {
            sepia: true,
            ..Default::default()
        };
        let result = apply(&pixel(100, 150, 200), &filters);
        // 0.393*100 + 0.769*150 + 0.189*200 = 192.45
        assert_eq!(result[0], 192);
        // 0.349*100 + 0.686*150 + 0.168*200 = 171.4
        assert_eq!(result[1], 171);
        // 0.272*100 + 0.534*150 + 0.131*200 = 133.5
        assert!((result[2] as i32 - 134).abs() <= 1);
        assert_eq!(result[3], 255);
    }

    #[test]
    fn test_sepia_clamps_white() {
        let filters = FilterState {
            sepia: true,
            ..Default::default()
        };
        let result = apply(&pixel(255, 255, 255), &filters);
        assert_eq!(result[0], 255);
        assert_eq!(result[1], 255);
        // 0.937 * 255 = 238.9
        assert_eq!(result[2], 239);
    }

    #[test]
    fn test_contrast_positive_spreads_values() {
        let filters = FilterState {
            contrast: 50,
            ..Default::default()
        };
        let result = apply(&[100, 128, 160, 255], &filters);
        assert!(result[0] < 100);
        assert_eq!(result[1], 128);
        assert!(result[2] > 160);
    }

    #[test]
    fn test_contrast_negative_pulls_toward_mid() {
        let filters = FilterState {
            contrast: -100,
            ..Default::default()
        };
        let result = apply(&[0, 128, 255, 255], &filters);
        assert!(result[0] > 0);
        assert_eq!(result[1], 128);
        assert!(result[2] < 255);
    }

    #[test]
    fn test_alpha_untouched() {
        let filters = FilterState {
            sepia: true,
            contrast: 100,
            ..Default::default()
        };
        let result = apply(&[10, 20, 30, 0, 200, 100, 50, 17], &filters);
        assert_eq!(result[3], 0);
        assert_eq!(result[7], 17);
    }

    #[test]
    fn test_grayscale_then_contrast_order() {
        let filters = FilterState {
            grayscale: true,
            contrast: 40,
            ..Default::default()
        };
        let result = apply(&pixel(30, 120, 240), &filters);
        // Gray first, so contrast keeps all channels equal
        assert_eq!(result[0], result[1]);
        assert_eq!(result[1], result[2]);
    }

    #[test]
    fn test_toggle_exclusivity() {
        let mut filters = FilterState::default();
        filters.toggle(FilterKind::Grayscale);
        assert!(filters.grayscale && !filters.sepia);

        filters.toggle(FilterKind::Sepia);
        assert!(filters.sepia && !filters.grayscale);

        filters.toggle(FilterKind::Sepia);
        assert!(!filters.sepia && !filters.grayscale);
    }

    #[test]
    fn test_toggle_round_trip_restores_state() {
        let before = FilterState {
            contrast: 25,
            ..Default::default()
        };
        let mut filters = before;
        filters.toggle(FilterKind::Grayscale);
        filters.toggle(FilterKind::Grayscale);
        assert_eq!(filters, before);
    }

    #[test]
    fn test_contrast_validation() {
        assert!(is_valid_contrast(-100));
        assert!(is_valid_contrast(0));
        assert!(is_valid_contrast(100));
        assert!(!is_valid_contrast(101));
        assert!(!is_valid_contrast(-101));
    }

    #[test]
    fn test_incomplete_pixel_ignored() {
        let mut pixels = vec![255, 0, 0, 255, 64];
        let filters = FilterState {
            grayscale: true,
            ..Default::default()
        };
        apply_filters(&mut pixels, &filters);
        assert_eq!(pixels[0], 85);
        assert_eq!(pixels[4], 64);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
