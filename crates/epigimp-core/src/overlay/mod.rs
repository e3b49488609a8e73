//! Drawing overlay: freehand brush and eraser strokes.
//!
//! Strokes accumulate in an overlay buffer kept separate from the base image.
//! The two only meet at flatten time:
//!
//! 1. Eraser coverage is removed from the base (destination-out)
//! 2. Overlay pixels are painted on top (source-over)
//!
//! The overlay lives in displayed-canvas space. Ending a stroke projects it
//! back into the untransformed base through the render matrix.
//!
//! Within one stroke, overlapping segments never double-blend: each pixel
//! keeps the highest coverage any segment gave it, so round joins look like a
//! single continuous line.

mod stroke;

use serde::{Deserialize, Serialize};

use crate::bitmap::{buffer_len, Bitmap, BitmapOrigin, Rgb, CHANNELS};
use crate::transform::Affine;

pub use stroke::{destination_out, distance_to_segment, rasterize_segment, source_over, StrokePoint};

/// Default brush width in pixels.
pub const DEFAULT_STROKE_WIDTH: u32 = 5;

/// Active drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    #[default]
    None,
    Brush,
    Eraser,
}

/// Tool settings used for new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingState {
    pub mode: DrawingMode,
    pub color: Rgb,
    /// Line width in pixels, always positive.
    pub stroke_width: u32,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            mode: DrawingMode::None,
            color: Rgb::BLACK,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Settings captured when a stroke starts.
#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    mode: DrawingMode,
    color: Rgb,
    stroke_width: u32,
    last: StrokePoint,
}

/// Accumulates strokes over a base image of fixed dimensions.
#[derive(Debug, Clone)]
pub struct OverlayCompositor {
    overlay: Bitmap,
    /// Accumulated eraser coverage per pixel (0..=255).
    erase: Vec<u8>,
    /// Coverage reached by the current stroke per pixel (0.0..=1.0).
    stroke_coverage: Vec<f32>,
    stroke: Option<ActiveStroke>,
    dirty: bool,
}

impl OverlayCompositor {
    /// Create a blank transparent overlay.
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            overlay: Bitmap::transparent(width, height, BitmapOrigin::Flattened),
            erase: vec![0; pixel_count],
            stroke_coverage: vec![0.0; pixel_count],
            stroke: None,
            dirty: false,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.overlay.dimensions()
    }

    /// The overlay buffer (brush pixels only, eraser holes applied).
    pub fn overlay(&self) -> &Bitmap {
        &self.overlay
    }

    /// True while a stroke is between begin and end.
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// True when the overlay holds anything that would change a flatten.
    pub fn has_content(&self) -> bool {
        self.dirty
    }

    /// Match new base dimensions. Any change discards the in-progress stroke
    /// and all overlay content.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.dimensions() != (width, height) {
            if self.is_stroking() {
                log::debug!("Overlay resized to {}x{}, discarding stroke", width, height);
            }
            *self = Self::new(width, height);
        }
    }

    /// Drop all overlay content and any in-progress stroke.
    pub fn clear(&mut self) {
        let (width, height) = self.dimensions();
        *self = Self::new(width, height);
    }

    /// Start a stroke at `point`. Returns false (and does nothing) when the
    /// drawing mode is `None`.
    pub fn begin_stroke(&mut self, point: StrokePoint, drawing: &DrawingState) -> bool {
        if drawing.mode == DrawingMode::None {
            return false;
        }

        self.stroke_coverage.fill(0.0);
        self.stroke = Some(ActiveStroke {
            mode: drawing.mode,
            color: drawing.color,
            stroke_width: drawing.stroke_width.max(1),
            last: point,
        });

        // A click without movement still leaves a round dot
        self.paint_segment(point, point);
        true
    }

    /// Draw a segment from the previous point to `point`. Returns false when
    /// no stroke is active.
    pub fn extend_stroke(&mut self, point: StrokePoint) -> bool {
        let Some(last) = self.stroke.as_ref().map(|s| s.last) else {
            return false;
        };
        self.paint_segment(last, point);
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.last = point;
        }
        true
    }

    /// Finish the stroke, flatten it into `source` and clear the overlay.
    ///
    /// `to_overlay` maps source pixel space onto the overlay (the render
    /// matrix). Returns `None` if no stroke was active.
    pub fn end_stroke(&mut self, source: &Bitmap, to_overlay: &Affine) -> Option<Bitmap> {
        self.stroke.take()?;
        let flattened = self.flatten_through(source, to_overlay);
        self.clear();
        Some(flattened)
    }

    /// Abandon the in-progress stroke and everything it painted.
    pub fn cancel_stroke(&mut self) {
        if self.stroke.is_some() {
            self.clear();
        }
    }

    /// Composite the overlay onto `base` without clearing anything.
    ///
    /// Pixels outside the overlay (dimension mismatch) are copied unchanged.
    pub fn flatten_onto(&self, base: &Bitmap) -> Bitmap {
        let mut pixels = base.pixels.clone();
        if !self.dirty || base.dimensions() != self.dimensions() {
            return Bitmap::new(base.width, base.height, pixels, BitmapOrigin::Flattened);
        }

        for (i, dst) in pixels.chunks_exact_mut(CHANNELS).enumerate() {
            self.composite_pixel(dst, i);
        }

        Bitmap::new(base.width, base.height, pixels, BitmapOrigin::Flattened)
    }

    /// Composite the overlay into `source`, whose pixels reach the overlay
    /// through `to_overlay`.
    ///
    /// Each source pixel centre takes the overlay pixel it lands in. Source
    /// pixels that land outside the overlay are copied unchanged.
    pub fn flatten_through(&self, source: &Bitmap, to_overlay: &Affine) -> Bitmap {
        let mut pixels = source.pixels.clone();
        if self.dirty {
            let (width, height) = self.dimensions();
            let (overlay_w, overlay_h) = (width as f64, height as f64);
            let row = source.width.max(1) as usize;

            for (i, dst) in pixels.chunks_exact_mut(CHANNELS).enumerate() {
                let (x, y) = ((i % row) as f64 + 0.5, (i / row) as f64 + 0.5);
                let (ox, oy) = to_overlay.apply(x, y);
                if ox < 0.0 || oy < 0.0 || ox >= overlay_w || oy >= overlay_h {
                    continue;
                }
                self.composite_pixel(dst, oy as usize * width as usize + ox as usize);
            }
        }
        Bitmap::new(source.width, source.height, pixels, BitmapOrigin::Flattened)
    }

    /// Apply overlay pixel `i` (eraser, then paint) to `dst`.
    #[inline]
    fn composite_pixel(&self, dst: &mut [u8], i: usize) {
        let erase = self.erase[i];
        if erase > 0 {
            destination_out(dst, erase as f32 / 255.0);
        }

        let o = &self.overlay.pixels[i * CHANNELS..(i + 1) * CHANNELS];
        if o[3] > 0 {
            source_over(dst, [o[0], o[1], o[2]], o[3] as f32 / 255.0);
        }
    }

    fn paint_segment(&mut self, a: StrokePoint, b: StrokePoint) {
        let Some(stroke) = self.stroke else {
            return;
        };
        let (width, height) = self.dimensions();
        debug_assert_eq!(Some(self.overlay.pixels.len()), buffer_len(width, height));

        let overlay = &mut self.overlay.pixels;
        let erase = &mut self.erase;
        let coverage = &mut self.stroke_coverage;
        let mut touched = false;

        rasterize_segment(a, b, stroke.stroke_width, width, height, |i, seg| {
            let prev = coverage[i];
            if seg <= prev {
                return;
            }
            // Extra opacity needed to lift this pixel from `prev` to `seg`
            let step = (seg - prev) / (1.0 - prev);
            coverage[i] = seg;
            touched = true;

            let px = &mut overlay[i * CHANNELS..(i + 1) * CHANNELS];
            match stroke.mode {
                DrawingMode::Brush => {
                    source_over(px, [stroke.color.r, stroke.color.g, stroke.color.b], step);
                }
                DrawingMode::Eraser => {
                    destination_out(px, step);
                    let kept = (255 - erase[i]) as f32 * (1.0 - step);
                    erase[i] = 255 - kept.round().clamp(0.0, 255.0) as u8;
                }
                DrawingMode::None => {}
            }
        });

        if touched {
            self.dirty = true;
        }
    }
}
