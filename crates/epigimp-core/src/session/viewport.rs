//! Display zoom and display-to-buffer coordinate mapping.

use serde::{Deserialize, Serialize};

use crate::overlay::StrokePoint;

/// Smallest zoom, in percent.
pub const ZOOM_MIN: u32 = 10;
/// Largest zoom, in percent.
pub const ZOOM_MAX: u32 = 200;
/// Zoom change per step, in percent.
pub const ZOOM_STEP: u32 = 10;
/// Zoom at which one buffer pixel is one display pixel.
pub const ZOOM_DEFAULT: u32 = 100;

/// How the displayed buffer is scaled on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    zoom: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: ZOOM_DEFAULT }
    }
}

impl Viewport {
    /// Current zoom in percent.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Set the zoom, clamped to [`ZOOM_MIN`]..=[`ZOOM_MAX`].
    pub fn set_zoom(&mut self, percent: u32) {
        self.zoom = percent.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom.saturating_add(ZOOM_STEP));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom.saturating_sub(ZOOM_STEP));
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < ZOOM_MAX
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > ZOOM_MIN
    }

    /// Back to 100%.
    pub fn fit_to_screen(&mut self) {
        self.zoom = ZOOM_DEFAULT;
    }

    /// Display scale factor (1.0 at 100%).
    pub fn scale(&self) -> f64 {
        self.zoom as f64 / 100.0
    }

    /// On-screen size of a buffer at the current zoom.
    pub fn displayed_size(&self, buffer_width: u32, buffer_height: u32) -> (f64, f64) {
        (
            buffer_width as f64 * self.scale(),
            buffer_height as f64 * self.scale(),
        )
    }
}

/// Map a point in displayed-element coordinates into buffer pixels.
///
/// Each axis is scaled by `buffer / displayed`. Returns `None` when the
/// displayed size is not positive.
pub fn display_to_buffer(
    x: f64,
    y: f64,
    buffer_size: (u32, u32),
    displayed_size: (f64, f64),
) -> Option<StrokePoint> {
    let (dw, dh) = displayed_size;
    if !(dw > 0.0 && dh > 0.0) {
        return None;
    }
    Some(StrokePoint::new(
        x * buffer_size.0 as f64 / dw,
        y * buffer_size.1 as f64 / dh,
    ))
}
