//! Stroke rasterization and per-pixel blending.
//!
//! A stroke segment is a capsule: every pixel whose centre lies within
//! `width / 2` of the segment is covered, which gives round caps and round
//! joins for free. Coverage fades over one pixel at the edge for antialiasing.

use serde::{Deserialize, Serialize};

/// A point in buffer pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: StrokePoint, a: StrokePoint, b: StrokePoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;

    // Degenerate segment: distance to the point
    if len_sq < f64::EPSILON {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

/// Visit every pixel touched by a round-capped segment of the given width.
///
/// The callback receives `(index, coverage)` with `index` the pixel index in a
/// `width × height` buffer and `coverage` in (0, 1].
pub fn rasterize_segment(
    a: StrokePoint,
    b: StrokePoint,
    stroke_width: u32,
    buffer_width: u32,
    buffer_height: u32,
    mut visit: impl FnMut(usize, f32),
) {
    if buffer_width == 0 || buffer_height == 0 {
        return;
    }

    let radius = stroke_width.max(1) as f64 / 2.0;
    let reach = radius + 1.0;

    let min_x = (a.x.min(b.x) - reach).floor().max(0.0);
    let min_y = (a.y.min(b.y) - reach).floor().max(0.0);
    let max_x = (a.x.max(b.x) + reach).ceil().min(buffer_width as f64);
    let max_y = (a.y.max(b.y) + reach).ceil().min(buffer_height as f64);
    if min_x >= max_x || min_y >= max_y {
        return;
    }

    for py in min_y as u32..max_y as u32 {
        for px in min_x as u32..max_x as u32 {
            let centre = StrokePoint::new(px as f64 + 0.5, py as f64 + 0.5);
            let d = distance_to_segment(centre, a, b);
            let coverage = (radius + 0.5 - d).clamp(0.0, 1.0) as f32;
            if coverage > 0.0 {
                visit(py as usize * buffer_width as usize + px as usize, coverage);
            }
        }
    }
}

/// Source-over: paint `src` at opacity `alpha` onto straight-alpha `dst`.
#[inline]
pub fn source_over(dst: &mut [u8], src: [u8; 3], alpha: f32) {
    let da = dst[3] as f32 / 255.0;
    let out_a = alpha + da * (1.0 - alpha);
    if out_a <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let c = (src[i] as f32 * alpha + dst[i] as f32 * da * (1.0 - alpha)) / out_a;
        dst[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Destination-out: remove `alpha` of the existing pixel.
#[inline]
pub fn destination_out(dst: &mut [u8], alpha: f32) {
    let da = dst[3] as f32 * (1.0 - alpha);
    dst[3] = da.round().clamp(0.0, 255.0) as u8;
}
