//! Rasterizing a bitmap through rotation, flip and resize.
//!
//! # Algorithm
//!
//! The forward mapping mirrors a 2D canvas draw call:
//! ```text
//! M = translate(cx, cy) · rotate(free) · rotate(steps·90°) · scale(±1, ±1)
//!     · translate(-w/2, -h/2) · scale(w/src_w, h/src_h)
//! ```
//! where `(cx, cy)` is the centre of the *target* canvas and `w×h` is the
//! drawn image size (the target size, un-swapped for odd quarter turns).
//! Rotation therefore always pivots around the canvas centre.
//!
//! Rasterization uses inverse mapping: every destination pixel centre is
//! mapped back through `M⁻¹` into source space and sampled there. Points that
//! land outside the source render fully transparent.

use crate::bitmap::{buffer_len, Bitmap, BitmapOrigin, CHANNELS};

use super::{TransformError, TransformState};

/// Largest canvas area a render may allocate, matching common browser limits.
pub const MAX_CANVAS_PIXELS: u64 = 16_384 * 16_384;

/// Interpolation filter for rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest source pixel - exact copies, blocky when scaling up.
    Nearest,
    /// Bilinear interpolation - smooth, matches browser canvas defaults.
    #[default]
    Bilinear,
}

/// A 2D affine matrix in canvas order:
/// ```text
/// x' = a·x + c·y + e
/// y' = b·x + d·y + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Affine {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Clockwise rotation in screen space (y axis pointing down).
    pub fn rotate_degrees(degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self::from_cos_sin(rad.cos(), rad.sin())
    }

    /// Exact rotation by a whole number of clockwise quarter turns.
    pub fn quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::IDENTITY,
            1 => Self::from_cos_sin(0.0, 1.0),
            2 => Self::from_cos_sin(-1.0, 0.0),
            _ => Self::from_cos_sin(0.0, -1.0),
        }
    }

    fn from_cos_sin(cos: f64, sin: f64) -> Self {
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Matrix product `self · other` (apply `other` first).
    pub fn then(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Build the forward (source → canvas) matrix for a transform.
pub fn compose_matrix(
    transform: &TransformState,
    src_width: u32,
    src_height: u32,
    target_width: u32,
    target_height: u32,
) -> Affine {
    // The image is drawn at the un-rotated target size
    let (draw_w, draw_h) = transform.canvas_size(target_width, target_height);
    let (draw_w, draw_h) = (draw_w as f64, draw_h as f64);

    let fit = Affine::scale(draw_w / src_width as f64, draw_h / src_height as f64);
    let to_origin = Affine::translate(-draw_w / 2.0, -draw_h / 2.0);
    let flip = Affine::scale(
        if transform.flip_h { -1.0 } else { 1.0 },
        if transform.flip_v { -1.0 } else { 1.0 },
    );
    let steps = Affine::quarter_turns(transform.quarter_turns);
    let free = if transform.free_rotation == 0.0 {
        Affine::IDENTITY
    } else {
        Affine::rotate_degrees(transform.free_rotation)
    };
    let to_center = Affine::translate(target_width as f64 / 2.0, target_height as f64 / 2.0);

    to_center
        .then(&free)
        .then(&steps)
        .then(&flip)
        .then(&to_origin)
        .then(&fit)
}

/// Validate a canvas size before any buffer is allocated for it.
///
/// # Errors
///
/// `InvalidDimensions` for a zero dimension, `TooLarge` above
/// [`MAX_CANVAS_PIXELS`] or when the buffer length overflows `usize`.
pub fn check_canvas_size(width: u32, height: u32) -> Result<usize, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidDimensions { width, height });
    }
    if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
        return Err(TransformError::TooLarge { width, height });
    }
    buffer_len(width, height).ok_or(TransformError::TooLarge { width, height })
}

/// Render `base` through `transform` onto a `target_width × target_height` canvas.
///
/// Resizing happens by choosing a target size different from the source size:
/// the source is stretched to fill the drawn area.
///
/// # Errors
///
/// Returns `TransformError::InvalidDimensions` if the target or source has a
/// zero dimension, and `TransformError::TooLarge` if the target exceeds
/// [`MAX_CANVAS_PIXELS`].
pub fn render(
    base: &Bitmap,
    transform: &TransformState,
    target_width: u32,
    target_height: u32,
    filter: InterpolationFilter,
) -> Result<Bitmap, TransformError> {
    let len = check_canvas_size(target_width, target_height)?;
    if base.is_empty() {
        return Err(TransformError::InvalidDimensions {
            width: base.width,
            height: base.height,
        });
    }

    // Fast path: nothing to do but relabel
    if transform.is_identity() && base.dimensions() == (target_width, target_height) {
        return Ok(Bitmap::new(
            base.width,
            base.height,
            base.pixels.clone(),
            BitmapOrigin::Rendered,
        ));
    }

    let inverse = compose_matrix(transform, base.width, base.height, target_width, target_height)
        .invert()
        .ok_or(TransformError::InvalidDimensions {
            width: target_width,
            height: target_height,
        })?;

    let mut output = vec![0u8; len];
    let (src_w, src_h) = (base.width as f64, base.height as f64);

    for dst_y in 0..target_height {
        for dst_x in 0..target_width {
            let (sx, sy) = inverse.apply(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
            if sx < 0.0 || sy < 0.0 || sx >= src_w || sy >= src_h {
                continue;
            }

            let pixel = match filter {
                InterpolationFilter::Nearest => sample_nearest(base, sx, sy),
                InterpolationFilter::Bilinear => sample_bilinear(base, sx, sy),
            };

            let idx = (dst_y as usize * target_width as usize + dst_x as usize) * CHANNELS;
            output[idx..idx + CHANNELS].copy_from_slice(&pixel);
        }
    }

    Ok(Bitmap::new(
        target_width,
        target_height,
        output,
        BitmapOrigin::Rendered,
    ))
}

#[inline]
fn read(image: &Bitmap, x: usize, y: usize) -> [u8; 4] {
    let idx = (y * image.width as usize + x) * CHANNELS;
    [
        image.pixels[idx],
        image.pixels[idx + 1],
        image.pixels[idx + 2],
        image.pixels[idx + 3],
    ]
}

fn sample_nearest(image: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    let px = (x.floor() as usize).min(image.width as usize - 1);
    let py = (y.floor() as usize).min(image.height as usize - 1);
    read(image, px, py)
}

/// Sample a pixel using bilinear interpolation around pixel centres.
///
/// Colour channels are weighted by alpha so transparent neighbours do not
/// bleed black into the result. Edge pixels are clamped.
fn sample_bilinear(image: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    let max_x = image.width as i64 - 1;
    let max_y = image.height as i64 - 1;

    // Shift so integer coordinates sit on pixel centres
    let u = x - 0.5;
    let v = y - 0.5;
    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;

    let clamp_x = |i: i64| i.clamp(0, max_x) as usize;
    let clamp_y = |i: i64| i.clamp(0, max_y) as usize;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let taps = [
        (clamp_x(x0), clamp_y(y0), (1.0 - fx) * (1.0 - fy)),
        (clamp_x(x0 + 1), clamp_y(y0), fx * (1.0 - fy)),
        (clamp_x(x0), clamp_y(y0 + 1), (1.0 - fx) * fy),
        (clamp_x(x0 + 1), clamp_y(y0 + 1), fx * fy),
    ];

    let mut color = [0.0f64; 3];
    let mut alpha = 0.0f64;
    for (px, py, weight) in taps {
        if weight == 0.0 {
            continue;
        }
        let p = read(image, px, py);
        let wa = weight * p[3] as f64;
        color[0] += wa * p[0] as f64;
        color[1] += wa * p[1] as f64;
        color[2] += wa * p[2] as f64;
        alpha += wa;
    }

    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }

    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    [
        channel(color[0] / alpha),
        channel(color[1] / alpha),
        channel(color[2] / alpha),
        channel(alpha),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Opaque test image where each pixel encodes its own coordinates.
    fn test_image(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity(buffer_len(width, height).unwrap());
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 7, 255]);
            }
        }
        Bitmap::new(width, height, pixels, BitmapOrigin::Decoded)
    }

    fn render_exact(base: &Bitmap, transform: &TransformState, w: u32, h: u32) -> Bitmap {
        render(base, transform, w, h, InterpolationFilter::Bilinear).unwrap()
    }

    #[test]
    fn test_identity_render_copies() {
        let img = test_image(8, 4);
        let out = render_exact(&img, &TransformState::default(), 8, 4);
        assert_eq!(out.pixels, img.pixels);
        assert_eq!(out.origin, BitmapOrigin::Rendered);
    }

    #[test]
    fn test_zero_target_rejected() {
        let img = test_image(4, 4);
        let result = render(&img, &TransformState::default(), 0, 4, InterpolationFilter::Nearest);
        assert!(matches!(
            result,
            Err(TransformError::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_oversized_target_rejected() {
        let img = test_image(4, 4);
        let result = render(
            &img,
            &TransformState::default(),
            u32::MAX,
            u32::MAX,
            InterpolationFilter::Nearest,
        );
        assert_eq!(
            result.unwrap_err(),
            TransformError::TooLarge {
                width: u32::MAX,
                height: u32::MAX
            }
        );
    }

    #[test]
    fn test_check_canvas_size_limit() {
        assert_eq!(check_canvas_size(16_384, 16_384), Ok(16_384 * 16_384 * 4));
        assert_eq!(
            check_canvas_size(16_385, 16_384),
            Err(TransformError::TooLarge {
                width: 16_385,
                height: 16_384
            })
        );
        assert_eq!(
            check_canvas_size(0, 10),
            Err(TransformError::InvalidDimensions { width: 0, height: 10 })
        );
    }

    #[test]
    fn test_empty_source_rejected() {
        let img = Bitmap::new(0, 0, vec![], BitmapOrigin::Decoded);
        let result = render(&img, &TransformState::default(), 4, 4, InterpolationFilter::Nearest);
        assert!(result.is_err());
    }

    #[test]
    fn test_rotate_right_maps_bottom_left_to_origin() {
        let img = test_image(200, 100);
        let mut t = TransformState::default();
        t.rotate_right();
        let (w, h) = t.canvas_size(200, 100);
        let out = render_exact(&img, &t, w, h);

        assert_eq!(out.dimensions(), (100, 200));
        // Destination (0, 0) shows source (0, 99)
        assert_eq!(out.pixel(0, 0), Some([0, 99, 7, 255]));
        // Destination (99, 0) shows source (0, 0)
        assert_eq!(out.pixel(99, 0), Some([0, 0, 7, 255]));
        // Destination (0, 199) shows source (199, 99)
        assert_eq!(out.pixel(0, 199), Some([199, 99, 7, 255]));
    }

    #[test]
    fn test_rotate_left_maps_top_right_to_origin() {
        let img = test_image(6, 3);
        let mut t = TransformState::default();
        t.rotate_left();
        let out = render_exact(&img, &t, 3, 6);
        assert_eq!(out.pixel(0, 0), Some([5, 0, 7, 255]));
    }

    #[test]
    fn test_rotate_180() {
        let img = test_image(5, 4);
        let mut t = TransformState::default();
        t.rotate_right();
        t.rotate_right();
        let out = render_exact(&img, &t, 5, 4);
        assert_eq!(out.pixel(0, 0), Some([4, 3, 7, 255]));
        assert_eq!(out.pixel(4, 3), Some([0, 0, 7, 255]));
    }

    #[test]
    fn test_flip_horizontal() {
        let img = test_image(5, 3);
        let t = TransformState {
            flip_h: true,
            ..Default::default()
        };
        let out = render_exact(&img, &t, 5, 3);
        assert_eq!(out.pixel(0, 1), Some([4, 1, 7, 255]));
        assert_eq!(out.pixel(4, 2), Some([0, 2, 7, 255]));
    }

    #[test]
    fn test_flip_vertical() {
        let img = test_image(5, 3);
        let t = TransformState {
            flip_v: true,
            ..Default::default()
        };
        let out = render_exact(&img, &t, 5, 3);
        assert_eq!(out.pixel(2, 0), Some([2, 2, 7, 255]));
    }

    #[test]
    fn test_flip_is_involution() {
        let img = test_image(7, 5);
        let t = TransformState {
            flip_h: true,
            ..Default::default()
        };
        let once = render_exact(&img, &t, 7, 5);
        let twice = render_exact(&once, &t, 7, 5);
        assert_eq!(twice.pixels, img.pixels);
    }

    #[test]
    fn test_resize_by_target_dimensions() {
        let img = test_image(10, 10);
        let out = render(
            &img,
            &TransformState::default(),
            20,
            5,
            InterpolationFilter::Nearest,
        )
        .unwrap();
        assert_eq!(out.dimensions(), (20, 5));
        // Horizontal stretch by 2, vertical squash by 2
        assert_eq!(out.pixel(3, 0), Some([1, 1, 7, 255]));
        assert_eq!(out.pixel(0, 4), Some([0, 9, 7, 255]));
    }

    #[test]
    fn test_free_rotation_leaves_transparent_corners() {
        let img = test_image(20, 20);
        let t = TransformState {
            free_rotation: 45.0,
            ..Default::default()
        };
        let out = render_exact(&img, &t, 20, 20);
        assert_eq!(out.dimensions(), (20, 20));
        // Corners fall outside the rotated square
        assert_eq!(out.pixel(0, 0).unwrap()[3], 0);
        // Centre stays covered
        assert_eq!(out.pixel(10, 10).unwrap()[3], 255);
    }

    #[test]
    fn test_rotation_pivots_on_canvas_centre_after_resize() {
        let img = test_image(10, 10);
        let mut t = TransformState::default();
        t.rotate_right();
        t.rotate_right();
        let out = render(&img, &t, 40, 20, InterpolationFilter::Nearest).unwrap();
        // Fully covered: the drawn image fills the whole canvas
        assert!(out.pixels.chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_bilinear_ignores_transparent_neighbours() {
        let pixels = vec![
            200, 100, 50, 255, //
            0, 0, 0, 0,
        ];
        let img = Bitmap::new(2, 1, pixels, BitmapOrigin::Decoded);
        let p = sample_bilinear(&img, 1.0, 0.5);
        // Colour comes only from the opaque pixel, alpha is halved
        assert_eq!(&p[..3], &[200, 100, 50]);
        assert_eq!(p[3], 128);
    }

    #[test]
    fn test_affine_inverse_round_trip() {
        let m = Affine::translate(3.0, -2.0)
            .then(&Affine::rotate_degrees(33.0))
            .then(&Affine::scale(2.0, -1.5));
        let inv = m.invert().unwrap();
        let (x, y) = m.apply(4.0, 7.0);
        let (bx, by) = inv.apply(x, y);
        assert!((bx - 4.0).abs() < 1e-9);
        assert!((by - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        assert!(Affine::scale(0.0, 1.0).invert().is_none());
    }
}
