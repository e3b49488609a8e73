//! The editor session: owns the image and dispatches user intents.
//!
//! [`EditorSession`] is the only place committed state changes. Every intent
//! follows the same path:
//!
//! 1. Update transform, filter or drawing state
//! 2. Re-render the displayed buffer (transform engine, then filters)
//! 3. For committing intents, push a [`HistoryEntry`]
//!
//! Transient adjustments (contrast and free-rotation sliders) re-render without
//! pushing; [`EditorSession::commit_adjustments`] records them once the gesture
//! ends.
//!
//! # Baking
//!
//! Crop works on the displayed buffer. The result becomes the new base with
//! transforms and filters already applied, so both states reset to their
//! defaults afterwards.
//!
//! Stroke-end instead projects the overlay back into the base's own pixel
//! space. Transforms and filters stay live, so a filter can still be turned
//! off or a free rotation straightened after drawing.

mod viewport;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use viewport::{display_to_buffer, Viewport, ZOOM_DEFAULT, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

use crate::bitmap::{Bitmap, Rgb};
use crate::config::EditorConfig;
use crate::decode::{decode_image, ImageFormat};
use crate::encode::{self, ExportedFile};
use crate::error::EditorError;
use crate::filter::{self, FilterKind, FilterState};
use crate::history::{HistoryEntry, HistoryTimeline};
use crate::overlay::{DrawingMode, DrawingState, OverlayCompositor, StrokePoint};
use crate::transform::{self, CropError, CropRect, TransformError, TransformState};

/// Serializable view of the session for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    pub has_image: bool,
    /// Displayed (rendered) buffer size; zero without an image.
    pub width: u32,
    pub height: u32,
    /// Resize target before quarter-turn swapping.
    pub target_width: u32,
    pub target_height: u32,
    pub transform: TransformState,
    pub filters: FilterState,
    pub drawing_mode: DrawingMode,
    pub brush_color: String,
    pub brush_size: u32,
    pub crop_mode: bool,
    pub zoom: u32,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_len: usize,
    pub last_error: Option<String>,
}

/// One editing session over one imported image at a time.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    base: Option<Rc<Bitmap>>,
    transform: TransformState,
    filters: FilterState,
    target_size: (u32, u32),
    drawing: DrawingState,
    crop_mode: bool,
    overlay: OverlayCompositor,
    history: HistoryTimeline,
    displayed: Option<Bitmap>,
    viewport: Viewport,
    last_error: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Create an empty session. Out-of-range config values are clamped.
    pub fn new(config: EditorConfig) -> Self {
        let config = config.normalized();
        let drawing = Self::default_drawing(&config);
        let history = HistoryTimeline::new(config.history_capacity);
        Self {
            config,
            base: None,
            transform: TransformState::default(),
            filters: FilterState::default(),
            target_size: (0, 0),
            drawing,
            crop_mode: false,
            overlay: OverlayCompositor::new(0, 0),
            history,
            displayed: None,
            viewport: Viewport::default(),
            last_error: None,
        }
    }

    fn default_drawing(config: &EditorConfig) -> DrawingState {
        DrawingState {
            mode: DrawingMode::None,
            color: config.brush_color(),
            stroke_width: config.default_brush_size,
        }
    }

    // ------------------------------------------------------------------
    // Import
    // ------------------------------------------------------------------

    /// Decode and load an imported file.
    ///
    /// On failure the error message is kept in [`last_error`](Self::last_error)
    /// and the current image and history are left untouched.
    pub fn load_image(&mut self, bytes: &[u8], mime_type: &str) -> Result<(), EditorError> {
        match decode_image(bytes, mime_type) {
            Ok(bitmap) => {
                log::info!(
                    "Imported {} image {}x{} ({} bytes)",
                    mime_type,
                    bitmap.width,
                    bitmap.height,
                    bytes.len()
                );
                self.load_bitmap(bitmap)
            }
            Err(err) => {
                log::warn!("Import rejected: {}", err);
                self.last_error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Load an already decoded bitmap as a fresh image.
    ///
    /// Resets transforms, filters, drawing tools, zoom and history.
    pub fn load_bitmap(&mut self, bitmap: Bitmap) -> Result<(), EditorError> {
        let checked = if bitmap.pixels.is_empty() {
            Err(TransformError::InvalidDimensions {
                width: bitmap.width,
                height: bitmap.height,
            })
        } else {
            transform::check_canvas_size(bitmap.width, bitmap.height)
        };
        if let Err(err) = checked {
            self.last_error = Some(err.to_string());
            return Err(err.into());
        }

        self.target_size = bitmap.dimensions();
        self.base = Some(Rc::new(bitmap));
        self.transform = TransformState::default();
        self.filters = FilterState::default();
        self.drawing = Self::default_drawing(&self.config);
        self.crop_mode = false;
        self.overlay.clear();
        self.viewport.fit_to_screen();
        self.history.clear();
        self.last_error = None;

        self.render()?;
        self.commit("import");
        Ok(())
    }

    pub fn has_image(&self) -> bool {
        self.base.is_some()
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Rebuild the displayed buffer from the base and current state.
    ///
    /// Runs the transform engine, then the filters, then matches the overlay
    /// to the result. Without an image this clears the display.
    pub fn render(&mut self) -> Result<(), EditorError> {
        let Some(base) = self.base.as_ref() else {
            self.displayed = None;
            return Ok(());
        };

        let (canvas_width, canvas_height) = self
            .transform
            .canvas_size(self.target_size.0, self.target_size.1);
        let mut rendered = transform::render(
            base,
            &self.transform,
            canvas_width,
            canvas_height,
            self.config.interpolation,
        )?;
        filter::apply_filters(&mut rendered.pixels, &self.filters);

        self.overlay.resize(rendered.width, rendered.height);
        log::debug!("Rendered {}x{}", rendered.width, rendered.height);
        self.displayed = Some(rendered);
        Ok(())
    }

    /// The current rendered buffer, without the drawing overlay.
    pub fn displayed(&self) -> Option<&Bitmap> {
        self.displayed.as_ref()
    }

    /// The displayed buffer with the drawing overlay composited on top.
    pub fn composited(&self) -> Option<Bitmap> {
        self.displayed
            .as_ref()
            .map(|displayed| self.overlay.flatten_onto(displayed))
    }

    // ------------------------------------------------------------------
    // Committing intents
    // ------------------------------------------------------------------

    /// Rotate 90° counter-clockwise.
    pub fn rotate_left(&mut self) -> Result<(), EditorError> {
        self.apply_intent("rotate left", |s| s.transform.rotate_left())
    }

    /// Rotate 90° clockwise.
    pub fn rotate_right(&mut self) -> Result<(), EditorError> {
        self.apply_intent("rotate right", |s| s.transform.rotate_right())
    }

    pub fn flip_horizontal(&mut self) -> Result<(), EditorError> {
        self.apply_intent("flip horizontal", |s| s.transform.flip_h = !s.transform.flip_h)
    }

    pub fn flip_vertical(&mut self) -> Result<(), EditorError> {
        self.apply_intent("flip vertical", |s| s.transform.flip_v = !s.transform.flip_v)
    }

    /// Toggle grayscale or sepia. Turning one on turns the other off.
    pub fn apply_filter(&mut self, kind: FilterKind) -> Result<(), EditorError> {
        self.apply_intent("filter", |s| s.filters.toggle(kind))
    }

    /// Set the resize target. Quarter turns swap it on the canvas.
    ///
    /// Zero or oversized targets are rejected before any state changes.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EditorError> {
        if let Err(err) = transform::check_canvas_size(width, height) {
            log::warn!("Resize rejected: {}", err);
            return Err(err.into());
        }
        self.apply_intent("resize", |s| s.target_size = (width, height))
    }

    /// Crop the displayed buffer to `rect` (buffer pixels).
    ///
    /// Returns `Ok(false)` without committing when the selection is below the
    /// minimum crop size. On success the crop becomes the new base, transforms
    /// and filters reset, and crop mode ends.
    pub fn crop(&mut self, rect: CropRect) -> Result<bool, EditorError> {
        let displayed = self.displayed.as_ref().ok_or(EditorError::NoImageLoaded)?;

        let cropped = match transform::extract(displayed, rect, self.config.min_crop_size) {
            Ok(cropped) => cropped,
            Err(CropError::DegenerateSelection { width, height }) => {
                log::debug!("Crop ignored: {}x{} selection", width, height);
                return Ok(false);
            }
            Err(err) => {
                log::warn!("Crop rejected: {}", err);
                return Err(err.into());
            }
        };

        log::info!(
            "Cropped to {}x{} at ({}, {})",
            cropped.width,
            cropped.height,
            rect.x.max(0),
            rect.y.max(0)
        );

        self.overlay.cancel_stroke();
        self.replace_base(cropped);
        self.crop_mode = false;
        self.drawing.mode = DrawingMode::None;

        self.render()?;
        self.commit("crop");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Transient adjustments
    // ------------------------------------------------------------------

    /// Preview a contrast value in [-100, 100]. Not committed until
    /// [`commit_adjustments`](Self::commit_adjustments).
    pub fn set_contrast(&mut self, contrast: i32) -> Result<(), EditorError> {
        if !filter::is_valid_contrast(contrast) {
            log::warn!("Contrast rejected: {}", contrast);
            return Err(EditorError::ContrastOutOfRange(contrast));
        }
        self.require_image()?;
        self.filters.contrast = contrast;
        self.render()
    }

    /// Preview a free rotation in degrees (wrapped into [0, 360)).
    pub fn set_free_rotation(&mut self, degrees: f64) -> Result<(), EditorError> {
        self.require_image()?;
        self.transform.set_free_rotation(degrees);
        self.render()
    }

    /// Commit pending slider adjustments as one history entry.
    ///
    /// Returns `Ok(false)` when nothing changed since the current entry.
    pub fn commit_adjustments(&mut self) -> Result<bool, EditorError> {
        self.require_image()?;
        let unchanged = self
            .history
            .current()
            .is_some_and(|e| e.transform == self.transform && e.filters == self.filters);
        if unchanged {
            return Ok(false);
        }
        self.commit("adjustments");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Modes and drawing
    // ------------------------------------------------------------------

    /// Toggle crop mode, returning the new state.
    ///
    /// Crop mode and drawing are exclusive: the drawing mode is reset to none
    /// and any in-progress stroke is dropped.
    pub fn toggle_crop_mode(&mut self) -> bool {
        self.crop_mode = !self.crop_mode;
        self.drawing.mode = DrawingMode::None;
        self.overlay.cancel_stroke();
        self.crop_mode
    }

    /// Select a drawing tool. Any tool other than none ends crop mode.
    pub fn set_drawing_mode(&mut self, mode: DrawingMode) {
        self.overlay.cancel_stroke();
        self.drawing.mode = mode;
        if mode != DrawingMode::None {
            self.crop_mode = false;
        }
    }

    /// Set the brush colour from a `#rrggbb` string.
    pub fn set_brush_color(&mut self, hex: &str) -> Result<(), EditorError> {
        let color =
            Rgb::from_hex(hex).ok_or_else(|| EditorError::InvalidColor(hex.to_string()))?;
        self.drawing.color = color;
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: u32) -> Result<(), EditorError> {
        if size == 0 {
            return Err(EditorError::InvalidStrokeWidth);
        }
        self.drawing.stroke_width = size;
        Ok(())
    }

    /// Start a stroke at a buffer-space point.
    ///
    /// Returns `Ok(false)` when no drawing tool is selected.
    pub fn begin_stroke(&mut self, point: StrokePoint) -> Result<bool, EditorError> {
        self.require_image()?;
        Ok(self.overlay.begin_stroke(point, &self.drawing))
    }

    /// Continue the active stroke to `point`. Returns false without a stroke.
    pub fn extend_stroke(&mut self, point: StrokePoint) -> bool {
        self.overlay.extend_stroke(point)
    }

    /// Finish the stroke: flatten it into the base and commit.
    ///
    /// The stroke is projected back through the current transform, so
    /// transforms, filters and the resize target carry over unchanged.
    /// Returns `Ok(false)` when no stroke was active.
    pub fn end_stroke(&mut self) -> Result<bool, EditorError> {
        let Some(base) = self.base.clone() else {
            self.overlay.cancel_stroke();
            return Ok(false);
        };
        let (canvas_width, canvas_height) = self
            .transform
            .canvas_size(self.target_size.0, self.target_size.1);
        let to_canvas = transform::compose_matrix(
            &self.transform,
            base.width,
            base.height,
            canvas_width,
            canvas_height,
        );
        let Some(flattened) = self.overlay.end_stroke(&base, &to_canvas) else {
            return Ok(false);
        };

        self.base = Some(Rc::new(flattened));
        self.render()?;
        self.commit("stroke");
        Ok(true)
    }

    /// Abandon the active stroke without committing.
    pub fn cancel_stroke(&mut self) {
        self.overlay.cancel_stroke();
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Step back one history entry. Returns `Ok(false)` at the oldest entry.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let Some(entry) = self.history.undo().cloned() else {
            return Ok(false);
        };
        log::debug!("Undo to entry {}", self.history.cursor());
        self.restore(entry)?;
        Ok(true)
    }

    /// Step forward one history entry. Returns `Ok(false)` at the newest entry.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let Some(entry) = self.history.redo().cloned() else {
            return Ok(false);
        };
        log::debug!("Redo to entry {}", self.history.cursor());
        self.restore(entry)?;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryTimeline {
        &self.history
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Flatten the displayed buffer and overlay, then encode.
    pub fn export(&self, format: ImageFormat) -> Result<ExportedFile, EditorError> {
        let flattened = self.composited().ok_or(EditorError::NoImageLoaded)?;
        Ok(encode::export(&flattened, format, self.config.jpeg_quality)?)
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn fit_to_screen(&mut self) {
        self.viewport.fit_to_screen();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Map a point on the displayed element into buffer pixels.
    ///
    /// `displayed_size` is the element's on-screen size; `None` uses the
    /// viewport's zoomed size.
    pub fn display_to_buffer(
        &self,
        x: f64,
        y: f64,
        displayed_size: Option<(f64, f64)>,
    ) -> Option<StrokePoint> {
        let buffer = self.displayed.as_ref()?.dimensions();
        let shown =
            displayed_size.unwrap_or_else(|| self.viewport.displayed_size(buffer.0, buffer.1));
        display_to_buffer(x, y, buffer, shown)
    }

    /// Map a drag between two displayed-element corners to a buffer crop rectangle.
    pub fn display_rect_to_buffer(
        &self,
        start: (f64, f64),
        end: (f64, f64),
        displayed_size: Option<(f64, f64)>,
    ) -> Option<CropRect> {
        let a = self.display_to_buffer(start.0, start.1, displayed_size)?;
        let b = self.display_to_buffer(end.0, end.1, displayed_size)?;
        Some(CropRect::from_corners(
            a.x.round() as i64,
            a.y.round() as i64,
            b.x.round() as i64,
            b.y.round() as i64,
        ))
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The committed base bitmap, before transforms and filters.
    pub fn base(&self) -> Option<&Bitmap> {
        self.base.as_deref()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.target_size
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn crop_mode(&self) -> bool {
        self.crop_mode
    }

    pub fn overlay(&self) -> &OverlayCompositor {
        &self.overlay
    }

    /// Message from the last failed import, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        let (width, height) = self
            .displayed
            .as_ref()
            .map(Bitmap::dimensions)
            .unwrap_or_default();
        EditorSnapshot {
            has_image: self.has_image(),
            width,
            height,
            target_width: self.target_size.0,
            target_height: self.target_size.1,
            transform: self.transform,
            filters: self.filters,
            drawing_mode: self.drawing.mode,
            brush_color: self.drawing.color.to_hex(),
            brush_size: self.drawing.stroke_width,
            crop_mode: self.crop_mode,
            zoom: self.viewport.zoom(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            history_len: self.history.len(),
            last_error: self.last_error.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn require_image(&self) -> Result<&Rc<Bitmap>, EditorError> {
        self.base.as_ref().ok_or_else(|| {
            log::warn!("Intent ignored: no image loaded");
            EditorError::NoImageLoaded
        })
    }

    /// Run a committing intent: edit state, re-render, push one entry.
    fn apply_intent(
        &mut self,
        action: &str,
        edit: impl FnOnce(&mut Self),
    ) -> Result<(), EditorError> {
        self.require_image()?;
        self.overlay.cancel_stroke();

        let (transform, filters, target_size) = (self.transform, self.filters, self.target_size);
        edit(self);
        if let Err(err) = self.render() {
            log::warn!("{} failed, state restored: {}", action, err);
            self.transform = transform;
            self.filters = filters;
            self.target_size = target_size;
            return Err(err);
        }
        self.commit(action);
        Ok(())
    }

    /// Install a cropped bitmap as the new base with default transforms.
    fn replace_base(&mut self, bitmap: Bitmap) {
        self.target_size = bitmap.dimensions();
        self.base = Some(Rc::new(bitmap));
        self.transform = TransformState::default();
        self.filters = FilterState::default();
    }

    fn commit(&mut self, action: &str) {
        let Some(base) = self.base.clone() else {
            return;
        };
        self.history.push(HistoryEntry {
            base,
            transform: self.transform,
            filters: self.filters,
            target_size: self.target_size,
        });
        log::debug!(
            "Committed {} (entry {} of {})",
            action,
            self.history.cursor() + 1,
            self.history.len()
        );
    }

    fn restore(&mut self, entry: HistoryEntry) -> Result<(), EditorError> {
        self.overlay.cancel_stroke();
        self.base = Some(entry.base);
        self.transform = entry.transform;
        self.filters = entry.filters;
        self.target_size = entry.target_size;
        self.render()
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

    #[derive(Debug, Clone)]
    enum Intent {
        RotateLeft,
        RotateRight,
        FlipH,
        FlipV,
        Grayscale,
        Sepia,
        Undo,
        Redo,
    }

    fn intent_strategy() -> impl Strategy<Value = Intent> {
        prop_oneof![
            Just(Intent::RotateLeft),
            Just(Intent::RotateRight),
            Just(Intent::FlipH),
            Just(Intent::FlipV),
            Just(Intent::Grayscale),
            Just(Intent::Sepia),
            Just(Intent::Undo),
            Just(Intent::Redo),
        ]
    }

    proptest! {
        /// Property: any intent sequence keeps the display, overlay and
        /// filter invariants intact.
        #[test]
        fn prop_intents_keep_invariants(
            (width, height) in (1u32..=12, 1u32..=12),
            intents in prop::collection::vec(intent_strategy(), 0..40),
        ) {
            let mut session = EditorSession::default();
            session
                .load_bitmap(Bitmap::new(
                    width,
                    height,
                    vec![120u8; (width * height * 4) as usize],
                    BitmapOrigin::Decoded,
                ))
                .unwrap();

            for intent in intents {
                match intent {
                    Intent::RotateLeft => session.rotate_left().unwrap(),
                    Intent::RotateRight => session.rotate_right().unwrap(),
                    Intent::FlipH => session.flip_horizontal().unwrap(),
                    Intent::FlipV => session.flip_vertical().unwrap(),
                    Intent::Grayscale => session.apply_filter(FilterKind::Grayscale).unwrap(),
                    Intent::Sepia => session.apply_filter(FilterKind::Sepia).unwrap(),
                    Intent::Undo => { session.undo().unwrap(); }
                    Intent::Redo => { session.redo().unwrap(); }
                }

                let filters = session.filters();
                prop_assert!(!(filters.grayscale && filters.sepia));
                prop_assert!(session.history().len() <= 20);

                let displayed = session.displayed().unwrap().dimensions();
                let expected = session.transform().canvas_size(width, height);
                prop_assert_eq!(displayed, expected);
                prop_assert_eq!(session.overlay().dimensions(), displayed);
            }
        }
    }
}
