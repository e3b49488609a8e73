//! Editor session WASM bindings.
//!
//! [`JsEditorSession`] is the single object the UI talks to. Pointer
//! coordinates are passed in the displayed element's local space together with
//! the element's on-screen size; the session maps them into buffer pixels.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsEditorSession({ jpeg_quality: 85 });
//! session.load_image(bytes, file.type);
//! session.rotate_right();
//! ctx.putImageData(session.image_data(), 0, 0);
//!
//! canvas.onpointerdown = (e) => session.begin_stroke(e.offsetX, e.offsetY, rect.width, rect.height);
//! canvas.onpointermove = (e) => session.extend_stroke(e.offsetX, e.offsetY, rect.width, rect.height);
//! canvas.onpointerup = () => session.end_stroke();
//! ```

use crate::types::{
    parse_drawing_mode, parse_filter_kind, parse_format, to_js_error, JsBitmap, JsExportedFile,
};
use epigimp_core::{CropRect, EditorConfig, EditorSession, StrokePoint};
use wasm_bindgen::prelude::*;
use web_sys::ImageData;

/// JavaScript handle to an editing session.
#[wasm_bindgen]
pub struct JsEditorSession {
    inner: EditorSession,
}

#[wasm_bindgen]
impl JsEditorSession {
    /// Create a session. `config` is an optional plain object; missing fields
    /// use the defaults.
    ///
    /// # Errors
    /// Returns error if the config object cannot be deserialized
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditorSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| to_js_error(format!("Invalid editor config: {}", e)))?
        };
        Ok(Self::with_config(config))
    }

    // --- Import / export -------------------------------------------------

    /// Import a PNG or JPEG file. On failure `last_error` holds the message.
    pub fn load_image(&mut self, bytes: &[u8], mime_type: &str) -> Result<(), JsValue> {
        self.inner.load_image(bytes, mime_type).map_err(to_js_error)
    }

    /// Encode the displayed image plus drawing overlay as `"png"` or `"jpg"`.
    pub fn export(&self, format: &str) -> Result<JsExportedFile, JsValue> {
        let format = parse_format(format)
            .ok_or_else(|| to_js_error(format!("Unknown export format '{}'", format)))?;
        self.inner
            .export(format)
            .map(JsExportedFile::from)
            .map_err(to_js_error)
    }

    // --- Display ---------------------------------------------------------

    /// The displayed image with the drawing overlay on top, or `undefined`.
    pub fn displayed(&self) -> Option<JsBitmap> {
        self.inner.composited().map(JsBitmap::from_bitmap)
    }

    /// The displayed image as `ImageData`, ready for `putImageData`.
    pub fn image_data(&self) -> Result<ImageData, JsValue> {
        self.displayed()
            .ok_or_else(|| to_js_error("No image loaded"))?
            .to_image_data()
    }

    /// Current session state as a plain object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    #[wasm_bindgen(getter)]
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error().map(str::to_string)
    }

    pub fn clear_error(&mut self) {
        self.inner.clear_error();
    }

    // --- Geometry --------------------------------------------------------

    pub fn rotate_left(&mut self) -> Result<(), JsValue> {
        self.inner.rotate_left().map_err(to_js_error)
    }

    pub fn rotate_right(&mut self) -> Result<(), JsValue> {
        self.inner.rotate_right().map_err(to_js_error)
    }

    pub fn flip_horizontal(&mut self) -> Result<(), JsValue> {
        self.inner.flip_horizontal().map_err(to_js_error)
    }

    pub fn flip_vertical(&mut self) -> Result<(), JsValue> {
        self.inner.flip_vertical().map_err(to_js_error)
    }

    /// Slider preview; call `commit_adjustments` when the drag ends.
    pub fn set_free_rotation(&mut self, degrees: f64) -> Result<(), JsValue> {
        self.inner.set_free_rotation(degrees).map_err(to_js_error)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner.resize(width, height).map_err(to_js_error)
    }

    // --- Filters ---------------------------------------------------------

    /// Toggle `"grayscale"` or `"sepia"`.
    pub fn apply_filter(&mut self, name: &str) -> Result<(), JsValue> {
        let kind = parse_filter_kind(name)
            .ok_or_else(|| to_js_error(format!("Unknown filter '{}'", name)))?;
        self.inner.apply_filter(kind).map_err(to_js_error)
    }

    /// Slider preview; call `commit_adjustments` when the drag ends.
    pub fn set_contrast(&mut self, contrast: i32) -> Result<(), JsValue> {
        self.inner.set_contrast(contrast).map_err(to_js_error)
    }

    /// Record pending slider changes as one undo step.
    pub fn commit_adjustments(&mut self) -> Result<bool, JsValue> {
        self.inner.commit_adjustments().map_err(to_js_error)
    }

    // --- Crop ------------------------------------------------------------

    pub fn toggle_crop_mode(&mut self) -> bool {
        self.inner.toggle_crop_mode()
    }

    #[wasm_bindgen(getter)]
    pub fn crop_mode(&self) -> bool {
        self.inner.crop_mode()
    }

    /// Crop to a drag from `(x0, y0)` to `(x1, y1)` in displayed coordinates.
    ///
    /// Returns false when the selection is too small to crop.
    pub fn crop(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        displayed_width: Option<f64>,
        displayed_height: Option<f64>,
    ) -> Result<bool, JsValue> {
        let shown = displayed_size(displayed_width, displayed_height);
        let rect = self
            .inner
            .display_rect_to_buffer((x0, y0), (x1, y1), shown)
            .ok_or_else(|| to_js_error("No image loaded"))?;
        self.crop_rect(rect)
    }

    // --- Drawing ---------------------------------------------------------

    /// Select `"none"`, `"brush"` or `"eraser"`.
    pub fn set_drawing_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = parse_drawing_mode(mode)
            .ok_or_else(|| to_js_error(format!("Unknown drawing mode '{}'", mode)))?;
        self.inner.set_drawing_mode(mode);
        Ok(())
    }

    /// Brush colour as `#rrggbb`.
    pub fn set_brush_color(&mut self, color: &str) -> Result<(), JsValue> {
        self.inner.set_brush_color(color).map_err(to_js_error)
    }

    pub fn set_brush_size(&mut self, size: u32) -> Result<(), JsValue> {
        self.inner.set_brush_size(size).map_err(to_js_error)
    }

    pub fn begin_stroke(
        &mut self,
        x: f64,
        y: f64,
        displayed_width: Option<f64>,
        displayed_height: Option<f64>,
    ) -> Result<bool, JsValue> {
        match self.to_buffer(x, y, displayed_width, displayed_height) {
            Some(point) => self.inner.begin_stroke(point).map_err(to_js_error),
            None => Ok(false),
        }
    }

    pub fn extend_stroke(
        &mut self,
        x: f64,
        y: f64,
        displayed_width: Option<f64>,
        displayed_height: Option<f64>,
    ) -> bool {
        self.to_buffer(x, y, displayed_width, displayed_height)
            .is_some_and(|point| self.inner.extend_stroke(point))
    }

    /// Finish the stroke and record it as one undo step.
    pub fn end_stroke(&mut self) -> Result<bool, JsValue> {
        self.inner.end_stroke().map_err(to_js_error)
    }

    pub fn cancel_stroke(&mut self) {
        self.inner.cancel_stroke();
    }

    // --- History ---------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.inner.undo().map_err(to_js_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.inner.redo().map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    // --- Zoom ------------------------------------------------------------

    pub fn zoom_in(&mut self) {
        self.inner.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.inner.zoom_out();
    }

    pub fn fit_to_screen(&mut self) {
        self.inner.fit_to_screen();
    }

    /// Zoom in percent (10-200).
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> u32 {
        self.inner.viewport().zoom()
    }
}

impl JsEditorSession {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            inner: EditorSession::new(config),
        }
    }

    fn crop_rect(&mut self, rect: CropRect) -> Result<bool, JsValue> {
        self.inner.crop(rect).map_err(to_js_error)
    }

    fn to_buffer(
        &self,
        x: f64,
        y: f64,
        displayed_width: Option<f64>,
        displayed_height: Option<f64>,
    ) -> Option<StrokePoint> {
        self.inner
            .display_to_buffer(x, y, displayed_size(displayed_width, displayed_height))
    }
}

/// Both sizes or neither; a lone width or height falls back to the zoom.
fn displayed_size(width: Option<f64>, height: Option<f64>) -> Option<(f64, f64)> {
    width.zip(height)
}
