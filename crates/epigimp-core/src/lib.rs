//! EpiGimp Core - raster editing pipeline
//!
//! This crate provides the image pipeline behind the EpiGimp browser editor:
//! PNG/JPEG import and export, rotation/flip/resize rendering, colour filters,
//! crop extraction, freehand drawing and bounded undo/redo.
//!
//! Everything runs synchronously on the caller's thread. The browser bindings
//! live in `epigimp-wasm`; this crate has no browser dependency.

pub mod bitmap;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filter;
pub mod history;
pub mod overlay;
pub mod session;
pub mod transform;

pub use bitmap::{Bitmap, BitmapOrigin, Rgb};
pub use config::EditorConfig;
pub use decode::{decode_image, DecodeError, ImageFormat};
pub use encode::{encode, export_file_name, EncodeError, ExportedFile};
pub use error::EditorError;
pub use filter::{apply_filters, FilterKind, FilterState};
pub use history::{HistoryEntry, HistoryTimeline};
pub use overlay::{DrawingMode, DrawingState, OverlayCompositor, StrokePoint};
pub use session::{EditorSession, EditorSnapshot, Viewport};
pub use transform::{
    extract, render, CropError, CropRect, InterpolationFilter, TransformError, TransformState,
};
