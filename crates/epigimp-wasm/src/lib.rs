//! EpiGimp WASM - WebAssembly bindings for the EpiGimp editor
//!
//! This crate exposes the epigimp-core pipeline to the browser UI.
//!
//! # Module Structure
//!
//! - `session` - `JsEditorSession`, the stateful editor the UI drives
//! - `types` - WASM-compatible wrapper types for bitmaps and exports
//! - `decode` - Standalone PNG/JPEG import
//! - `encode` - Standalone PNG/JPEG export
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditorSession } from '@epigimp/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsEditorSession();
//! session.load_image(new Uint8Array(await file.arrayBuffer()), file.type);
//! ctx.putImageData(session.image_data(), 0, 0);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod session;
mod types;

// Re-export public types
pub use decode::{decode_image, is_supported_mime_type};
pub use encode::{encode_image, export_file_name};
pub use session::JsEditorSession;
pub use types::{JsBitmap, JsExportedFile};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Panic messages go to the browser console instead of "unreachable"
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "EpiGimp logging unavailable: {}",
            e
        )));
    }

    log::info!("EpiGimp WASM {} initialized", version());
}

/// Change the console log level: "error", "warn", "info", "debug" or "trace".
///
/// Unknown names leave the level unchanged and return false.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(filter) => {
            log::set_max_level(filter);
            true
        }
        None => false,
    }
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.trim().parse::<log::LevelFilter>().ok()
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level("WARN"), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("loud"), None);
    }
}
