//! Lightbox WASM - WebAssembly bindings for Lightbox
//!
//! This crate exposes the lightbox-core viewer to the browser overlay.
//!
//! # Module Structure
//!
//! - `types` - JavaScript wrappers for rendered bitmaps and load requests
//! - `viewer` - The layer stack, filter controls and session import/export
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsViewer } from '@lightbox/wasm';
//!
//! await init();
//!
//! const viewer = new JsViewer();
//! viewer.add_layer(file.name, file.type);
//!
//! let bitmap = viewer.render();
//! const load = viewer.pending_load();
//! if (load) {
//!   const bytes = new Uint8Array(await file.arrayBuffer());
//!   bitmap = viewer.complete_load(load.generation, bytes);
//! }
//! ```

use wasm_bindgen::prelude::*;

mod types;
mod viewer;

pub use types::{JsBitmap, JsLoadRequest};
pub use viewer::JsViewer;

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Log a warning to the browser console.
pub(crate) fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
