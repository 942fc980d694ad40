//! WASM-compatible wrapper types for rendered output and pending loads.

use std::sync::Arc;

use lightbox_core::encode::encode_png;
use lightbox_core::{Bitmap, DecodeRequest};
use wasm_bindgen::prelude::*;

/// A rendered layer for JavaScript.
///
/// Shares the engine's output buffer; pixels are only copied when JavaScript
/// asks for them.
#[wasm_bindgen]
pub struct JsBitmap {
    inner: Arc<Bitmap>,
}

#[wasm_bindgen]
impl JsBitmap {
    /// Image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array, ready for `ImageData`.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Encode the bitmap as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, JsValue> {
        encode_png(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsBitmap {
    pub(crate) fn from_shared(inner: Arc<Bitmap>) -> Self {
        Self { inner }
    }

    #[cfg(test)]
    pub(crate) fn shares(&self, other: &JsBitmap) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// A source the host must fetch before the active layer can be shown.
///
/// Pass `generation` back to `complete_load` or `fail_load` together with
/// the fetched bytes or the reason the fetch failed.
#[wasm_bindgen]
pub struct JsLoadRequest {
    generation: u64,
    path: String,
}

#[wasm_bindgen]
impl JsLoadRequest {
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[wasm_bindgen(getter)]
    pub fn path(&self) -> String {
        self.path.clone()
    }
}

impl From<&DecodeRequest> for JsLoadRequest {
    fn from(request: &DecodeRequest) -> Self {
        Self {
            generation: request.generation(),
            path: request.path().to_string(),
        }
    }
}
