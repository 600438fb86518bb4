//! WASM bindings for browser-based overlay extraction.
//!
//! Assets are inlined as `data:` URIs, so the page has nothing to revoke.

use wasm_bindgen::prelude::*;

use crate::assets::DataUriTracker;
use crate::pipeline::Extractor;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Extract an overlay from KML or KMZ bytes.
///
/// Returns the overlay as JSON: `{ features, bounds, assets }`.
#[wasm_bindgen]
pub fn process_overlay(data: &[u8]) -> Result<String, JsValue> {
    let overlay = Extractor::new()
        .process(data, &mut DataUriTracker::new())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_json::to_string(&overlay).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// True if the bytes look like a KMZ archive rather than plain KML.
#[wasm_bindgen]
pub fn is_kmz(data: &[u8]) -> bool {
    crate::util::is_archive(data)
}
