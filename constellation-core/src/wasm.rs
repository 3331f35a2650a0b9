//! WASM bindings for the constellation-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.

use log::Level;
use wasm_bindgen::prelude::*;

use crate::diagnostics::LogDiagnostics;
use crate::output::layout_from_json;

/// Route `log` output to the browser console and panics to `console.error`.
#[wasm_bindgen]
pub fn init_logging() {
    let _ = console_log::init_with_level(Level::Debug);
    console_error_panic_hook::set_once();
    log::info!(target: "constellation", "logging initialized");
}

/// Lay out a graph described by a JSON request and return the JSON response.
///
/// Request: `{"nodes": [...], "edges": [...], "layout": {"kind": ..., ...}}`.
/// Malformed input returns a response with `error` set instead of throwing.
#[wasm_bindgen]
pub fn compute_layout(input: &str) -> String {
    layout_from_json(input, &LogDiagnostics).to_json()
}
