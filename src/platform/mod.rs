//! Platform layer
//!
//! Browser bindings live behind `wasm32`; the native build drives the
//! simulation directly from `main`.

#[cfg(target_arch = "wasm32")]
pub mod web;
