//! Chart-side half of the weather trend pipeline.
//!
//! This crate provides:
//! - `trace`: the plot traces handed to a rendering surface
//! - `color`: per-series color identity
//! - `assembler`: organized series → ordered trace list
//! - `legend`: legend entries and the `RenderSurface` seam
//! - `state`: one chart instance (memoized organizer, colors, legend)
//! - `js_bridge` (wasm only): D3.js rendering surface via `js_sys::eval()`

pub mod assembler;
pub mod color;
pub mod legend;
pub mod state;
pub mod trace;

#[cfg(target_arch = "wasm32")]
pub mod js_bridge;
