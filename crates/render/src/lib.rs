//! Renderer-agnostic interface for the flag scene.
//!
//! The renderer reads scene state and a view configuration, then produces
//! output. It never mutates the scene — deformation happens in `advance`,
//! before any renderer runs.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
