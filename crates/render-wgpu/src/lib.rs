//! wgpu render backend for the flag line.
//!
//! Renders the rope tube and the cloth flags. Flag vertex buffers are
//! rewritten every frame from the CPU-deformed grids; the rope is uploaded
//! once. Shading is the three-light rig: warm ambient, key, and back light.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - All vertex displacement for a frame is uploaded before the frame's
//!   render pass is submitted.
//! - Resize touches only the camera aspect, surface, and depth texture;
//!   mesh geometry is untouched.

mod camera;
mod gpu;
mod shaders;

pub use camera::SceneCamera;
pub use gpu::WgpuRenderer;
