//! Cloth deformation core: a flat vertex grid driven by a wind wave field.
//!
//! Each flag is a `ClothGrid` — a rectangular plane mesh that keeps an
//! immutable snapshot of its rest-pose y coordinates. Every frame the grid's
//! live y and z components are recomputed from the rest pose, the immutable x,
//! the elapsed time, and the flag's phase offset.
//!
//! # Invariants
//! - Rest-pose y values are never mutated after construction.
//! - Deformation is stateless in time: the output depends only on (t, phase,
//!   wind), never on the previous frame's buffer.
//! - Vertex x coordinates are never written after construction.

mod grid;
mod wave;

pub use grid::{ClothGrid, GridError};
pub use wave::{displace, freedom, normalized};
