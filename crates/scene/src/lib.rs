//! Scene assembly for the flag line.
//!
//! A `FlagScene` owns the rope mesh, the flags hanging from it, and the
//! lighting rig. `advance(t)` deforms every flag for the given elapsed time;
//! rendering backends read the scene, they never mutate it.

mod clock;
mod flag;
mod rope;
mod scene;

pub use clock::AnimationClock;
pub use flag::Flag;
pub use rope::{RopeCurve, RopeMesh};
pub use scene::{CameraPose, DirectionalLight, FlagScene, LightRig, SceneError};
