//! Core types: math re-exports, camera, input, scene state, overlay text.

pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, vec3};

pub mod camera;
pub mod font;
pub mod input;
pub mod overlay;
pub mod palette;
pub mod scene;
pub mod stats;
pub mod transform;
