//! Kiln Core - Foundational types for the Kiln model viewer
//!
//! This crate provides the types the other Kiln crates depend on:
//! - `Vec2`, `Vec3`, `Color` - Spatial and color types
//! - `Mat4` helpers - Column-major 4x4 matrix math
//! - Error types and Result alias

mod error;
mod mat4;
mod types;

pub use error::{KilnError, Result};
pub use mat4::{mat4_identity, mat4_mul, mat4_rotation_y, mat4_translation, Mat4};
pub use types::{Color, Vec2, Vec3};
