//! Cushion Core - scan alignment for seat shape processing
//!
//! Stateless geometry for aligning a scanned seat to the world origin: the
//! normal and centroid of a selected triangle, the rigid transform that maps
//! one direction and pivot onto another, and the operators that apply it to a
//! scene object.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod command;
pub mod error;
pub mod geometry;
pub mod panel;
pub mod projection;
pub mod scene;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use command::{AlignToOrigin, FlipZ, Operator};
pub use error::{AlignError, AlignResult};
pub use geometry::{triangle_normal_and_centroid, Bounds, Mesh, Triangle, Vertex};
pub use panel::PanelState;
pub use projection::Camera;
pub use scene::SceneObject;
pub use transform::{first_non_match, AlignConfig, RotationState, Transform};
