//! Core data structures and traits for drawmap
//!
//! This crate provides the fundamental types for mapping a 2D location drawing
//! onto a 3D mesh: pixel and UV points, the mesh data store, the mesh variant
//! selector, option structs, and the traits at which external collaborators
//! (nearest-neighbor search, geodesic solvers, mesh storage) plug in.

pub mod point;
pub mod mesh;
pub mod variant;
pub mod options;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use variant::*;
pub use options::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector3};
