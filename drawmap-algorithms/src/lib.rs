//! # drawmap Algorithms
//!
//! Algorithms that carry a location drawing onto a 3D anatomical mesh.
//!
//! This crate provides UV map combination, pixel-to-vertex mapping, surface
//! patch extraction from drawn borders, a reference edge-graph geodesic
//! backend, and the stateful geodesic query session.

pub mod combine;
pub mod geodesic;
pub mod mapping;
pub mod nearest_neighbor;
pub mod region;
pub mod session;

// Re-export commonly used items
pub use combine::*;
pub use geodesic::*;
pub use mapping::*;
pub use nearest_neighbor::*;
pub use region::*;
pub use session::*;
