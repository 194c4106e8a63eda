//! Scene registry.
//!
//! Responsibilities:
//! - own render items, materials and meshes behind index handles
//! - keep per-layer draw order (insertion order within a layer)
//! - propagate transform/material changes to every ring slot via dirty counters

mod camera;
mod geometry;
mod item;
mod layer;
mod lighting;
mod material;
mod registry;

pub use camera::Camera;
pub use geometry::{GeometryProvider, GeometryRef, Mesh, MeshId, MeshTable, MeshVertices, SubmeshRange};
pub use item::{ItemHandle, RenderItem};
pub use layer::DrawLayer;
pub use lighting::Lighting;
pub use material::{Material, MaterialHandle, MaterialStore};
pub use registry::{DrawCall, Scene};
