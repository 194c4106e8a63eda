//! Scene rendering on wgpu.
//!
//! Responsibilities:
//! - GPU record layouts (vertices, object/material/pass constants)
//! - the named pipeline set and its shared bind group layouts
//! - per-slot GPU buffers and the `FrameBackend` that draws layer batches

mod constants;
mod mesh;
mod pipelines;
mod renderer;
mod slot_buffers;
mod texture;
mod vertex;

pub use constants::{Light, MaterialConstants, ObjectConstants, PassConstants, PassTiming, MAX_LIGHTS};
pub use pipelines::PipelineKey;
pub use renderer::{SceneRenderer, SurfaceFrame};
pub use texture::TextureData;
pub use vertex::{SpriteVertex, Vertex};
