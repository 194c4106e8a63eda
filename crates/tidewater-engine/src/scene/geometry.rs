use std::collections::HashMap;

use crate::error::{RenderError, RenderResult};
use crate::render::{SpriteVertex, Vertex};

/// Index of a mesh in its `MeshTable`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A draw range inside a mesh's shared vertex/index buffers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SubmeshRange {
    pub index_count: u32,
    pub start_index: u32,
    pub base_vertex: i32,
    pub vertex_count: u32,
}

/// Non-owning reference to geometry: a mesh plus a range within it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeometryRef {
    pub mesh: MeshId,
    pub range: SubmeshRange,
}

/// Resolves shape names to geometry.
pub trait GeometryProvider {
    fn resolve(&self, shape: &str) -> Option<GeometryRef>;
}

/// Vertex storage of a mesh.
#[derive(Debug, Clone)]
pub enum MeshVertices {
    /// Uploaded once at startup.
    Static(Vec<Vertex>),
    /// Rewritten every frame from the frame slot's dynamic vertex buffer.
    Dynamic { count: usize },
    /// Billboard points, drawn instanced.
    Sprites(Vec<SpriteVertex>),
}

impl MeshVertices {
    pub fn len(&self) -> usize {
        match self {
            MeshVertices::Static(v) => v.len(),
            MeshVertices::Dynamic { count } => *count,
            MeshVertices::Sprites(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared vertex/index data with named sub-ranges.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub vertices: MeshVertices,
    pub indices: Vec<u32>,
    submeshes: HashMap<String, SubmeshRange>,
}

impl Mesh {
    /// Creates a mesh whose own name resolves to its full range.
    pub fn new(name: impl Into<String>, vertices: MeshVertices, indices: Vec<u32>) -> Self {
        let name = name.into();
        let whole = SubmeshRange {
            index_count: indices.len() as u32,
            start_index: 0,
            base_vertex: 0,
            vertex_count: vertices.len() as u32,
        };
        let mut submeshes = HashMap::new();
        submeshes.insert(name.clone(), whole);
        Self {
            name,
            vertices,
            indices,
            submeshes,
        }
    }

    pub fn with_submesh(mut self, name: impl Into<String>, range: SubmeshRange) -> Self {
        self.submeshes.insert(name.into(), range);
        self
    }

    pub fn submesh(&self, name: &str) -> Option<SubmeshRange> {
        self.submeshes.get(name).copied()
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.vertices, MeshVertices::Dynamic { .. })
    }
}

/// Owning table of meshes.
///
/// Shapes are addressed as `"mesh/submesh"`, or `"mesh"` for the whole mesh.
#[derive(Debug, Default)]
pub struct MeshTable {
    meshes: Vec<Mesh>,
    by_name: HashMap<String, MeshId>,
}

impl MeshTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: Mesh) -> RenderResult<MeshId> {
        if self.by_name.contains_key(&mesh.name) {
            return Err(RenderError::config(format!("duplicate mesh '{}'", mesh.name)));
        }
        if mesh.is_dynamic() && self.dynamic().is_some() {
            return Err(RenderError::config(format!(
                "mesh '{}': only one dynamic mesh is supported",
                mesh.name
            )));
        }

        let id = MeshId(self.meshes.len() as u32);
        self.by_name.insert(mesh.name.clone(), id);
        self.meshes.push(mesh);
        Ok(id)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.index())
    }

    pub fn id(&self, name: &str) -> Option<MeshId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshId(i as u32), m))
    }

    /// The per-frame mesh and its vertex count, if any.
    pub fn dynamic(&self) -> Option<(MeshId, usize)> {
        self.iter().find_map(|(id, m)| match m.vertices {
            MeshVertices::Dynamic { count } => Some((id, count)),
            _ => None,
        })
    }
}

impl GeometryProvider for MeshTable {
    fn resolve(&self, shape: &str) -> Option<GeometryRef> {
        let (mesh_name, sub) = shape.split_once('/').unwrap_or((shape, shape));
        let mesh = self.id(mesh_name)?;
        let range = self.get(mesh)?.submesh(sub)?;
        Some(GeometryRef { mesh, range })
    }
}
