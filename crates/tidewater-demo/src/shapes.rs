//! Procedural meshes for the demo scene.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use tidewater_engine::render::Vertex;
use tidewater_engine::scene::{Mesh, MeshVertices, SubmeshRange};

/// Vertices and triangle-list indices of one shape, indices relative to its own vertices.
#[derive(Debug, Default, Clone)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Unit-centred box of the given extents, four vertices per face.
pub fn create_box(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width, height, depth) * 0.5;
    let faces = [
        (Vec3::NEG_Z, Vec3::Y),
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::Y),
        (Vec3::Y, Vec3::Z),
        (Vec3::NEG_Y, Vec3::NEG_Z),
    ];

    let mut mesh = MeshData::default();
    for (normal, up) in faces {
        // Clockwise seen from outside in a left-handed frame.
        let right = normal.cross(up);
        let c = normal * half;
        let u = right * half;
        let v = up * half;

        let base = mesh.vertices.len() as u32;
        mesh.vertices.extend([
            Vertex::new(c - u - v, normal, Vec2::new(0.0, 1.0)),
            Vertex::new(c - u + v, normal, Vec2::new(0.0, 0.0)),
            Vertex::new(c + u + v, normal, Vec2::new(1.0, 0.0)),
            Vertex::new(c + u - v, normal, Vec2::new(1.0, 1.0)),
        ]);
        mesh.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

/// Flat `rows x cols` vertex grid in the xz plane, facing +y.
pub fn create_grid(width: f32, depth: f32, rows: usize, cols: usize) -> MeshData {
    let (rows, cols) = (rows.max(2), cols.max(2));
    let dx = width / (cols - 1) as f32;
    let dz = depth / (rows - 1) as f32;

    let mut mesh = MeshData::default();
    for i in 0..rows {
        let z = 0.5 * depth - i as f32 * dz;
        for j in 0..cols {
            let x = -0.5 * width + j as f32 * dx;
            let uv = Vec2::new(j as f32 / (cols - 1) as f32, i as f32 / (rows - 1) as f32);
            mesh.vertices.push(Vertex::new(Vec3::new(x, 0.0, z), Vec3::Y, uv));
        }
    }

    let n = cols as u32;
    for i in 0..rows as u32 - 1 {
        for j in 0..n - 1 {
            let a = i * n + j;
            let (b, c, d) = (a + 1, a + n, a + n + 1);
            mesh.indices.extend([a, b, c, c, b, d]);
        }
    }
    mesh
}

/// Capped cylinder along +y, centred on the origin.
pub fn create_cylinder(radius: f32, height: f32, slices: u32, stacks: u32) -> MeshData {
    let (slices, stacks) = (slices.max(3), stacks.max(1));
    let ring = slices + 1;
    let mut mesh = MeshData::default();

    for i in 0..=stacks {
        let y = -0.5 * height + height * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let (s, c) = theta.sin_cos();
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius * c, y, radius * s),
                Vec3::new(c, 0.0, s),
                Vec2::new(j as f32 / slices as f32, 1.0 - i as f32 / stacks as f32),
            ));
        }
    }
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * ring + j;
            mesh.indices
                .extend([a, a + ring, a + ring + 1, a, a + ring + 1, a + 1]);
        }
    }

    cap(&mut mesh, radius, 0.5 * height, slices, true);
    cap(&mut mesh, radius, -0.5 * height, slices, false);
    mesh
}

fn cap(mesh: &mut MeshData, radius: f32, y: f32, slices: u32, top: bool) {
    let normal = if top { Vec3::Y } else { Vec3::NEG_Y };
    let base = mesh.vertices.len() as u32;

    for j in 0..=slices {
        let theta = TAU * j as f32 / slices as f32;
        let (s, c) = theta.sin_cos();
        mesh.vertices.push(Vertex::new(
            Vec3::new(radius * c, y, radius * s),
            normal,
            Vec2::new(0.5 + 0.5 * c, 0.5 - 0.5 * s),
        ));
    }
    let center = mesh.vertices.len() as u32;
    mesh.vertices
        .push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5)));

    for j in 0..slices {
        if top {
            mesh.indices.extend([center, base + j + 1, base + j]);
        } else {
            mesh.indices.extend([center, base + j, base + j + 1]);
        }
    }
}

/// Concatenates shapes into one mesh, each reachable as `"<mesh>/<shape>"`.
#[derive(Debug, Default)]
pub struct ShapeSet {
    data: MeshData,
    parts: Vec<(String, SubmeshRange)>,
}

impl ShapeSet {
    pub fn push(mut self, name: &str, shape: MeshData) -> Self {
        let range = SubmeshRange {
            index_count: shape.indices.len() as u32,
            start_index: self.data.indices.len() as u32,
            base_vertex: self.data.vertices.len() as i32,
            vertex_count: shape.vertices.len() as u32,
        };
        self.data.vertices.extend(shape.vertices);
        self.data.indices.extend(shape.indices);
        self.parts.push((name.to_string(), range));
        self
    }

    pub fn into_mesh(self, name: &str) -> Mesh {
        let mut mesh = Mesh::new(
            name,
            MeshVertices::Static(self.data.vertices),
            self.data.indices,
        );
        for (part, range) in self.parts {
            mesh = mesh.with_submesh(part, range);
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewater_engine::scene::{GeometryProvider, MeshTable};

    fn in_bounds(m: &MeshData) -> bool {
        m.indices.iter().all(|&i| (i as usize) < m.vertices.len())
    }

    // ── shapes ────────────────────────────────────────────────────────────

    #[test]
    fn box_has_six_faces() {
        let b = create_box(2.0, 1.0, 1.0);
        assert_eq!(b.vertices.len(), 24);
        assert_eq!(b.indices.len(), 36);
        assert!(in_bounds(&b));
        assert!(b.vertices.iter().all(|v| v.pos[0].abs() <= 1.0 + 1e-6));
    }

    #[test]
    fn box_faces_wind_clockwise_from_outside() {
        let b = create_box(1.0, 1.0, 1.0);
        for tri in b.indices.chunks(3) {
            let [p0, p1, p2] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(b.vertices[i as usize].pos));
            let n = Vec3::from(b.vertices[tri[0] as usize].normal);
            // Left-handed: clockwise front faces have (p1-p0)x(p2-p0) along the normal.
            assert!((p1 - p0).cross(p2 - p0).dot(n) > 0.0);
        }
    }

    #[test]
    fn grid_matches_requested_size() {
        let g = create_grid(10.0, 20.0, 5, 3);
        assert_eq!(g.vertices.len(), 15);
        assert_eq!(g.indices.len(), 4 * 2 * 6);
        assert!(in_bounds(&g));
        assert_eq!(g.vertices[0].pos, [-5.0, 0.0, 10.0]);
        assert_eq!(g.vertices[14].pos, [5.0, 0.0, -10.0]);
    }

    #[test]
    fn cylinder_indices_in_bounds() {
        let c = create_cylinder(0.5, 3.0, 12, 4);
        assert!(in_bounds(&c));
        assert_eq!(c.vertices.len(), 5 * 13 + 2 * 14);
    }

    // ── shape set ─────────────────────────────────────────────────────────

    #[test]
    fn shape_set_registers_submeshes() {
        let mut table = MeshTable::new();
        table
            .insert(
                ShapeSet::default()
                    .push("box", create_box(1.0, 1.0, 1.0))
                    .push("grid", create_grid(1.0, 1.0, 2, 2))
                    .into_mesh("shapes"),
            )
            .unwrap();

        let grid = table.resolve("shapes/grid").unwrap();
        assert_eq!(grid.range.start_index, 36);
        assert_eq!(grid.range.base_vertex, 24);
        assert_eq!(grid.range.index_count, 6);
        assert!(table.resolve("shapes/cone").is_none());
    }
}
