/// Geometry primitives produced by the mesh readers
use nalgebra::{Point2, Point3, Vector3};

use crate::triangulate;

/// An indexed triangle mesh with optional per-vertex normals and texture coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Point3<f64>>,
    pub normals: Option<Vec<Vector3<f64>>>,
    pub texcoords: Option<Vec<Point2<f64>>>,
    /// Three entries per triangle.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Calculate the face normal of a triangle from its corner positions
    pub fn face_normal(&self, triangle: [u32; 3]) -> Vector3<f64> {
        let v0 = self.positions[triangle[0] as usize];
        let v1 = self.positions[triangle[1] as usize];
        let v2 = self.positions[triangle[2] as usize];

        let normal = (v1 - v0).cross(&(v2 - v0));
        normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
    }

    /// Axis-aligned bounds as `(min, max)`, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }
}

/// Accumulates vertex attributes and triangle indices for one mesh.
///
/// Normals and texture coordinates are only stored while the matching
/// `create_*` flag is set, so a finished mesh either has them for every
/// vertex or not at all.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    texcoords: Vec<Point2<f64>>,
    indices: Vec<u32>,
    create_normals: bool,
    create_texcoords: bool,
}

impl MeshBuilder {
    pub fn new(create_normals: bool, create_texcoords: bool) -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            indices: Vec::new(),
            create_normals,
            create_texcoords,
        }
    }

    pub fn with_capacity(capacity: usize, create_normals: bool, create_texcoords: bool) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            normals: Vec::with_capacity(if create_normals { capacity } else { 0 }),
            texcoords: Vec::with_capacity(if create_texcoords { capacity } else { 0 }),
            indices: Vec::with_capacity(capacity * 3),
            create_normals,
            create_texcoords,
        }
    }

    pub fn creates_normals(&self) -> bool {
        self.create_normals
    }

    pub fn creates_texcoords(&self) -> bool {
        self.create_texcoords
    }

    /// Change which optional attributes are stored. Only valid before any vertex was added.
    pub fn set_attributes(&mut self, create_normals: bool, create_texcoords: bool) {
        debug_assert!(self.positions.is_empty());
        self.create_normals = create_normals;
        self.create_texcoords = create_texcoords;
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_triangles(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Append a vertex and return its index.
    ///
    /// Attributes the builder does not create are dropped; missing ones it
    /// does create are filled with zero.
    pub fn add_vertex(
        &mut self,
        position: Point3<f64>,
        normal: Option<Vector3<f64>>,
        texcoord: Option<Point2<f64>>,
    ) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        if self.create_normals {
            self.normals.push(normal.unwrap_or_else(Vector3::zeros));
        }
        if self.create_texcoords {
            self.texcoords.push(texcoord.unwrap_or_else(Point2::origin));
        }
        index
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Add a convex polygon as a triangle fan. Intended for triangles and quads.
    pub fn add_polygon(&mut self, corners: &[u32]) {
        for k in 1..corners.len().saturating_sub(1) {
            self.add_triangle(corners[0], corners[k], corners[k + 1]);
        }
    }

    /// Add an arbitrary simple polygon using ear-cutting triangulation.
    ///
    /// Considerably more expensive than [`MeshBuilder::add_polygon`].
    pub fn add_polygon_by_cutting_ears(&mut self, corners: &[u32]) {
        let points: Vec<_> = corners
            .iter()
            .map(|&c| self.positions[c as usize])
            .collect();
        for [a, b, c] in triangulate::cut_ears(&points) {
            self.add_triangle(corners[a], corners[b], corners[c]);
        }
    }

    pub fn into_mesh(self) -> TriangleMesh {
        TriangleMesh {
            positions: self.positions,
            normals: self.create_normals.then_some(self.normals),
            texcoords: self.create_texcoords.then_some(self.texcoords),
            indices: self.indices,
        }
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(true, true)
    }
}
