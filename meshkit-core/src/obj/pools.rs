//! Global attribute pools filled by `v`, `vt` and `vn`.

use nalgebra::{Point2, Point3, Vector3};

/// Positions, normals and texture coordinates in file order.
#[derive(Debug, Default, Clone)]
pub struct AttributePools {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    texcoords: Vec<Point2<f64>>,
}

impl AttributePools {
    pub fn push_position(&mut self, position: Point3<f64>) {
        self.positions.push(position);
    }

    pub fn push_normal(&mut self, normal: Vector3<f64>) {
        self.normals.push(normal);
    }

    pub fn push_texcoord(&mut self, texcoord: Point2<f64>) {
        self.texcoords.push(texcoord);
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Point2<f64>] {
        &self.texcoords
    }

    pub fn resolve_position(&self, raw: i64) -> Option<usize> {
        resolve(raw, self.positions.len())
    }

    pub fn resolve_normal(&self, raw: i64) -> Option<usize> {
        resolve(raw, self.normals.len())
    }

    pub fn resolve_texcoord(&self, raw: i64) -> Option<usize> {
        resolve(raw, self.texcoords.len())
    }
}

/// Turn a 1-based or negative (relative) file index into a 0-based pool index.
fn resolve(raw: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => len + r,
    };
    (0..len).contains(&resolved).then_some(resolved as usize)
}
