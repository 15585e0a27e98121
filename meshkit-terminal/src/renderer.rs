/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use meshkit_core::{GeometryNode, Model};
use nalgebra::{Rotation3, Vector3};
use std::io::Write;

use crate::view::View;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

const AMBIENT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const EMPTY: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// Map a material color and a light intensity to a terminal color.
pub fn shade(color: meshkit_core::Color, brightness: f64) -> Color {
    let channel = |c: f32| ((f64::from(c) * brightness).clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}

/// ASCII renderer that rasterizes geometry nodes into terminal cells
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f64>,
    cells: Vec<Cell>,
    light: Vector3<f64>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f64::INFINITY; size],
            cells: vec![EMPTY; size],
            light: Vector3::new(0.3, 0.5, 1.0).normalize(),
        }
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f64::INFINITY);
        self.cells.fill(EMPTY);
    }

    /// Number of cells covered by geometry in the current frame.
    pub fn covered_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.character != ' ').count()
    }

    pub fn render_model(&mut self, model: &Model, view: &View, rotation: &Rotation3<f64>) {
        for node in &model.nodes {
            self.render_node(node, view, rotation);
        }
    }

    fn render_node(&mut self, node: &GeometryNode, view: &View, rotation: &Rotation3<f64>) {
        let mesh = &node.mesh;
        for triangle in mesh.triangles() {
            let projected = triangle.map(|i| view.project(&mesh.positions[i as usize], rotation));
            let [Some(a), Some(b), Some(c)] = projected else {
                continue;
            };

            // Smooth meshes shade with their averaged vertex normals.
            let normal = mesh
                .normals
                .as_ref()
                .and_then(|normals| {
                    triangle
                        .iter()
                        .map(|&i| normals[i as usize])
                        .sum::<Vector3<f64>>()
                        .try_normalize(f64::EPSILON)
                })
                .unwrap_or_else(|| mesh.face_normal(triangle));
            let mut normal = rotation * normal;

            let material = if normal.dot(&view.eye_direction()) >= 0.0 {
                &node.material
            } else {
                normal = -normal;
                &node.back_material
            };

            let brightness = AMBIENT + (1.0 - AMBIENT) * normal.dot(&self.light).max(0.0);
            let ramp_index = ((brightness * LUMINOSITY_RAMP.len() as f64) as usize)
                .min(LUMINOSITY_RAMP.len() - 1);
            let cell = Cell {
                character: LUMINOSITY_RAMP[ramp_index],
                color: shade(material.base_color(), brightness),
            };

            self.rasterize_triangle(&[a, b, c], cell);
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f64, f64, f64); 3], cell: Cell) {
        let [v0, v1, v2] = *coords;

        // Bounding box clipped to the screen
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as usize;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil().min(self.width as f64 - 1.0);
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as usize;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil().min(self.height as f64 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }

        for y in min_y..=max_y as usize {
            for x in min_x..=max_x as usize {
                let p = (x as f64 + 0.5, y as f64 + 0.5);
                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p)
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y * self.width + x;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (y, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for cell in row {
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);
    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    Some((w0, w1, 1.0 - w0 - w1))
}
