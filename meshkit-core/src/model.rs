//! Renderable output of the readers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use nalgebra::Point3;

use crate::dispatch::Dispatcher;
use crate::geometry::TriangleMesh;
use crate::mtl::{Material, MaterialLibrary};
use crate::obj::Group;

/// One mesh with its material. Both faces of every triangle use `material`
/// unless a host replaces `back_material`.
#[derive(Debug, Clone)]
pub struct GeometryNode {
    pub name: String,
    pub mesh: TriangleMesh,
    pub material: Arc<Material>,
    pub back_material: Arc<Material>,
}

impl GeometryNode {
    pub fn new(name: impl Into<String>, mesh: TriangleMesh, material: Arc<Material>) -> Self {
        Self {
            name: name.into(),
            mesh,
            back_material: Arc::clone(&material),
            material,
        }
    }
}

/// An ordered collection of geometry nodes.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub nodes: Vec<GeometryNode>,
}

impl Model {
    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(|n| n.mesh.triangle_count()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.nodes.iter().map(|n| n.mesh.vertex_count()).sum()
    }

    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        self.nodes
            .iter()
            .filter_map(|n| n.mesh.bounds())
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.inf(&min_b), max_a.sup(&max_b)))
    }
}

/// Turns parsed groups into geometry nodes on the dispatcher's thread.
pub struct ModelBuilder<'a, D> {
    dispatcher: &'a D,
    default_material: Arc<Material>,
}

impl<'a, D: Dispatcher> ModelBuilder<'a, D> {
    pub fn new(dispatcher: &'a D, default_material: Arc<Material>) -> Self {
        Self {
            dispatcher,
            default_material,
        }
    }

    /// Build one node per non-empty sub-mesh, in group order.
    pub fn build(
        &self,
        groups: Vec<Group>,
        mut materials: MaterialLibrary,
        texture_path: &Path,
    ) -> Model {
        let default_material = Arc::clone(&self.default_material);
        let texture_path = texture_path.to_path_buf();
        self.dispatcher.invoke(move || {
            let mut overridden: HashMap<(Option<String>, String), Arc<Material>> = HashMap::new();
            let mut nodes = Vec::new();

            for group in groups {
                let name = group.name().to_string();
                for sub_mesh in group.into_sub_meshes() {
                    if sub_mesh.is_empty() {
                        continue;
                    }
                    let (material_name, texture_map, mesh) = sub_mesh.into_parts();
                    let base = material_name
                        .as_deref()
                        .and_then(|m| materials.resolve(m, &texture_path))
                        .unwrap_or_else(|| Arc::clone(&default_material));

                    let material = match texture_map {
                        Some(map) => Arc::clone(
                            overridden
                                .entry((material_name, map))
                                .or_insert_with_key(|(_, map)| {
                                    let mut material = (*base).clone();
                                    material.diffuse_map = materials.texture(&texture_path, map);
                                    Arc::new(material)
                                }),
                        ),
                        None => base,
                    };
                    nodes.push(GeometryNode::new(name.clone(), mesh, material));
                }
            }

            log::debug!("built {} geometry nodes", nodes.len());
            Model { nodes }
        })
    }
}
