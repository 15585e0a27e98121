/// meshkit core library - mesh import and geometry building
///
/// This library reads Wavefront OBJ (with MTL material libraries) and STL
/// files into indexed triangle meshes. Parsing is stateless and runs on any
/// thread; building renderable models goes through a `Dispatcher`.

pub mod compression;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod lines;
pub mod model;
pub mod mtl;
pub mod numbers;
pub mod obj;
pub mod stl;
pub mod triangulate;

use std::path::Path;
use std::sync::Arc;

// Re-export commonly used types
pub use dispatch::{CurrentThread, Dispatcher};
pub use error::{Attribute, MeshError, Result};
pub use geometry::{MeshBuilder, TriangleMesh};
pub use model::{GeometryNode, Model, ModelBuilder};
pub use mtl::{Color, Material, MaterialLibrary};
pub use obj::{ObjDocument, ObjOptions, ObjReader};
pub use stl::StlSolid;

/// Load an `.obj`, `.obj.gz` or `.stl` file and build its model on `dispatcher`.
///
/// STL solids become a single node using the default material of `options`.
pub fn load_model<D: Dispatcher>(
    path: &Path,
    options: &ObjOptions,
    dispatcher: &D,
) -> Result<Model> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if file_name.ends_with(".stl") {
        let solid = stl::parse_stl(&std::fs::read(path)?)?;
        log::info!(
            "loaded {}: {} triangles",
            path.display(),
            solid.mesh.triangle_count()
        );
        let name = solid.name.unwrap_or_else(|| "stl".to_string());
        let material = Arc::clone(&options.default_material);
        return Ok(dispatcher.invoke(move || Model {
            nodes: vec![GeometryNode::new(name, solid.mesh, material)],
        }));
    }

    if !(file_name.ends_with(".obj") || file_name.ends_with(".obj.gz")) {
        return Err(MeshError::UnsupportedFormat(format!(
            "unrecognized file extension: {}",
            path.display()
        )));
    }
    ObjReader::new(options.clone()).load(path, dispatcher)
}
