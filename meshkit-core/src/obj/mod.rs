//! Wavefront OBJ reader.
//!
//! Reading happens in two phases. [`ObjReader`] consumes the text and
//! produces an [`ObjDocument`]: plain groups, sub-meshes and material
//! definitions with no dependency on any renderer. [`ObjDocument::into_model`]
//! then resolves materials and builds geometry nodes through a
//! [`Dispatcher`], so hosts can run that part on their rendering thread.
//!
//! # Example
//!
//! ```no_run
//! use meshkit_core::obj::{ObjOptions, ObjReader};
//! use meshkit_core::CurrentThread;
//!
//! let options = ObjOptions::default().with_switch_yz(true);
//! let document = ObjReader::new(options.clone())
//!     .read_path("teapot.obj".as_ref())
//!     .unwrap();
//! let model = document.into_model(&CurrentThread, &options);
//! println!("{} nodes", model.nodes.len());
//! ```

mod face;
mod groups;
mod pools;
mod session;
mod smoothing;
#[cfg(test)]
mod tests;

pub use face::{parse_corners, Corner, MAX_DIRECT_CORNERS};
pub use groups::{Group, SubMesh};
pub use pools::AttributePools;
pub use smoothing::{CornerKey, SmoothingGroupId, SmoothingGroups};

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compression;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::model::{Model, ModelBuilder};
use crate::mtl::{Material, MaterialLibrary};

use session::ObjSession;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ObjOptions {
    /// Skip faces with bad indices and malformed `s` statements instead of failing.
    pub ignore_errors: bool,
    /// Store positions and normals as `(x, -z, y)`.
    pub switch_yz: bool,
    /// Ignore the legacy `Tr` transparency statement in material libraries.
    pub skip_legacy_transparency: bool,
    /// Start with smoothing group 1 instead of 0.
    pub default_smoothing_on: bool,
    /// Base directory for texture maps. Defaults to the OBJ file's directory.
    pub texture_path: Option<PathBuf>,
    /// Used for sub-meshes whose material is unset or unknown.
    pub default_material: Arc<Material>,
}

impl ObjOptions {
    pub fn with_ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    pub fn with_switch_yz(mut self, switch_yz: bool) -> Self {
        self.switch_yz = switch_yz;
        self
    }

    pub fn with_skip_legacy_transparency(mut self, skip: bool) -> Self {
        self.skip_legacy_transparency = skip;
        self
    }

    pub fn with_default_smoothing_on(mut self, on: bool) -> Self {
        self.default_smoothing_on = on;
        self
    }

    pub fn with_texture_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture_path = Some(path.into());
        self
    }

    pub fn with_default_material(mut self, material: Arc<Material>) -> Self {
        self.default_material = material;
        self
    }
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self {
            ignore_errors: false,
            switch_yz: false,
            skip_legacy_transparency: true,
            default_smoothing_on: true,
            texture_path: None,
            default_material: Arc::new(Material::default()),
        }
    }
}

/// Recognized OBJ statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Statement {
    Vertex,
    TexCoord,
    Normal,
    Face,
    Group,
    Object,
    Smoothing,
    MergingGroup,
    MaterialLibrary,
    UseMaterial,
    UseMap,
    /// Curve, surface and display statements that are not modeled.
    Ignored,
    Unknown,
}

impl Statement {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "v" => Self::Vertex,
            "vt" => Self::TexCoord,
            "vn" => Self::Normal,
            "f" => Self::Face,
            "g" => Self::Group,
            "o" => Self::Object,
            "s" => Self::Smoothing,
            "mg" => Self::MergingGroup,
            "mtllib" => Self::MaterialLibrary,
            "usemtl" => Self::UseMaterial,
            "usemap" => Self::UseMap,
            "vp" | "cstype" | "deg" | "degree" | "bmat" | "step" | "p" | "l" | "curv" | "curv2"
            | "surf" | "parm" | "trim" | "hole" | "scrv" | "sp" | "end" | "con" | "bevel"
            | "c_interp" | "d_interp" | "lod" | "shadow_obj" | "trace_obj" | "ctech"
            | "stech" => Self::Ignored,
            _ => Self::Unknown,
        }
    }
}

/// Result of the parsing phase.
#[derive(Debug)]
pub struct ObjDocument {
    pub groups: Vec<Group>,
    pub materials: MaterialLibrary,
    /// Directory texture maps are resolved against.
    pub texture_path: PathBuf,
}

impl ObjDocument {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// Build geometry nodes on the dispatcher's thread.
    pub fn into_model<D: Dispatcher>(self, dispatcher: &D, options: &ObjOptions) -> Model {
        ModelBuilder::new(dispatcher, Arc::clone(&options.default_material)).build(
            self.groups,
            self.materials,
            &self.texture_path,
        )
    }
}

/// Reads Wavefront OBJ streams. Each call parses independently.
#[derive(Debug, Clone, Default)]
pub struct ObjReader {
    options: ObjOptions,
}

impl ObjReader {
    pub fn new(options: ObjOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ObjOptions {
        &self.options
    }

    /// Parse an uncompressed stream. `mtllib` paths are relative to the working directory.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<ObjDocument> {
        self.read_from(reader, None, MaterialLibrary::new())
    }

    /// Parse a stream together with explicitly supplied material libraries.
    pub fn read_with_materials<R, M, I>(&self, reader: R, libraries: I) -> Result<ObjDocument>
    where
        R: BufRead,
        M: BufRead,
        I: IntoIterator<Item = M>,
    {
        let mut materials = MaterialLibrary::new();
        for library in libraries {
            materials.parse(library, self.options.skip_legacy_transparency)?;
        }
        self.read_from(reader, None, materials)
    }

    /// Parse a gzip-compressed stream.
    pub fn read_gz<R: Read>(&self, reader: R) -> Result<ObjDocument> {
        let reader = compression::gunzip(BufReader::new(reader))?;
        self.read_from(reader, None, MaterialLibrary::new())
    }

    /// Parse a file, decompressing it if needed. `mtllib` and texture paths
    /// are resolved relative to the file's directory.
    pub fn read_path(&self, path: &Path) -> Result<ObjDocument> {
        let reader = compression::decompress(BufReader::new(File::open(path)?))?;
        let base_dir = path.parent().map(Path::to_path_buf);
        let document = self.read_from(reader, base_dir, MaterialLibrary::new())?;
        log::info!(
            "loaded {}: {} groups, {} materials",
            path.display(),
            document.groups.len(),
            document.materials.len()
        );
        Ok(document)
    }

    /// Parse a file and build its model on `dispatcher`.
    pub fn load<D: Dispatcher>(&self, path: &Path, dispatcher: &D) -> Result<Model> {
        Ok(self.read_path(path)?.into_model(dispatcher, &self.options))
    }

    fn read_from<R: BufRead>(
        &self,
        reader: R,
        base_dir: Option<PathBuf>,
        materials: MaterialLibrary,
    ) -> Result<ObjDocument> {
        let mut session = ObjSession::new(&self.options, base_dir, materials);
        session.run(reader)?;
        Ok(session.finish())
    }
}
