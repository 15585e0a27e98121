//! Wavefront material library (`.mtl`) reader.
//!
//! Parsing only records [`MaterialDefinition`]s. Turning a definition into a
//! renderable [`Material`] decodes texture images, so it is deferred until a
//! sub-mesh actually references the material and runs on the dispatcher
//! thread (see [`crate::model`]).

use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;

use crate::error::{MeshError, Result};
use crate::lines::{LogicalLine, Lines};
use crate::numbers;

/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const GOLD: Color = Color::new(1.0, 0.843, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Parse `r [g b]`; a single value is a grey level.
    fn parse(args: &str, line: usize) -> Result<Self> {
        let values = numbers::floats(args, line, 1)?;
        let r = values[0] as f32;
        let g = values.get(1).map_or(r, |&v| v as f32);
        let b = values.get(2).map_or(g, |&v| v as f32);
        Ok(Self::new(r, g, b))
    }
}

/// A decoded texture image.
#[derive(Debug, Clone)]
pub struct Texture {
    pub path: PathBuf,
    pub image: RgbaImage,
}

impl Texture {
    pub fn load(path: &Path) -> std::result::Result<Self, image::ImageError> {
        let image = image::open(path)?.into_rgba8();
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    /// Average color, used by renderers that cannot sample.
    pub fn average_color(&self) -> Color {
        let count = (self.image.width() as u64 * self.image.height() as u64).max(1) as f32;
        let (r, g, b) = self.image.pixels().fold((0.0f32, 0.0f32, 0.0f32), |acc, p| {
            (acc.0 + p[0] as f32, acc.1 + p[1] as f32, acc.2 + p[2] as f32)
        });
        Color::new(r / count / 255.0, g / count / 255.0, b / count / 255.0)
    }
}

/// A renderable material, resolved from a [`MaterialDefinition`].
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f64,
    /// `1.0` is fully opaque.
    pub opacity: f64,
    pub illumination: Option<u32>,
    pub ambient_map: Option<Arc<Texture>>,
    pub diffuse_map: Option<Arc<Texture>>,
    pub specular_map: Option<Arc<Texture>>,
    pub alpha_map: Option<Arc<Texture>>,
    pub bump_map: Option<Arc<Texture>>,
}

impl Material {
    /// A flat-colored material without textures.
    pub fn solid(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            ambient: Color::BLACK,
            diffuse: color,
            specular: Color::BLACK,
            shininess: 0.0,
            opacity: 1.0,
            illumination: None,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
            alpha_map: None,
            bump_map: None,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0 || self.alpha_map.is_some()
    }

    /// The color a renderer without texture sampling should use.
    pub fn base_color(&self) -> Color {
        match &self.diffuse_map {
            Some(texture) => texture.average_color(),
            None => self.diffuse,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid("default", Color::GOLD)
    }
}

/// One `newmtl` block as written in the library.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    pub name: String,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub specular_exponent: f64,
    /// Written by `d`, and by `Tr` unless legacy transparency is skipped.
    pub dissolve: f64,
    pub illumination: Option<u32>,
    pub ambient_map: Option<String>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub alpha_map: Option<String>,
    pub bump_map: Option<String>,
}

impl MaterialDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Color::BLACK,
            diffuse: Color::BLACK,
            specular: Color::BLACK,
            specular_exponent: 0.0,
            dissolve: 1.0,
            illumination: None,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
            alpha_map: None,
            bump_map: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement {
    NewMaterial,
    Ambient,
    Diffuse,
    Specular,
    SpecularExponent,
    Dissolve,
    Transparency,
    Illumination,
    AmbientMap,
    DiffuseMap,
    SpecularMap,
    AlphaMap,
    BumpMap,
    Unknown,
}

impl Statement {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "newmtl" => Self::NewMaterial,
            "ka" => Self::Ambient,
            "kd" => Self::Diffuse,
            "ks" => Self::Specular,
            "ns" => Self::SpecularExponent,
            "d" => Self::Dissolve,
            "tr" => Self::Transparency,
            "illum" => Self::Illumination,
            "map_ka" => Self::AmbientMap,
            "map_kd" => Self::DiffuseMap,
            "map_ks" => Self::SpecularMap,
            "map_d" => Self::AlphaMap,
            "map_bump" | "bump" => Self::BumpMap,
            _ => Self::Unknown,
        }
    }
}

/// The file name of a map statement, skipping leading `-option value` pairs.
fn map_file(args: &str) -> Option<String> {
    if args.starts_with('-') {
        args.split_whitespace().last().map(str::to_string)
    } else if args.is_empty() {
        None
    } else {
        Some(args.to_string())
    }
}

/// Named material definitions plus the cache of resolved materials.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    definitions: Vec<MaterialDefinition>,
    by_name: HashMap<String, usize>,
    resolved: HashMap<(usize, PathBuf), Arc<Material>>,
    textures: HashMap<PathBuf, Option<Arc<Texture>>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a library and add its definitions.
    ///
    /// A name that is already defined (here or in an earlier library) keeps
    /// its first definition; the attribute lines of the repeated block are
    /// discarded.
    pub fn parse<R: BufRead>(&mut self, reader: R, skip_legacy_transparency: bool) -> Result<()> {
        let mut current: Option<usize> = None;
        for line in Lines::new(reader) {
            let line = line?;
            let statement = Statement::from_keyword(&line.keyword);
            if statement == Statement::NewMaterial {
                current = self.begin(&line);
                continue;
            }
            if let Some(index) = current {
                apply(
                    &mut self.definitions[index],
                    statement,
                    &line,
                    skip_legacy_transparency,
                )?;
            }
        }
        Ok(())
    }

    fn begin(&mut self, line: &LogicalLine) -> Option<usize> {
        let name = line.args.as_str();
        if self.by_name.contains_key(name) {
            log::debug!("line {}: material {name:?} is already defined", line.number);
            return None;
        }
        let index = self.definitions.len();
        self.definitions.push(MaterialDefinition::new(name));
        self.by_name.insert(name.to_string(), index);
        Some(index)
    }

    pub fn get(&self, name: &str) -> Option<&MaterialDefinition> {
        self.by_name.get(name).map(|&i| &self.definitions[i])
    }

    pub fn definitions(&self) -> &[MaterialDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve a definition into a renderable material, decoding its textures
    /// relative to `texture_path`. Cached per `(name, texture_path)`.
    pub fn resolve(&mut self, name: &str, texture_path: &Path) -> Option<Arc<Material>> {
        let index = *self.by_name.get(name)?;
        let key = (index, texture_path.to_path_buf());
        if let Some(material) = self.resolved.get(&key) {
            return Some(Arc::clone(material));
        }

        let definition = self.definitions[index].clone();
        let mut map = |file: &Option<String>| {
            file.as_deref()
                .and_then(|file| self.texture(texture_path, file))
        };
        let material = Arc::new(Material {
            name: definition.name.clone(),
            ambient: definition.ambient,
            diffuse: definition.diffuse,
            specular: definition.specular,
            shininess: definition.specular_exponent,
            opacity: definition.dissolve,
            illumination: definition.illumination,
            ambient_map: map(&definition.ambient_map),
            diffuse_map: map(&definition.diffuse_map),
            specular_map: map(&definition.specular_map),
            alpha_map: map(&definition.alpha_map),
            bump_map: map(&definition.bump_map),
        });
        self.resolved.insert(key, Arc::clone(&material));
        Some(material)
    }

    /// Load a texture relative to `texture_path`, decoding each file once.
    ///
    /// A texture that cannot be read is logged and reported as `None`.
    pub fn texture(&mut self, texture_path: &Path, file: &str) -> Option<Arc<Texture>> {
        let path = texture_path.join(file.replace('\\', "/"));
        self.textures
            .entry(path)
            .or_insert_with_key(|path| match Texture::load(path) {
                Ok(texture) => Some(Arc::new(texture)),
                Err(e) => {
                    log::warn!("failed to load texture {}: {e}", path.display());
                    None
                }
            })
            .clone()
    }
}

fn apply(
    definition: &mut MaterialDefinition,
    statement: Statement,
    line: &LogicalLine,
    skip_legacy_transparency: bool,
) -> Result<()> {
    let number = line.number;
    let args = line.args.as_str();
    let scalar = |args: &str| -> Result<f64> {
        let token = args.split_whitespace().last().unwrap_or_default();
        numbers::float(token).ok_or_else(|| MeshError::Number {
            line: number,
            token: token.to_string(),
        })
    };

    match statement {
        Statement::Ambient => definition.ambient = Color::parse(args, number)?,
        Statement::Diffuse => definition.diffuse = Color::parse(args, number)?,
        Statement::Specular => definition.specular = Color::parse(args, number)?,
        Statement::SpecularExponent => definition.specular_exponent = scalar(args)?,
        // `d -halo 0.5` is read as plain 0.5.
        Statement::Dissolve => definition.dissolve = scalar(args)?,
        Statement::Transparency if !skip_legacy_transparency => {
            definition.dissolve = scalar(args)?
        }
        Statement::Illumination => {
            let value = numbers::index(args, number)?;
            definition.illumination = u32::try_from(value).ok();
        }
        Statement::AmbientMap => definition.ambient_map = map_file(args),
        Statement::DiffuseMap => definition.diffuse_map = map_file(args),
        Statement::SpecularMap => definition.specular_map = map_file(args),
        Statement::AlphaMap => definition.alpha_map = map_file(args),
        Statement::BumpMap => definition.bump_map = map_file(args),
        Statement::Transparency | Statement::NewMaterial | Statement::Unknown => {}
    }
    Ok(())
}
