//! State of one OBJ parse.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::lines::{LogicalLine, Lines};
use crate::mtl::MaterialLibrary;
use crate::numbers;

use super::face::{self, FaceAssembler};
use super::groups::GroupList;
use super::pools::AttributePools;
use super::smoothing::{SmoothingGroupId, SmoothingGroups};
use super::{ObjDocument, ObjOptions, Statement};

/// Everything a single parse mutates. Never shared between parses.
pub(crate) struct ObjSession<'a> {
    options: &'a ObjOptions,
    base_dir: Option<PathBuf>,
    pools: AttributePools,
    groups: GroupList,
    smoothing: SmoothingGroups,
    smoothing_group: SmoothingGroupId,
    materials: MaterialLibrary,
    dropped: usize,
}

impl<'a> ObjSession<'a> {
    pub fn new(
        options: &'a ObjOptions,
        base_dir: Option<PathBuf>,
        materials: MaterialLibrary,
    ) -> Self {
        Self {
            options,
            base_dir,
            pools: AttributePools::default(),
            groups: GroupList::default(),
            smoothing: SmoothingGroups::default(),
            smoothing_group: if options.default_smoothing_on { 1 } else { 0 },
            materials,
            dropped: 0,
        }
    }

    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in Lines::new(reader) {
            let line = line?;
            match self.execute(&line) {
                Ok(()) => {}
                Err(e) if self.options.ignore_errors && e.is_recoverable() => {
                    log::debug!("skipping statement: {e}");
                    self.dropped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn finish(self) -> ObjDocument {
        if self.dropped > 0 {
            log::debug!("{} statements were skipped", self.dropped);
        }
        let texture_path = self
            .options
            .texture_path
            .clone()
            .or(self.base_dir)
            .unwrap_or_default();
        ObjDocument {
            groups: self.groups.into_groups(),
            materials: self.materials,
            texture_path,
        }
    }

    fn execute(&mut self, line: &LogicalLine) -> Result<()> {
        let args = line.args.as_str();
        match Statement::from_keyword(&line.keyword) {
            Statement::Vertex => {
                let v = numbers::floats(args, line.number, 3)?;
                let position = self.swizzle(v[0], v[1], v[2]);
                self.pools.push_position(Point3::from(position));
            }
            Statement::TexCoord => {
                let vt = numbers::floats(args, line.number, 1)?;
                let v = vt.get(1).copied().unwrap_or(0.0);
                self.pools.push_texcoord(Point2::new(vt[0], 1.0 - v));
            }
            Statement::Normal => {
                let vn = numbers::floats(args, line.number, 3)?;
                let normal = self.swizzle(vn[0], vn[1], vn[2]);
                self.pools.push_normal(normal);
            }
            Statement::Face => self.add_face(args, line.number)?,
            Statement::Group | Statement::Object => {
                let name = args.split_whitespace().collect::<Vec<_>>().join(" ");
                self.groups.begin_group(&name);
                self.smoothing.clear();
            }
            Statement::Smoothing => self.smoothing_group = parse_smoothing_group(args, line.number)?,
            Statement::UseMaterial => {
                let material = (!args.is_empty()).then(|| args.to_string());
                if self.groups.set_material(material) {
                    log::debug!("line {}: material change starts a new sub-mesh", line.number);
                    self.smoothing.clear();
                }
            }
            Statement::UseMap => {
                let map = (!args.is_empty() && !args.eq_ignore_ascii_case("off"))
                    .then(|| args.to_string());
                if self.groups.set_texture_map(map) {
                    self.smoothing.clear();
                }
            }
            Statement::MaterialLibrary => self.load_material_libraries(args)?,
            Statement::MergingGroup | Statement::Ignored => {}
            Statement::Unknown => {
                log::trace!("line {}: ignoring unknown keyword {:?}", line.number, line.keyword)
            }
        }
        Ok(())
    }

    fn swizzle(&self, x: f64, y: f64, z: f64) -> Vector3<f64> {
        if self.options.switch_yz {
            Vector3::new(x, -z, y)
        } else {
            Vector3::new(x, y, z)
        }
    }

    fn add_face(&mut self, args: &str, line: usize) -> Result<()> {
        let corners = face::parse_corners(args, line)?;
        let mut assembler = FaceAssembler {
            pools: &self.pools,
            smoothing: &mut self.smoothing,
            smoothing_group: self.smoothing_group,
            line,
        };
        assembler.assemble(&corners, self.groups.current_mut())
    }

    fn load_material_libraries(&mut self, args: &str) -> Result<()> {
        for file in args.split_whitespace() {
            let path = match &self.base_dir {
                Some(dir) => dir.join(file),
                None => PathBuf::from(file),
            };
            match File::open(&path) {
                Ok(f) => {
                    self.materials
                        .parse(BufReader::new(f), self.options.skip_legacy_transparency)?;
                    log::debug!("loaded material library {}", path.display());
                }
                Err(e) => log::warn!("material library {} not found: {e}", path.display()),
            }
        }
        Ok(())
    }
}

fn parse_smoothing_group(args: &str, line: usize) -> Result<SmoothingGroupId> {
    if args.eq_ignore_ascii_case("off") {
        return Ok(0);
    }
    numbers::integer(args)
        .and_then(|id| SmoothingGroupId::try_from(id).ok())
        .ok_or_else(|| MeshError::format(line, format!("invalid smoothing group {args:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_group_values() {
        assert_eq!(parse_smoothing_group("off", 1).unwrap(), 0);
        assert_eq!(parse_smoothing_group("OFF", 1).unwrap(), 0);
        assert_eq!(parse_smoothing_group("0", 1).unwrap(), 0);
        assert_eq!(parse_smoothing_group("12", 1).unwrap(), 12);
        assert!(matches!(
            parse_smoothing_group("on", 4),
            Err(MeshError::Format { line: 4, .. })
        ));
        assert!(parse_smoothing_group("-1", 4).is_err());
    }
}
