//! Face statement parsing and assembly.

use crate::error::{Attribute, MeshError, Result};
use crate::numbers;

use super::groups::SubMesh;
use super::pools::AttributePools;
use super::smoothing::{CornerKey, SmoothingGroupId, SmoothingGroups};

/// One `pos[/tex][/norm]` record as written in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub position: i64,
    pub texcoord: Option<i64>,
    pub normal: Option<i64>,
}

/// Polygons with more corners than this are triangulated by ear cutting.
pub const MAX_DIRECT_CORNERS: usize = 4;

fn optional_index(field: Option<&str>, line: usize) -> Result<Option<i64>> {
    match field {
        None | Some("") => Ok(None),
        Some(token) => numbers::index(token, line).map(Some),
    }
}

fn parse_corner(token: &str, line: usize) -> Result<Corner> {
    let mut fields = token.split('/');
    let position = numbers::index(fields.next().unwrap_or_default(), line)?;
    let texcoord = optional_index(fields.next(), line)?;
    let normal = optional_index(fields.next(), line)?;
    if fields.next().is_some() {
        return Err(MeshError::format(
            line,
            format!("face corner {token:?} has more than three fields"),
        ));
    }
    Ok(Corner {
        position,
        texcoord,
        normal,
    })
}

/// Parse the corner records of an `f` statement.
pub fn parse_corners(args: &str, line: usize) -> Result<Vec<Corner>> {
    args.split_whitespace()
        .map(|token| parse_corner(token, line))
        .collect()
}

/// Emits faces into the current sub-mesh, sharing vertices per smoothing group.
pub(crate) struct FaceAssembler<'a> {
    pub pools: &'a AttributePools,
    pub smoothing: &'a mut SmoothingGroups,
    pub smoothing_group: SmoothingGroupId,
    pub line: usize,
}

impl FaceAssembler<'_> {
    /// Validate and emit one face.
    ///
    /// Nothing is emitted unless every corner resolves, so a rejected face
    /// leaves the sub-mesh and smoothing maps untouched.
    pub fn assemble(&mut self, corners: &[Corner], sub_mesh: &mut SubMesh) -> Result<()> {
        if corners.len() < 3 {
            return Err(MeshError::format(
                self.line,
                format!("face has {} corners, at least 3 are required", corners.len()),
            ));
        }

        let (texcoords, normals) = if sub_mesh.is_latched() {
            (sub_mesh.emits_texcoords(), sub_mesh.emits_normals())
        } else {
            (corners[0].texcoord.is_some(), corners[0].normal.is_some())
        };

        let keys = corners
            .iter()
            .enumerate()
            .map(|(i, corner)| self.resolve(i, corner, texcoords, normals))
            .collect::<Result<Vec<_>>>()?;

        sub_mesh.latch(texcoords, normals);

        let pools = self.pools;
        let builder = sub_mesh.builder_mut();
        let vertices: Vec<u32> = keys
            .into_iter()
            .map(|key| {
                self.smoothing.resolve(self.smoothing_group, key, || {
                    builder.add_vertex(
                        pools.positions()[key.position],
                        key.normal.map(|n| pools.normals()[n]),
                        key.texcoord.map(|t| pools.texcoords()[t]),
                    )
                })
            })
            .collect();

        if vertices.len() <= MAX_DIRECT_CORNERS {
            builder.add_polygon(&vertices);
        } else {
            builder.add_polygon_by_cutting_ears(&vertices);
        }
        Ok(())
    }

    fn resolve(
        &self,
        i: usize,
        corner: &Corner,
        texcoords: bool,
        normals: bool,
    ) -> Result<CornerKey> {
        let out_of_range = |attribute, index| MeshError::IndexOutOfRange {
            line: self.line,
            attribute,
            index,
        };
        let missing = |what: &str| {
            MeshError::format(
                self.line,
                format!("corner {} has no {what} index but the mesh uses {what}s", i + 1),
            )
        };

        let position = self
            .pools
            .resolve_position(corner.position)
            .ok_or_else(|| out_of_range(Attribute::Position, corner.position))?;

        let texcoord = if texcoords {
            let raw = corner.texcoord.ok_or_else(|| missing("texture coordinate"))?;
            let index = self
                .pools
                .resolve_texcoord(raw)
                .ok_or_else(|| out_of_range(Attribute::TexCoord, raw))?;
            Some(index)
        } else {
            None
        };

        let normal = if normals {
            let raw = corner.normal.ok_or_else(|| missing("normal"))?;
            let index = self
                .pools
                .resolve_normal(raw)
                .ok_or_else(|| out_of_range(Attribute::Normal, raw))?;
            Some(index)
        } else {
            None
        };

        Ok(CornerKey {
            position,
            texcoord,
            normal,
        })
    }
}
