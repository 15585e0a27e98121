/// STL reader for binary and ASCII files
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending, space0},
    combinator::{map, opt},
    multi::many0,
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::geometry::{MeshBuilder, TriangleMesh};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// A parsed STL solid. Every triangle owns its three vertices, which carry
/// the facet normal.
#[derive(Debug, Clone)]
pub struct StlSolid {
    pub name: Option<String>,
    pub mesh: TriangleMesh,
}

struct Facet {
    normal: Vector3<f64>,
    corners: [Point3<f64>; 3],
}

fn push_facet(builder: &mut MeshBuilder, facet: &Facet) {
    // Files often store zero normals; fall back to the winding.
    let [a, b, c] = facet.corners;
    let normal = facet
        .normal
        .try_normalize(f64::EPSILON)
        .or_else(|| (b - a).cross(&(c - a)).try_normalize(f64::EPSILON))
        .unwrap_or_else(Vector3::z);

    let indices = facet
        .corners
        .map(|p| builder.add_vertex(p, Some(normal), None));
    builder.add_triangle(indices[0], indices[1], indices[2]);
}

fn read_f32(data: &[u8], offset: usize) -> f64 {
    let bytes = [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]];
    f64::from(f32::from_le_bytes(bytes))
}

fn read_vector(data: &[u8], offset: usize) -> [f64; 3] {
    [
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    ]
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<StlSolid> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::Structural(format!(
            "binary STL needs at least {} bytes, got {}",
            HEADER_LEN + 4,
            data.len()
        )));
    }

    let count_bytes = [data[80], data[81], data[82], data[83]];
    let triangle_count = u32::from_le_bytes(count_bytes) as usize;
    let body = &data[HEADER_LEN + 4..];
    if body.len() != triangle_count * FACET_LEN {
        return Err(MeshError::Structural(format!(
            "binary STL declares {triangle_count} triangles but has {} bytes of facet data",
            body.len()
        )));
    }

    let mut builder = MeshBuilder::with_capacity(triangle_count * 3, true, false);
    for record in body.chunks_exact(FACET_LEN) {
        let facet = Facet {
            normal: Vector3::from(read_vector(record, 0)),
            corners: [
                Point3::from(read_vector(record, 12)),
                Point3::from(read_vector(record, 24)),
                Point3::from(read_vector(record, 36)),
            ],
        };
        push_facet(&mut builder, &facet);
    }

    Ok(StlSolid {
        name: None,
        mesh: builder.into_mesh(),
    })
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<StlSolid> {
    let (_, (name, facets)) = parse_solid(input).map_err(|e| {
        MeshError::Structural(format!("malformed ASCII STL: {e}"))
    })?;

    let mut builder = MeshBuilder::with_capacity(facets.len() * 3, true, false);
    for facet in &facets {
        push_facet(&mut builder, facet);
    }
    Ok(StlSolid {
        name,
        mesh: builder.into_mesh(),
    })
}

fn parse_solid(input: &str) -> IResult<&str, (Option<String>, Vec<Facet>)> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, name) = preceded(space0, not_line_ending)(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;

    let name = name.trim();
    let name = (!name.is_empty()).then(|| name.to_string());
    Ok((input, (name, facets)))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (a, b, c)) = tuple((parse_vertex, parse_vertex, parse_vertex))(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        Facet {
            normal: Vector3::from(normal),
            corners: [a, b, c],
        },
    ))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f64>> {
    map(
        preceded(preceded(multispace0, tag("vertex")), parse_vector3),
        Point3::from,
    )(input)
}

fn parse_vector3(input: &str) -> IResult<&str, [f64; 3]> {
    let (input, _) = multispace0(input)?;
    let (input, x) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = double(input)?;
    Ok((input, [x, y, z]))
}

/// Detect and parse STL data (ASCII first, then binary)
pub fn parse_stl(data: &[u8]) -> Result<StlSolid> {
    // Binary headers may also start with "solid", so only trust ASCII if it parses.
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(solid) => return Ok(solid),
                Err(e) => log::debug!("not an ASCII STL, trying binary: {e}"),
            }
        }
    }

    parse_binary_stl(data)
}
