//! STL scan loader for binary and ASCII formats
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::opt,
    multi::{count, many0},
    number::complete::{double, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult, InputLength,
};

use crate::error::{AlignError, AlignResult};
use crate::geometry::{Mesh, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> AlignResult<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(AlignError::StlParse(
            "file too small to be a valid STL".to_string(),
        ));
    }

    let declared = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let needed = declared
        .checked_mul(FACET_LEN)
        .and_then(|facets| facets.checked_add(HEADER_LEN + 4));
    if needed.map_or(true, |needed| data.len() < needed) {
        return Err(AlignError::StlParse(format!(
            "unexpected end of file: header declares {declared} triangles"
        )));
    }

    parse_binary_stl_impl(data)
        .map(|(_, mesh)| mesh)
        .map_err(|e| AlignError::StlParse(describe_error(e, data.len())))
}

fn parse_binary_stl_impl(input: &[u8]) -> IResult<&[u8], Mesh> {
    let (input, _) = take(HEADER_LEN)(input)?;
    let (input, triangle_count) = le_u32(input)?;
    let (input, triangles) = count(parse_binary_facet, triangle_count as usize)(input)?;
    Ok((input, Mesh { triangles }))
}

fn parse_binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, (nx, ny, nz)) = binary_vector3(input)?;
    let (input, corners) = count(binary_vector3, 3)(input)?;
    // Attribute byte count
    let (input, _) = take(2usize)(input)?;

    let vertex = |(x, y, z): (f64, f64, f64)| Vertex::new(x, y, z, nx, ny, nz);
    let triangle = Triangle::new(vertex(corners[0]), vertex(corners[1]), vertex(corners[2]));
    Ok((input, triangle))
}

fn binary_vector3(input: &[u8]) -> IResult<&[u8], (f64, f64, f64)> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, (f64::from(x), f64::from(y), f64::from(z))))
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> AlignResult<Mesh> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(AlignError::StlParse(describe_error(e, input.len()))),
    }
}

/// Error kind and byte offset, without echoing the remaining input
fn describe_error<I: InputLength>(error: nom::Err<nom::error::Error<I>>, total: usize) -> String {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("{:?} at byte {}", e.code, total - e.input.input_len())
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Mesh> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = opt(not_line_ending)(input)?;

    Ok((input, Mesh { triangles }))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input, normal)?;
    let (input, v2) = parse_vertex(input, normal)?;
    let (input, v3) = parse_vertex(input, normal)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(v1, v2, v3)))
}

fn parse_vertex(input: &str, normal: (f64, f64, f64)) -> IResult<&str, Vertex> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    Ok((input, Vertex::new(x, y, z, normal.0, normal.1, normal.2)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f64, f64, f64)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = double(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = double(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> AlignResult<Mesh> {
    // Binary headers may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}
