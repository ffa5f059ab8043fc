//! Minimal PLY point-cloud reader.
//!
//! Supports the subset of PLY that registration fragments use: version 1.0
//! files in `ascii` or `binary_little_endian` format whose first element is
//! `vertex` with scalar `x`/`y`/`z` float properties. Extra vertex
//! properties (colors, normals) are skipped; elements after the vertices
//! (faces) are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use nalgebra::Point3;

use crate::core::types::PointCloud;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    fn parse(token: &str) -> Option<ScalarType> {
        match token {
            "char" | "int8" => Some(ScalarType::I8),
            "uchar" | "uint8" => Some(ScalarType::U8),
            "short" | "int16" => Some(ScalarType::I16),
            "ushort" | "uint16" => Some(ScalarType::U16),
            "int" | "int32" => Some(ScalarType::I32),
            "uint" | "uint32" => Some(ScalarType::U32),
            "float" | "float32" => Some(ScalarType::F32),
            "double" | "float64" => Some(ScalarType::F64),
            _ => None,
        }
    }

    fn size(self) -> usize {
        match self {
            ScalarType::I8 | ScalarType::U8 => 1,
            ScalarType::I16 | ScalarType::U16 => 2,
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 => 4,
            ScalarType::F64 => 8,
        }
    }
}

#[derive(Debug)]
struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    properties: Vec<(String, ScalarType)>,
    /// Property indices of x, y, z
    xyz: [usize; 3],
}

/// Load a point cloud from a PLY file.
pub fn load_ply(path: &Path) -> Result<PointCloud> {
    let file = File::open(path)
        .map_err(|e| Error::Dataset(format!("failed to open PLY file {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);

    let header = parse_header(&mut reader, path)?;
    match header.format {
        PlyFormat::Ascii => read_ascii(&mut reader, &header, path),
        PlyFormat::BinaryLittleEndian => read_binary(&mut reader, &header, path),
    }
}

fn read_header_line(reader: &mut impl BufRead, path: &Path) -> Result<String> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .map_err(|e| Error::Dataset(format!("failed to read PLY header in {}: {e}", path.display())))?;
    if n == 0 {
        return Err(Error::Dataset(format!(
            "unexpected end of PLY header in {}",
            path.display()
        )));
    }
    Ok(line.trim_end().to_string())
}

fn parse_header(reader: &mut impl BufRead, path: &Path) -> Result<PlyHeader> {
    let magic = read_header_line(reader, path)?;
    if magic.trim() != "ply" {
        return Err(Error::Dataset(format!(
            "not a PLY file: {}",
            path.display()
        )));
    }

    let mut format = None;
    let mut vertex_count = None;
    let mut properties: Vec<(String, ScalarType)> = Vec::new();
    let mut in_vertex_element = false;

    loop {
        let line = read_header_line(reader, path)?;
        let mut tokens = line.split_whitespace();
        let keyword = match tokens.next() {
            Some(k) => k,
            None => continue,
        };

        match keyword {
            "comment" | "obj_info" => continue,
            "format" => {
                format = match tokens.next() {
                    Some("ascii") => Some(PlyFormat::Ascii),
                    Some("binary_little_endian") => Some(PlyFormat::BinaryLittleEndian),
                    other => {
                        return Err(Error::Dataset(format!(
                            "unsupported PLY format {:?} in {}",
                            other.unwrap_or(""),
                            path.display()
                        )));
                    }
                };
            }
            "element" => {
                let name = tokens.next().unwrap_or("");
                if name == "vertex" {
                    let count = tokens
                        .next()
                        .and_then(|t| t.parse::<usize>().ok())
                        .ok_or_else(|| {
                            Error::Dataset(format!(
                                "invalid vertex count in {}",
                                path.display()
                            ))
                        })?;
                    vertex_count = Some(count);
                    in_vertex_element = true;
                } else {
                    if vertex_count.is_none() {
                        return Err(Error::Dataset(format!(
                            "PLY element '{name}' precedes vertices in {}",
                            path.display()
                        )));
                    }
                    in_vertex_element = false;
                }
            }
            "property" => {
                if !in_vertex_element {
                    continue;
                }
                let type_token = tokens.next().unwrap_or("");
                if type_token == "list" {
                    return Err(Error::Dataset(format!(
                        "list property in vertex element of {}",
                        path.display()
                    )));
                }
                let scalar = ScalarType::parse(type_token).ok_or_else(|| {
                    Error::Dataset(format!(
                        "unknown PLY property type '{type_token}' in {}",
                        path.display()
                    ))
                })?;
                let name = tokens.next().ok_or_else(|| {
                    Error::Dataset(format!("unnamed PLY property in {}", path.display()))
                })?;
                properties.push((name.to_string(), scalar));
            }
            "end_header" => break,
            _ => {
                return Err(Error::Dataset(format!(
                    "unexpected PLY header line '{line}' in {}",
                    path.display()
                )));
            }
        }
    }

    let format = format
        .ok_or_else(|| Error::Dataset(format!("PLY header missing format in {}", path.display())))?;
    let vertex_count = vertex_count.ok_or_else(|| {
        Error::Dataset(format!(
            "PLY header missing vertex element in {}",
            path.display()
        ))
    })?;

    let mut xyz = [usize::MAX; 3];
    for (idx, (name, scalar)) in properties.iter().enumerate() {
        let slot = match name.as_str() {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            _ => continue,
        };
        if !matches!(scalar, ScalarType::F32 | ScalarType::F64) {
            return Err(Error::Dataset(format!(
                "PLY property '{name}' must be float or double in {}",
                path.display()
            )));
        }
        xyz[slot] = idx;
    }
    if xyz.contains(&usize::MAX) {
        return Err(Error::Dataset(format!(
            "PLY vertex element missing x/y/z in {}",
            path.display()
        )));
    }

    Ok(PlyHeader {
        format,
        vertex_count,
        properties,
        xyz,
    })
}

fn read_ascii(reader: &mut impl BufRead, header: &PlyHeader, path: &Path) -> Result<PointCloud> {
    let mut cloud = PointCloud::new();
    let mut line = String::new();

    for vertex in 0..header.vertex_count {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| Error::Dataset(format!("failed to read {}: {e}", path.display())))?;
        if n == 0 {
            return Err(Error::Dataset(format!(
                "PLY file truncated at vertex {vertex} of {} in {}",
                header.vertex_count,
                path.display()
            )));
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < header.properties.len() {
            return Err(Error::Dataset(format!(
                "PLY vertex {vertex} has {} value(s), expected {} in {}",
                tokens.len(),
                header.properties.len(),
                path.display()
            )));
        }

        let mut coords = [0.0f64; 3];
        for (slot, &idx) in header.xyz.iter().enumerate() {
            coords[slot] = tokens[idx].parse::<f64>().map_err(|_| {
                Error::Dataset(format!(
                    "invalid coordinate '{}' at vertex {vertex} in {}",
                    tokens[idx],
                    path.display()
                ))
            })?;
        }
        cloud.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    Ok(cloud)
}

fn read_binary(reader: &mut impl Read, header: &PlyHeader, path: &Path) -> Result<PointCloud> {
    let stride: usize = header.properties.iter().map(|(_, s)| s.size()).sum();
    let mut offsets = Vec::with_capacity(header.properties.len());
    let mut offset = 0;
    for (_, scalar) in &header.properties {
        offsets.push(offset);
        offset += scalar.size();
    }

    let mut cloud = PointCloud::new();
    let mut buffer = vec![0u8; stride];

    for vertex in 0..header.vertex_count {
        reader.read_exact(&mut buffer).map_err(|_| {
            Error::Dataset(format!(
                "PLY file truncated at vertex {vertex} of {} in {}",
                header.vertex_count,
                path.display()
            ))
        })?;

        let mut coords = [0.0f64; 3];
        for (slot, &idx) in header.xyz.iter().enumerate() {
            let start = offsets[idx];
            coords[slot] = match header.properties[idx].1 {
                ScalarType::F32 => {
                    let bytes: [u8; 4] = buffer[start..start + 4]
                        .try_into()
                        .map_err(|_| Error::Dataset(format!("corrupt PLY in {}", path.display())))?;
                    f32::from_le_bytes(bytes) as f64
                }
                ScalarType::F64 => {
                    let bytes: [u8; 8] = buffer[start..start + 8]
                        .try_into()
                        .map_err(|_| Error::Dataset(format!("corrupt PLY in {}", path.display())))?;
                    f64::from_le_bytes(bytes)
                }
                // Header validation restricts x/y/z to float types
                _ => {
                    return Err(Error::Dataset(format!(
                        "non-float coordinate property in {}",
                        path.display()
                    )));
                }
            };
        }
        cloud.push(Point3::new(coords[0], coords[1], coords[2]));
    }

    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_ascii_with_extra_properties() {
        let ply = "ply\n\
                   format ascii 1.0\n\
                   comment made by tests\n\
                   element vertex 2\n\
                   property float x\n\
                   property float y\n\
                   property float z\n\
                   property uchar red\n\
                   element face 0\n\
                   property list uchar int vertex_indices\n\
                   end_header\n\
                   1.0 2.0 3.0 255\n\
                   -0.5 0.25 0 0\n";
        let file = write_temp(ply.as_bytes());

        let cloud = load_ply(file.path()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.points[1], Point3::new(-0.5, 0.25, 0.0));
    }

    #[test]
    fn test_binary_little_endian() {
        let mut contents = Vec::new();
        contents.extend_from_slice(
            b"ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
              property float x\nproperty float y\nproperty float z\nend_header\n",
        );
        for value in [1.0f32, 2.0, 3.0, -4.0, 0.5, 9.0] {
            contents.extend_from_slice(&value.to_le_bytes());
        }
        let file = write_temp(&contents);

        let cloud = load_ply(file.path()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.points[1], Point3::new(-4.0, 0.5, 9.0));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let file = write_temp(b"obj\nformat ascii 1.0\nend_header\n");
        assert!(load_ply(file.path()).is_err());
    }

    #[test]
    fn test_rejects_truncated_binary() {
        let mut contents = Vec::new();
        contents.extend_from_slice(
            b"ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
              property float x\nproperty float y\nproperty float z\nend_header\n",
        );
        // Only one vertex instead of two
        for value in [1.0f32, 2.0, 3.0] {
            contents.extend_from_slice(&value.to_le_bytes());
        }
        let file = write_temp(&contents);

        assert!(load_ply(file.path()).is_err());
    }

    #[test]
    fn test_rejects_missing_xyz() {
        let file = write_temp(
            b"ply\nformat ascii 1.0\nelement vertex 1\n\
              property float x\nproperty float y\nend_header\n0 0\n",
        );
        assert!(load_ply(file.path()).is_err());
    }
}
