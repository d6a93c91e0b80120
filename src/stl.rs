//! # Stl
//!
//! Binary STL decoding. The layout is an 80 byte comment, a little endian
//! `u32` triangle count, then one 50 byte record per triangle: normal, three
//! vertices (twelve `f32`s) and a `u16` attribute word.

use crate::geo::{dedup_points, Point3d, Triangle3d};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, info, warn};
use std::{
    io::{self, Cursor, Read},
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const HEADER_SIZE: usize = 80;
pub const COUNT_SIZE: usize = 4;
pub const RECORD_SIZE: usize = 50;
pub const EXTENSION: &str = ".stl";

#[derive(Error, Debug)]
/// Error types for decoding STL files
pub enum StlError {
    #[error("STL file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not an STL file (expected a .stl extension): {}", .0.display())]
    InvalidExtension(PathBuf),
    #[error("STL file truncated: expected {expected} bytes, found {found}")]
    TruncatedFile { expected: u64, found: u64 },
    #[error("malformed triangle record {0}")]
    MalformedRecord(usize),
    #[error("Couldn't read STL file: {0}")]
    Io(#[from] io::Error),
}

/// One raw triangle record
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Facet {
    pub normal: Point3d,
    pub v1: Point3d,
    pub v2: Point3d,
    pub v3: Point3d,
    pub attr_byte_count: u16,
}

impl Facet {
    pub fn triangle(&self) -> Triangle3d { Triangle3d::from_points(self.v1, self.v2, self.v3) }
}

pub struct StlHeader {
    pub comment: [u8; HEADER_SIZE],
    pub num_triangles: u32,
}

/// A decoded mesh, facets in file order
pub struct StlFile {
    pub header: StlHeader,
    pub facets: Vec<Facet>,
}

impl StlFile {
    pub fn num_triangles(&self) -> u32 { self.header.num_triangles }

    /// Every vertex in block order: all first vertices, then all second
    /// vertices, then all third vertices
    pub fn points(&self) -> Vec<Point3d> {
        let mut points = Vec::with_capacity(self.facets.len() * 3);
        points.extend(self.facets.iter().map(|f| f.v1));
        points.extend(self.facets.iter().map(|f| f.v2));
        points.extend(self.facets.iter().map(|f| f.v3));
        points
    }

    pub fn triangles(&self) -> Vec<Triangle3d> { self.facets.iter().map(Facet::triangle).collect() }

    pub fn normals(&self) -> Vec<Point3d> { self.facets.iter().map(|f| f.normal).collect() }
}

/// What `decode` should return besides the geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeOptions {
    /// Sort and deduplicate the points. Ignored when returning triangles
    pub unique: bool,
    pub return_triangles: bool,
    pub return_normals: bool,
    pub return_number_of_triangles: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            unique: true,
            return_triangles: false,
            return_normals: false,
            return_number_of_triangles: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Points(Vec<Point3d>),
    Triangles(Vec<Triangle3d>),
}

impl Geometry {
    pub fn len(&self) -> usize {
        match self {
            Geometry::Points(points) => points.len(),
            Geometry::Triangles(tris) => tris.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Flatten into a point cloud, triangles contributing their vertices in
    /// winding order
    pub fn into_points(self) -> Vec<Point3d> {
        match self {
            Geometry::Points(points) => points,
            Geometry::Triangles(tris) => tris.iter().flat_map(|tri| tri.points()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DecodeResult {
    pub geometry: Geometry,
    pub normals: Option<Vec<Point3d>>,
    pub triangle_count: Option<u32>,
}

fn read_point<T: ReadBytesExt>(input: &mut T) -> io::Result<Point3d> {
    let x = input.read_f32::<LittleEndian>()?;
    let y = input.read_f32::<LittleEndian>()?;
    let z = input.read_f32::<LittleEndian>()?;

    Ok(Point3d::new(x, y, z))
}

fn read_facet<T: ReadBytesExt>(input: &mut T) -> io::Result<Facet> {
    let normal = read_point(input)?;
    let v1 = read_point(input)?;
    let v2 = read_point(input)?;
    let v3 = read_point(input)?;
    let attr_byte_count = input.read_u16::<LittleEndian>()?;

    Ok(Facet {
        normal,
        v1,
        v2,
        v3,
        attr_byte_count,
    })
}

fn read_header<T: ReadBytesExt>(input: &mut T) -> Result<StlHeader, StlError> {
    let prefix = HEADER_SIZE + COUNT_SIZE;
    let mut buf = Vec::with_capacity(prefix);
    input.by_ref().take(prefix as u64).read_to_end(&mut buf)?;
    if buf.len() < prefix {
        return Err(StlError::TruncatedFile {
            expected: prefix as u64,
            found: buf.len() as u64,
        });
    }

    let mut comment = [0u8; HEADER_SIZE];
    comment.copy_from_slice(&buf[..HEADER_SIZE]);

    Ok(StlHeader {
        comment,
        num_triangles: LittleEndian::read_u32(&buf[HEADER_SIZE..]),
    })
}

/// Decode a binary STL from any reader
///
/// Stops at the last declared record, anything after it is left unread.
pub fn read_stl<T: ReadBytesExt>(input: &mut T) -> Result<StlFile, StlError> {
    let header = read_header(input)?;
    debug!("STL header declares {} triangles", header.num_triangles);

    // the count is untrusted until the records are actually there
    let mut facets = Vec::with_capacity((header.num_triangles as usize).min(1 << 16));
    for index in 0..header.num_triangles as usize {
        let facet = read_facet(input).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => StlError::MalformedRecord(index),
            _ => StlError::Io(e),
        })?;
        facets.push(facet);
    }

    Ok(StlFile { header, facets })
}

/// Decode a binary STL held in memory
///
/// The buffer must hold at least as many records as the header declares.
pub fn parse_stl(data: &[u8]) -> Result<StlFile, StlError> {
    let found = data.len() as u64;
    let prefix = (HEADER_SIZE + COUNT_SIZE) as u64;
    if found < prefix {
        return Err(StlError::TruncatedFile { expected: prefix, found });
    }

    let num_triangles = LittleEndian::read_u32(&data[HEADER_SIZE..HEADER_SIZE + COUNT_SIZE]);
    let expected = prefix + RECORD_SIZE as u64 * u64::from(num_triangles);
    if found < expected {
        return Err(StlError::TruncatedFile { expected, found });
    }
    if found > expected {
        debug!("ignoring {} trailing bytes after the last record", found - expected);
    }
    if num_triangles == 0 {
        warn!("STL file declares no triangles");
    }

    read_stl(&mut Cursor::new(data))
}

/// Only the file name is checked, the contents are never sniffed
pub fn has_stl_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().to_string_lossy().ends_with(EXTENSION)
}

/// Read an STL file from disk in one go
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<StlFile, StlError> {
    let path = path.as_ref();
    if !has_stl_extension(path) {
        return Err(StlError::InvalidExtension(path.to_path_buf()));
    }

    let data = std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StlError::NotFound(path.to_path_buf()),
        _ => StlError::Io(e),
    })?;

    let stl = parse_stl(&data)?;
    info!("loaded {} triangles from {}", stl.num_triangles(), path.display());
    Ok(stl)
}

/// Read an STL file and extract its points
///
/// # Examples
///
/// ```no_run
/// use stl_transform::stl::{decode, DecodeOptions, Geometry};
/// let result = decode("model.stl", &DecodeOptions::default()).unwrap();
/// if let Geometry::Points(points) = result.geometry {
///     println!("{} unique points", points.len());
/// }
/// ```
pub fn decode<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<DecodeResult, StlError> {
    let stl = load_stl(path)?;
    Ok(extract(&stl, options))
}

/// Shape a decoded mesh the way `options` ask for
pub fn extract(stl: &StlFile, options: &DecodeOptions) -> DecodeResult {
    let geometry = if options.return_triangles {
        Geometry::Triangles(stl.triangles())
    } else if options.unique {
        let points = stl.points();
        let unique = dedup_points(&points);
        debug!("{} of {} points are unique", unique.len(), points.len());
        Geometry::Points(unique)
    } else {
        Geometry::Points(stl.points())
    };

    DecodeResult {
        geometry,
        normals: if options.return_normals { Some(stl.normals()) } else { None },
        triangle_count: if options.return_number_of_triangles {
            Some(stl.num_triangles())
        } else {
            None
        },
    }
}
