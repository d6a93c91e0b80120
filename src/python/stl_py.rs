use crate::{
    python::{to_tuples, PointTuple},
    stl::{decode, DecodeOptions, Geometry, StlError},
};
use pyo3::{
    exceptions::{PyFileNotFoundError, PyIOError, PyValueError},
    prelude::*,
};

impl From<StlError> for PyErr {
    fn from(err: StlError) -> Self {
        match err {
            StlError::NotFound(_) => PyFileNotFoundError::new_err(err.to_string()),
            StlError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Decoded STL data, fields left as `None` unless requested
#[pyclass]
pub struct DecodeResultPy {
    #[pyo3(get)]
    points: Option<Vec<PointTuple>>,
    #[pyo3(get)]
    triangles: Option<Vec<Vec<f32>>>,
    #[pyo3(get)]
    normals: Option<Vec<PointTuple>>,
    #[pyo3(get)]
    number_of_triangles: Option<u32>,
}

pub(crate) fn read_stl(
    file: &str,
    unique: bool,
    return_triangles: bool,
    return_normals: bool,
    return_number_of_triangles: bool,
) -> PyResult<DecodeResultPy> {
    let options = DecodeOptions {
        unique,
        return_triangles,
        return_normals,
        return_number_of_triangles,
    };
    let result = decode(file, &options)?;
    let (points, triangles) = match result.geometry {
        Geometry::Points(points) => (Some(to_tuples(&points)), None),
        Geometry::Triangles(tris) => {
            let rows = tris.iter().map(|t| t.to_row().to_vec()).collect();
            (None, Some(rows))
        },
    };
    Ok(DecodeResultPy {
        points,
        triangles,
        normals: result.normals.as_deref().map(to_tuples),
        number_of_triangles: result.triangle_count,
    })
}
