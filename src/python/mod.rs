//! Python bindings, built with `--features python`
//!
//! Everything lives directly on the `stl_transform` module. Points cross the
//! boundary as lists of `(x, y, z)` tuples.

mod stl_py;
mod transform_py;

use crate::geo::Point3d;
use pyo3::prelude::*;
pub use stl_py::DecodeResultPy;

pub(crate) type PointTuple = (f32, f32, f32);

pub(crate) fn to_tuples(points: &[Point3d]) -> Vec<PointTuple> {
    points.iter().map(|p| p.to_tuple()).collect()
}

pub(crate) fn from_tuples(points: Vec<PointTuple>) -> Vec<Point3d> {
    points.into_iter().map(Point3d::from).collect()
}

#[pymodule]
pub fn stl_transform(_py: Python, m: &PyModule) -> PyResult<()> {
    #[pyfn(
        m,
        "read_stl",
        unique = "true",
        return_triangles = "false",
        return_normals = "false",
        return_number_of_triangles = "false"
    )]
    fn read_stl_py(
        _py: Python,
        file: &str,
        unique: bool,
        return_triangles: bool,
        return_normals: bool,
        return_number_of_triangles: bool,
    ) -> PyResult<DecodeResultPy> {
        stl_py::read_stl(file, unique, return_triangles, return_normals, return_number_of_triangles)
    }

    #[pyfn(
        m,
        "rotate_points",
        x_angle = "0.0",
        y_angle = "0.0",
        z_angle = "0.0",
        degrees = "false",
        order = "\"xyz\""
    )]
    fn rotate_points_py(
        _py: Python,
        points: Vec<PointTuple>,
        x_angle: f32,
        y_angle: f32,
        z_angle: f32,
        degrees: bool,
        order: &str,
    ) -> PyResult<Vec<PointTuple>> {
        transform_py::rotate_points(points, x_angle, y_angle, z_angle, degrees, order)
    }

    #[pyfn(m, "translate_points", x = "0.0", y = "0.0", z = "0.0")]
    fn translate_points_py(
        _py: Python,
        points: Vec<PointTuple>,
        x: f32,
        y: f32,
        z: f32,
    ) -> Vec<PointTuple> {
        transform_py::translate_points(points, x, y, z)
    }

    #[pyfn(m, "scale_points", x = "1.0", y = "1.0", z = "1.0", conservative = "false")]
    fn scale_points_py(
        _py: Python,
        points: Vec<PointTuple>,
        x: f32,
        y: f32,
        z: f32,
        conservative: bool,
    ) -> Vec<PointTuple> {
        transform_py::scale_points(points, x, y, z, conservative)
    }

    #[pyfn(
        m,
        "generate_stone",
        x_radius = "50.0",
        y_radius = "50.0",
        z_radius = "50.0",
        res = "101"
    )]
    fn generate_stone_py(
        _py: Python,
        x_radius: f32,
        y_radius: f32,
        z_radius: f32,
        res: usize,
    ) -> Vec<PointTuple> {
        transform_py::generate_stone_points(x_radius, y_radius, z_radius, res)
    }

    m.add_class::<DecodeResultPy>()?;
    Ok(())
}
