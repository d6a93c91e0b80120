use crate::{
    python::{from_tuples, to_tuples, PointTuple},
    stone::generate_stone,
    transform::{rotate, scale, translate, RotationOrder, TransformError},
};
use pyo3::{
    exceptions::{PyIOError, PyValueError},
    prelude::*,
};

impl From<TransformError> for PyErr {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

pub(crate) fn rotate_points(
    points: Vec<PointTuple>,
    x_angle: f32,
    y_angle: f32,
    z_angle: f32,
    degrees: bool,
    order: &str,
) -> PyResult<Vec<PointTuple>> {
    let order: RotationOrder = order.parse()?;
    let points = from_tuples(points);
    Ok(to_tuples(&rotate(&points, x_angle, y_angle, z_angle, degrees, order)))
}

pub(crate) fn translate_points(points: Vec<PointTuple>, x: f32, y: f32, z: f32) -> Vec<PointTuple> {
    to_tuples(&translate(&from_tuples(points), x, y, z))
}

pub(crate) fn scale_points(
    points: Vec<PointTuple>,
    x: f32,
    y: f32,
    z: f32,
    conservative: bool,
) -> Vec<PointTuple> {
    to_tuples(&scale(&from_tuples(points), x, y, z, conservative))
}

pub(crate) fn generate_stone_points(
    x_radius: f32,
    y_radius: f32,
    z_radius: f32,
    res: usize,
) -> Vec<PointTuple> {
    to_tuples(&generate_stone(x_radius, y_radius, z_radius, res))
}
