//! # Transform
//!
//! Rotation, translation and scaling of point clouds. Every operation takes a
//! slice and returns a new vector with the same row order, so they chain by
//! feeding one result into the next call.

use crate::geo::Point3d;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};
use thiserror::Error;
use ultraviolet::{Mat3, Vec3};

#[derive(Error, Debug)]
/// Error types for building transforms
pub enum TransformError {
    #[error("unknown rotation order {0:?}, expected one of xyz, xzy, yzx, yxz, zxy, zyx")]
    InvalidOrder(String),
    #[error("Couldn't read pipeline file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing pipeline file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Order in which the per axis rotations are applied. `Xyz` rotates around x
/// first, then y, then z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationOrder {
    Xyz,
    Xzy,
    Yzx,
    Yxz,
    Zxy,
    Zyx,
}

impl RotationOrder {
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::Xyz,
        RotationOrder::Xzy,
        RotationOrder::Yzx,
        RotationOrder::Yxz,
        RotationOrder::Zxy,
        RotationOrder::Zyx,
    ];

    /// Names accepted by `from_str`
    pub fn variants() -> [&'static str; 6] { ["xyz", "xzy", "yzx", "yxz", "zxy", "zyx"] }

    pub fn name(self) -> &'static str {
        match self {
            RotationOrder::Xyz => "xyz",
            RotationOrder::Xzy => "xzy",
            RotationOrder::Yzx => "yzx",
            RotationOrder::Yxz => "yxz",
            RotationOrder::Zxy => "zxy",
            RotationOrder::Zyx => "zyx",
        }
    }
}

impl Default for RotationOrder {
    fn default() -> Self { RotationOrder::Xyz }
}

impl fmt::Display for RotationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for RotationOrder {
    type Err = TransformError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let lower = src.to_ascii_lowercase();
        RotationOrder::ALL
            .iter()
            .copied()
            .find(|order| order.name() == lower)
            .ok_or_else(|| TransformError::InvalidOrder(src.to_string()))
    }
}

// ultraviolet matrices multiply column vectors, so each rotation is built
// from the rows of its row vector form, which stores it transposed.

fn x_rotation(angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(
        Vec3::new(1., 0., 0.),
        Vec3::new(0., c, -s),
        Vec3::new(0., s, c),
    )
}

fn y_rotation(angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(
        Vec3::new(c, 0., s),
        Vec3::new(0., 1., 0.),
        Vec3::new(-s, 0., c),
    )
}

fn z_rotation(angle: f32) -> Mat3 {
    let (s, c) = angle.sin_cos();
    Mat3::new(
        Vec3::new(c, -s, 0.),
        Vec3::new(s, c, 0.),
        Vec3::new(0., 0., 1.),
    )
}

/// Combined rotation for angles in radians, ready to multiply column vectors
///
/// For a point written as a row vector `p`, the result equals `p * M1 * M2 * M3`
/// with the per axis matrices in the order `order` names them.
pub fn rotation_matrix(x_angle: f32, y_angle: f32, z_angle: f32, order: RotationOrder) -> Mat3 {
    let x = x_rotation(x_angle);
    let y = y_rotation(y_angle);
    let z = z_rotation(z_angle);
    // (p * A * B * C)^T = C^T * B^T * A^T * p^T
    match order {
        RotationOrder::Xyz => z * y * x,
        RotationOrder::Xzy => y * z * x,
        RotationOrder::Yzx => x * z * y,
        RotationOrder::Yxz => z * x * y,
        RotationOrder::Zxy => y * x * z,
        RotationOrder::Zyx => x * y * z,
    }
}

/// Rotate points around the origin
///
/// All zero angles return an exact copy.
///
/// # Examples
///
/// ```
/// use stl_transform::{geo::Point3d, transform::{rotate, RotationOrder}};
/// let points = vec![Point3d::new(1., 0., 0.)];
/// let rotated = rotate(&points, 0., 0., 180., true, RotationOrder::Xyz);
/// assert!((rotated[0].x() + 1.).abs() < 1e-6);
/// assert!(rotated[0].y().abs() < 1e-6);
/// ```
pub fn rotate(
    points: &[Point3d],
    x_angle: f32,
    y_angle: f32,
    z_angle: f32,
    degrees: bool,
    order: RotationOrder,
) -> Vec<Point3d> {
    if x_angle == 0. && y_angle == 0. && z_angle == 0. {
        return points.to_vec();
    }

    let (x_angle, y_angle, z_angle) = if degrees {
        (x_angle.to_radians(), y_angle.to_radians(), z_angle.to_radians())
    } else {
        (x_angle, y_angle, z_angle)
    };
    debug!(
        "rotating {} points by ({}, {}, {}) rad, order {}",
        points.len(),
        x_angle,
        y_angle,
        z_angle,
        order
    );

    let matrix = rotation_matrix(x_angle, y_angle, z_angle, order);
    points.par_iter().map(|point| (matrix * point.pos).into()).collect()
}

/// Move every point by the same offset
///
/// # Examples
///
/// ```
/// use stl_transform::{geo::Point3d, transform::translate};
/// let moved = translate(&[Point3d::new(1., 1., 1.)], 1., 0., -1.);
/// assert_eq!(moved, vec![Point3d::new(2., 1., 0.)]);
/// ```
pub fn translate(points: &[Point3d], dx: f32, dy: f32, dz: f32) -> Vec<Point3d> {
    if dx == 0. && dy == 0. && dz == 0. {
        return points.to_vec();
    }

    let offset = Point3d::new(dx, dy, dz);
    points.par_iter().map(|&point| point + offset).collect()
}

/// Scale points away from the origin
///
/// With `conservative` set, `sx` is used on every axis and the shape keeps
/// its proportions.
pub fn scale(points: &[Point3d], sx: f32, sy: f32, sz: f32, conservative: bool) -> Vec<Point3d> {
    let factor = if conservative {
        Point3d::new(sx, sx, sx)
    } else {
        Point3d::new(sx, sy, sz)
    };
    points.par_iter().map(|&point| point.mul_elem(factor)).collect()
}

fn one() -> f32 { 1. }

/// A single step of a pipeline
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Transform {
    Rotate {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
        #[serde(default)]
        degrees: bool,
        #[serde(default)]
        order: RotationOrder,
    },
    Translate {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
        #[serde(default)]
        z: f32,
    },
    Scale {
        #[serde(default = "one")]
        x: f32,
        #[serde(default = "one")]
        y: f32,
        #[serde(default = "one")]
        z: f32,
        #[serde(default)]
        conservative: bool,
    },
}

impl Transform {
    pub fn apply(&self, points: &[Point3d]) -> Vec<Point3d> {
        match *self {
            Transform::Rotate {
                x,
                y,
                z,
                degrees,
                order,
            } => rotate(points, x, y, z, degrees, order),
            Transform::Translate { x, y, z } => translate(points, x, y, z),
            Transform::Scale { x, y, z, conservative } => scale(points, x, y, z, conservative),
        }
    }
}

/// Ordered list of transforms, applied first to last
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipeline {
    pub steps: Vec<Transform>,
}

impl Pipeline {
    pub fn new() -> Pipeline { Pipeline::default() }

    /// Load steps from a JSON array such as
    /// `[{"op": "translate", "x": 1.0}, {"op": "rotate", "z": 90, "degrees": true}]`
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Pipeline, TransformError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn then(mut self, step: Transform) -> Pipeline {
        self.steps.push(step);
        self
    }

    pub fn rotate(self, x: f32, y: f32, z: f32, degrees: bool, order: RotationOrder) -> Pipeline {
        self.then(Transform::Rotate {
            x,
            y,
            z,
            degrees,
            order,
        })
    }

    pub fn translate(self, x: f32, y: f32, z: f32) -> Pipeline {
        self.then(Transform::Translate { x, y, z })
    }

    pub fn scale(self, x: f32, y: f32, z: f32, conservative: bool) -> Pipeline {
        self.then(Transform::Scale { x, y, z, conservative })
    }

    pub fn extend(mut self, other: Pipeline) -> Pipeline {
        self.steps.extend(other.steps);
        self
    }

    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    pub fn apply(&self, points: &[Point3d]) -> Vec<Point3d> {
        self.steps
            .iter()
            .fold(points.to_vec(), |acc, step| step.apply(&acc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::f32::consts::PI;

    fn cloud() -> Vec<Point3d> {
        vec![
            Point3d::new(1., 2., 3.),
            Point3d::new(-4., 0.5, 2.),
            Point3d::new(0., 0., 0.),
            Point3d::new(10., -7., 0.25),
        ]
    }

    fn assert_close(lhs: &[Point3d], rhs: &[Point3d]) {
        assert_eq!(lhs.len(), rhs.len());
        for (l, r) in lhs.iter().zip(rhs) {
            assert!(
                approx_eq!(f32, l.x(), r.x(), epsilon = 1e-4)
                    && approx_eq!(f32, l.y(), r.y(), epsilon = 1e-4)
                    && approx_eq!(f32, l.z(), r.z(), epsilon = 1e-4),
                "{:?} != {:?}",
                l,
                r
            );
        }
    }

    #[test]
    fn zero_rotation_is_exact() {
        let points = cloud();
        for order in RotationOrder::ALL.iter() {
            assert_eq!(rotate(&points, 0., 0., 0., true, *order), points);
        }
    }

    #[test]
    fn full_turn_returns_to_start() {
        let points = cloud();
        assert_close(&rotate(&points, 360., 360., 360., true, RotationOrder::Xyz), &points);
        assert_close(&rotate(&points, 2. * PI, 0., 2. * PI, false, RotationOrder::Zyx), &points);
    }

    #[test]
    fn single_axis_rotations() {
        let p = [Point3d::new(1., 2., 3.)];
        let xyz = RotationOrder::Xyz;
        assert_close(&rotate(&p, 90., 0., 0., true, xyz), &[Point3d::new(1., 3., -2.)]);
        assert_close(&rotate(&p, 0., 90., 0., true, xyz), &[Point3d::new(-3., 2., 1.)]);
        assert_close(&rotate(&p, 0., 0., 90., true, xyz), &[Point3d::new(2., -1., 3.)]);
    }

    #[test]
    fn order_matters() {
        let p = [Point3d::new(1., 2., 3.)];
        let xyz = rotate(&p, 90., 90., 0., true, RotationOrder::Xyz);
        let yzx = rotate(&p, 90., 90., 0., true, RotationOrder::Yzx);
        assert_close(&xyz, &[Point3d::new(2., 3., 1.)]);
        assert_close(&yzx, &[Point3d::new(-3., 1., -2.)]);
        assert_ne!(xyz, yzx);
    }

    #[test]
    fn orders_match_chained_single_axis_rotations() {
        let points = cloud();
        let (a, b, c) = (0.3, -1.1, 2.4);
        let by_axis = |axis: char, pts: &[Point3d]| match axis {
            'x' => rotate(pts, a, 0., 0., false, RotationOrder::Xyz),
            'y' => rotate(pts, 0., b, 0., false, RotationOrder::Xyz),
            _ => rotate(pts, 0., 0., c, false, RotationOrder::Xyz),
        };
        for order in RotationOrder::ALL.iter() {
            let chained = order
                .name()
                .chars()
                .fold(points.clone(), |acc, axis| by_axis(axis, &acc));
            assert_close(&rotate(&points, a, b, c, false, *order), &chained);
        }
    }

    #[test]
    fn rotation_preserves_length() {
        let points = cloud();
        let rotated = rotate(&points, 0.7, 1.3, -2.9, false, RotationOrder::Zxy);
        for (before, after) in points.iter().zip(&rotated) {
            assert!(approx_eq!(f32, before.pos.mag(), after.pos.mag(), epsilon = 1e-4));
        }
    }

    #[test]
    fn parse_orders() {
        assert_eq!("xyz".parse::<RotationOrder>().unwrap(), RotationOrder::Xyz);
        assert_eq!("ZYX".parse::<RotationOrder>().unwrap(), RotationOrder::Zyx);
        for name in RotationOrder::variants().iter() {
            assert_eq!(name.parse::<RotationOrder>().unwrap().name(), *name);
        }
        match "xxy".parse::<RotationOrder>() {
            Err(TransformError::InvalidOrder(order)) => assert_eq!(order, "xxy"),
            other => panic!("expected InvalidOrder, got {:?}", other),
        }
    }

    #[test]
    fn translate_round_trip() {
        let points = cloud();
        let moved = translate(&points, 1.5, -2., 100.);
        assert_eq!(moved[2], Point3d::new(1.5, -2., 100.));
        assert_close(&translate(&moved, -1.5, 2., -100.), &points);
        assert_eq!(translate(&points, 0., 0., 0.), points);
    }

    #[test]
    fn conservative_scale_uses_x_everywhere() {
        let points = cloud();
        let scaled = scale(&points, 2., 5., 7., true);
        for (before, after) in points.iter().zip(&scaled) {
            assert_eq!(*after, *before * 2.);
        }
    }

    #[test]
    fn elementwise_scale() {
        let points = cloud();
        assert_eq!(scale(&points, 1., 1., 1., false), points);
        let scaled = scale(&points, 2., 0.5, -1., false);
        assert_eq!(scaled[0], Point3d::new(2., 1., -3.));
    }

    #[test]
    fn non_finite_values_propagate() {
        let points = vec![Point3d::new(f32::INFINITY, 0., 1.)];
        assert!(translate(&points, 1., 1., 1.)[0].is_infinite());
        assert!(rotate(&points, 0., 0., 1., false, RotationOrder::Xyz)[0].is_nan());
    }

    #[test]
    fn empty_cloud() {
        assert!(rotate(&[], 1., 2., 3., false, RotationOrder::Yxz).is_empty());
        assert!(translate(&[], 1., 2., 3.).is_empty());
        assert!(scale(&[], 1., 2., 3., false).is_empty());
    }

    #[test]
    fn pipeline_applies_in_order() {
        let points = vec![Point3d::new(1., 0., 0.)];
        let pipeline = Pipeline::new()
            .translate(1., 0., 0.)
            .scale(3., 1., 1., true)
            .rotate(0., 0., 90., true, RotationOrder::Xyz);
        assert_close(&pipeline.apply(&points), &[Point3d::new(0., -6., 0.)]);
        assert_eq!(Pipeline::new().apply(&points), points);
    }

    #[test]
    fn pipeline_from_json() {
        let json = r#"[
            {"op": "translate", "x": 1.0},
            {"op": "scale", "x": 2.0, "conservative": true},
            {"op": "rotate", "z": 90, "degrees": true, "order": "zyx"}
        ]"#;
        let pipeline: Pipeline = serde_json::from_str(json).unwrap();
        assert_eq!(
            pipeline.steps[1],
            Transform::Scale {
                x: 2.,
                y: 1.,
                z: 1.,
                conservative: true
            }
        );
        assert_eq!(
            pipeline.steps[2],
            Transform::Rotate {
                x: 0.,
                y: 0.,
                z: 90.,
                degrees: true,
                order: RotationOrder::Zyx
            }
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, json).unwrap();
        assert_eq!(Pipeline::from_json_file(&path).unwrap(), pipeline);

        let bad: Result<Pipeline, _> =
            serde_json::from_str(r#"[{"op": "rotate", "order": "abc"}]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn pipeline_file_errors_name_the_cause() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Pipeline::from_json_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, TransformError::Io(_)));
        let io_cause = std::io::Error::from(std::io::ErrorKind::NotFound).to_string();
        assert!(missing.to_string().starts_with("Couldn't read pipeline file: "));
        assert!(missing.to_string().contains(&io_cause), "{}", missing);

        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"[{"op": "shear"}]"#).unwrap();
        let broken = Pipeline::from_json_file(&path).unwrap_err();
        assert!(matches!(broken, TransformError::Json(_)));
        assert!(broken.to_string().starts_with("Error parsing pipeline file: "));
        assert!(broken.to_string().contains("shear"), "{}", broken);
    }
}
