//! # Geo
//!
//! Point and triangle types shared by the decoder, the transforms and the
//! renderer. Mostly wraps ultraviolet types with exact, total ordering so
//! point clouds can be sorted and deduplicated.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    cmp::{Ordering, PartialEq},
    ops::{Add, Mul, Sub},
};
use ultraviolet::Vec3;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Point3d {
    pub pos: Vec3,
}

impl Point3d {
    pub fn new(x: f32, y: f32, z: f32) -> Point3d {
        Point3d {
            pos: Vec3::new(x, y, z),
        }
    }

    pub fn x(&self) -> f32 { self.pos.x }

    pub fn y(&self) -> f32 { self.pos.y }

    pub fn z(&self) -> f32 { self.pos.z }

    pub fn is_infinite(&self) -> bool { is_vec3_inf(&self.pos) }

    pub fn is_nan(&self) -> bool { is_vec3_nan(&self.pos) }

    /// Elementwise product
    pub fn mul_elem(self, other: Point3d) -> Point3d { (self.pos * other.pos).into() }

    pub fn to_tuple(self) -> (f32, f32, f32) { (self.pos.x, self.pos.y, self.pos.z) }
}

impl Add<Point3d> for Point3d {
    type Output = Point3d;

    fn add(self, other: Point3d) -> Point3d { (self.pos + other.pos).into() }
}

impl Sub<Point3d> for Point3d {
    type Output = Point3d;

    fn sub(self, other: Point3d) -> Point3d { (self.pos - other.pos).into() }
}

impl Mul<f32> for Point3d {
    type Output = Point3d;

    fn mul(self, num: f32) -> Point3d {
        Point3d::new(self.pos.x * num, self.pos.y * num, self.pos.z * num)
    }
}

impl From<Vec3> for Point3d {
    fn from(vec3: Vec3) -> Self { Point3d { pos: vec3 } }
}

impl From<(f32, f32, f32)> for Point3d {
    fn from(p: (f32, f32, f32)) -> Self { Point3d::new(p.0, p.1, p.2) }
}

/// Compare two coordinates. Numbers compare by value, so `-0.0 == 0.0`;
/// NaNs fall back to their bit pattern to keep the order total.
fn cmp_coord(lhs: f32, rhs: f32) -> Ordering {
    lhs.partial_cmp(&rhs).unwrap_or_else(|| lhs.total_cmp(&rhs))
}

impl Ord for Point3d {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_coord(self.pos.x, other.pos.x)
            .then_with(|| cmp_coord(self.pos.y, other.pos.y))
            .then_with(|| cmp_coord(self.pos.z, other.pos.z))
    }
}

impl PartialOrd for Point3d {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Eq for Point3d {}

impl PartialEq for Point3d {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

/// check if any value in point is infinite
pub fn is_vec3_inf(point: &Vec3) -> bool {
    point.x.is_infinite() || point.y.is_infinite() || point.z.is_infinite()
}

/// check if any value in point is nan
pub fn is_vec3_nan(point: &Vec3) -> bool {
    point.x.is_nan() || point.y.is_nan() || point.z.is_nan()
}

#[derive(PartialEq, Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Triangle3d {
    pub p1: Point3d,
    pub p2: Point3d,
    pub p3: Point3d,
}

impl Triangle3d {
    pub fn new(p1: (f32, f32, f32), p2: (f32, f32, f32), p3: (f32, f32, f32)) -> Triangle3d {
        Triangle3d {
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    pub fn from_points(p1: Point3d, p2: Point3d, p3: Point3d) -> Triangle3d {
        Triangle3d { p1, p2, p3 }
    }

    /// All nine coordinates, vertex by vertex
    ///
    /// # Examples
    ///
    /// ```
    /// use stl_transform::geo::Triangle3d;
    /// let tri = Triangle3d::new((0., 0., 0.), (1., 0., 0.), (0., 1., 0.));
    /// assert_eq!(tri.to_row(), [0., 0., 0., 1., 0., 0., 0., 1., 0.]);
    /// ```
    pub fn to_row(&self) -> [f32; 9] {
        [
            self.p1.pos.x,
            self.p1.pos.y,
            self.p1.pos.z,
            self.p2.pos.x,
            self.p2.pos.y,
            self.p2.pos.z,
            self.p3.pos.x,
            self.p3.pos.y,
            self.p3.pos.z,
        ]
    }

    pub fn points(&self) -> [Point3d; 3] { [self.p1, self.p2, self.p3] }
}

/// Axis aligned bounds of a point cloud
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Bounds {
    pub min: Point3d,
    pub max: Point3d,
}

impl Bounds {
    pub fn size(&self) -> Point3d { self.max - self.min }
}

/// Get bounds for a point cloud, `None` when it is empty
pub fn get_bounds(points: &[Point3d]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }
    let bounds = points.par_iter().fold(
        || Bounds {
            min: Point3d::new(f32::MAX, f32::MAX, f32::MAX),
            max: Point3d::new(f32::MIN, f32::MIN, f32::MIN),
        },
        |acc, point| Bounds {
            min: acc.min.pos.min_by_component(point.pos).into(),
            max: acc.max.pos.max_by_component(point.pos).into(),
        },
    );
    bounds.reduce_with(|lhs, rhs| Bounds {
        min: lhs.min.pos.min_by_component(rhs.min.pos).into(),
        max: lhs.max.pos.max_by_component(rhs.max.pos).into(),
    })
}

/// Sort a point cloud by x, then y, then z and drop repeated points
///
/// # Examples
///
/// ```
/// use stl_transform::geo::{dedup_points, Point3d};
/// let points = vec![
///     Point3d::new(1., 0., 0.),
///     Point3d::new(0., 1., 0.),
///     Point3d::new(1., 0., 0.),
/// ];
/// assert_eq!(dedup_points(&points), vec![Point3d::new(0., 1., 0.), Point3d::new(1., 0., 0.)]);
/// ```
pub fn dedup_points(points: &[Point3d]) -> Vec<Point3d> {
    let mut unique = points.to_vec();
    unique.par_sort_unstable();
    unique.dedup();
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        let mut points = vec![
            Point3d::new(1., 0., 0.),
            Point3d::new(0., 1., 0.),
            Point3d::new(0., 0., 5.),
            Point3d::new(0., 0., 1.),
        ];
        points.sort();
        assert_eq!(
            points,
            vec![
                Point3d::new(0., 0., 1.),
                Point3d::new(0., 0., 5.),
                Point3d::new(0., 1., 0.),
                Point3d::new(1., 0., 0.),
            ]
        );
    }

    #[test]
    fn equality_is_exact() {
        let a = Point3d::new(1., 2., 3.);
        let b = Point3d::new(1. + f32::EPSILON, 2., 3.);
        assert_ne!(a, b);
        assert_eq!(Point3d::new(-0., 0., 0.), Point3d::new(0., 0., 0.));
    }

    #[test]
    fn nan_points_still_sort() {
        let mut points = vec![
            Point3d::new(f32::NAN, 0., 0.),
            Point3d::new(1., 0., 0.),
            Point3d::new(f32::NAN, 0., 0.),
        ];
        points.sort();
        points.dedup();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Point3d::new(1., 0., 0.));
        assert!(points[1].is_nan());
    }

    #[test]
    fn tuple_conversions() {
        let p = Point3d::from((1., -2., 3.5));
        assert_eq!(p, Point3d::new(1., -2., 3.5));
        assert_eq!(p.to_tuple(), (1., -2., 3.5));
        assert_eq!(Point3d::from(Vec3::new(0., 1., 2.)), Point3d::new(0., 1., 2.));
    }

    #[test]
    fn dedup_is_idempotent() {
        let points: Vec<Point3d> = (0..100)
            .map(|i| Point3d::new((i % 7) as f32, (i % 3) as f32, 0.))
            .collect();
        let once = dedup_points(&points);
        let twice = dedup_points(&once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 21);
        assert!(once.len() <= points.len());
        assert!(once.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn dedup_of_empty_cloud() {
        assert!(dedup_points(&[]).is_empty());
    }

    #[test]
    fn bounds() {
        assert_eq!(get_bounds(&[]), None);
        let points = vec![
            Point3d::new(-1., 4., 0.),
            Point3d::new(2., -3., 1.),
            Point3d::new(0., 0., -7.),
        ];
        let bounds = get_bounds(&points).unwrap();
        assert_eq!(bounds.min, Point3d::new(-1., -3., -7.));
        assert_eq!(bounds.max, Point3d::new(2., 4., 1.));
        assert_eq!(bounds.size(), Point3d::new(3., 7., 8.));
    }
}
