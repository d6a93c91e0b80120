//! Synthetic test cloud: the upper half of an ellipsoid sampled on a regular
//! grid, flattened to `z = 0` outside the ellipse.

use crate::geo::Point3d;
use rayon::prelude::*;

/// `res` evenly spaced values from `-radius` to `radius`, both included
fn linspace(radius: f32, res: usize) -> Vec<f32> {
    let step = 2. * radius / (res - 1) as f32;
    (0..res)
        .map(|i| if i == res - 1 { radius } else { -radius + step * i as f32 })
        .collect()
}

/// Height of the ellipsoid above `(x, y)`, 0 outside its footprint
fn height(x: f32, y: f32, x_radius: f32, y_radius: f32, z_radius: f32) -> f32 {
    let inside = 1. - x.powi(2) / x_radius.powi(2) - y.powi(2) / y_radius.powi(2);
    let z = (z_radius.powi(2) * inside).sqrt();
    if z.is_nan() {
        0.
    } else {
        z
    }
}

/// Generate a `res * res` point grid over a half ellipsoid
///
/// Rows follow y from `-y_radius` to `y_radius`, x varies within a row, and
/// every point is `(x, y, z)`. Older point dumps of this shape stored the
/// grid transposed, as `(y, x, z)`; for the same radii those list the same
/// surface in a different order, and for unequal radii the footprint is
/// mirrored across `x = y`. Fewer than two samples per axis can't span the
/// radius, so `res < 2` returns an empty cloud.
///
/// # Examples
///
/// ```
/// use stl_transform::stone::generate_stone;
/// let stone = generate_stone(50., 50., 50., 101);
/// assert_eq!(stone.len(), 101 * 101);
/// assert_eq!(stone[50 * 101 + 50].z(), 50.);
/// ```
pub fn generate_stone(x_radius: f32, y_radius: f32, z_radius: f32, res: usize) -> Vec<Point3d> {
    if res < 2 {
        return Vec::new();
    }
    let xs = linspace(x_radius, res);
    let ys = linspace(y_radius, res);
    ys.par_iter()
        .flat_map_iter(|&y| {
            xs.iter()
                .map(move |&x| Point3d::new(x, y, height(x, y, x_radius, y_radius, z_radius)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_layout() {
        let stone = generate_stone(2., 4., 1., 3);
        let expected = vec![
            Point3d::new(-2., -4., 0.),
            Point3d::new(0., -4., 0.),
            Point3d::new(2., -4., 0.),
            Point3d::new(-2., 0., 0.),
            Point3d::new(0., 0., 1.),
            Point3d::new(2., 0., 0.),
            Point3d::new(-2., 4., 0.),
            Point3d::new(0., 4., 0.),
            Point3d::new(2., 4., 0.),
        ];
        assert_eq!(stone, expected);
    }

    #[test]
    fn corners_are_flattened() {
        let stone = generate_stone(10., 10., 5., 21);
        assert!(stone.iter().all(|p| !p.is_nan()));
        assert_eq!(stone[0].z(), 0.);
        assert!(stone.iter().all(|p| p.z() >= 0. && p.z() <= 5.));
    }

    #[test]
    fn points_lie_on_the_ellipsoid() {
        let (a, b, c) = (3., 5., 2.);
        for p in generate_stone(a, b, c, 31).iter().filter(|p| p.z() > 0.) {
            let r = (p.x() / a).powi(2) + (p.y() / b).powi(2) + (p.z() / c).powi(2);
            assert!((r - 1.).abs() < 1e-4, "{:?} is off the surface", p);
        }
    }

    #[test]
    fn unequal_radii_keep_x_first() {
        let stone = generate_stone(10., 1., 1., 5);
        // first row is y = -1 with x sweeping the long axis
        let row: Vec<f32> = stone[..5].iter().map(|p| p.x()).collect();
        assert_eq!(row, vec![-10., -5., 0., 5., 10.]);
        assert!(stone[..5].iter().all(|p| p.y() == -1.));
        assert_eq!(stone[12], Point3d::new(0., 0., 1.));
    }

    #[test]
    fn degenerate_resolution() {
        assert!(generate_stone(1., 1., 1., 0).is_empty());
        assert!(generate_stone(1., 1., 1., 1).is_empty());
    }
}
