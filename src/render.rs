//! # Render
//!
//! Hand point clouds to something that turns them into an image. The crate
//! only ships a vector stand-in: an SVG scatter plot seen from above, with no
//! perspective. Raster output (PNG or similar) belongs in another `PointSink`.

use crate::geo::{get_bounds, Point3d};
use clap::arg_enum;
use float_cmp::approx_eq;
use log::info;
use simplesvg::{Attr, Color, Fig, Svg};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error types for rendering point clouds
pub enum RenderError {
    #[error("canvas must be at least 1x1 pixels")]
    EmptyCanvas,
    #[error("Couldn't write image: {0}")]
    Io(#[from] std::io::Error),
}

arg_enum! {
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum ColorMap {
        Rainbow,
        Viridis,
        Gray
    }
}

const RAINBOW: [(u8, u8, u8); 5] = [
    (128, 0, 255),
    (0, 181, 235),
    (128, 255, 180),
    (255, 181, 98),
    (255, 0, 0),
];
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];
const GRAY: [(u8, u8, u8); 2] = [(0, 0, 0), (255, 255, 255)];
const DEFAULT_COLOR: (u8, u8, u8) = (31, 119, 180);

impl ColorMap {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorMap::Rainbow => &RAINBOW,
            ColorMap::Viridis => &VIRIDIS,
            ColorMap::Gray => &GRAY,
        }
    }

    /// Colour for `t` in `[0, 1]`, values outside are clamped
    ///
    /// # Examples
    ///
    /// ```
    /// use stl_transform::render::ColorMap;
    /// assert_eq!(ColorMap::Gray.color(0.), (0, 0, 0));
    /// assert_eq!(ColorMap::Gray.color(1.), (255, 255, 255));
    /// ```
    pub fn color(self, t: f32) -> (u8, u8, u8) {
        let stops = self.stops();
        let t = if t.is_nan() { 0. } else { t.max(0.).min(1.) };
        let scaled = t * (stops.len() - 1) as f32;
        let index = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - index as f32;
        let (a, b) = (stops[index], stops[index + 1]);
        let lerp = |a: u8, b: u8| {
            let (a, b) = (f32::from(a), f32::from(b));
            (a + (b - a) * frac).round() as u8
        };
        (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

/// Anything that can turn a point cloud into an image
///
/// Implementations must accept empty clouds and leave the points untouched.
pub trait PointSink {
    fn render(
        &self,
        points: &[Point3d],
        color_map: Option<ColorMap>,
        path: &Path,
    ) -> Result<(), RenderError>;
}

/// Top down scatter plot written as SVG
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
    pub radius: f32,
    pub margin: f32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer {
            width: 800,
            height: 800,
            radius: 2.,
            margin: 10.,
        }
    }
}

/// Map `value` from `[min, max]` to `[0, 1]`, a flat range maps to the middle
fn normalize(value: f32, min: f32, max: f32) -> f32 {
    if approx_eq!(f32, min, max, ulps = 2) {
        0.5
    } else {
        (value - min) / (max - min)
    }
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> SvgRenderer {
        SvgRenderer {
            width,
            height,
            ..SvgRenderer::default()
        }
    }

    /// Build the SVG document without touching the filesystem
    pub fn to_svg(
        &self,
        points: &[Point3d],
        color_map: Option<ColorMap>,
    ) -> Result<String, RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyCanvas);
        }
        let bounds = match get_bounds(points) {
            Some(bounds) => bounds,
            None => return Ok(Svg(Vec::new(), self.width, self.height).to_string()),
        };

        let size = bounds.size();
        let usable_w = (self.width as f32 - 2. * self.margin).max(1.);
        let usable_h = (self.height as f32 - 2. * self.margin).max(1.);
        let span_x = if approx_eq!(f32, size.x(), 0., ulps = 2) { 1. } else { size.x() };
        let span_y = if approx_eq!(f32, size.y(), 0., ulps = 2) { 1. } else { size.y() };
        let factor = (usable_w / span_x).min(usable_h / span_y);
        // centre the cloud on the canvas
        let offset_x = self.margin + (usable_w - size.x() * factor) / 2.;
        let offset_y = self.margin + (usable_h - size.y() * factor) / 2.;

        let (min_c, max_c) = points
            .iter()
            .map(|p| p.x() * p.y())
            .fold((f32::MAX, f32::MIN), |(lo, hi), c| (lo.min(c), hi.max(c)));

        // painter's order, highest points end up on top
        let mut order: Vec<&Point3d> = points.iter().collect();
        order.sort_by(|a, b| a.z().total_cmp(&b.z()));

        let figs = order
            .into_iter()
            .map(|p| {
                let cx = offset_x + (p.x() - bounds.min.x()) * factor;
                // svg y grows downwards
                let cy = self.height as f32 - (offset_y + (p.y() - bounds.min.y()) * factor);
                let (r, g, b) = match color_map {
                    Some(map) => map.color(normalize(p.x() * p.y(), min_c, max_c)),
                    None => DEFAULT_COLOR,
                };
                Fig::Circle(cx, cy, self.radius).styled(Attr::default().fill(Color(r, g, b)))
            })
            .collect();

        Ok(Svg(figs, self.width, self.height).to_string())
    }
}

impl PointSink for SvgRenderer {
    fn render(
        &self,
        points: &[Point3d],
        color_map: Option<ColorMap>,
        path: &Path,
    ) -> Result<(), RenderError> {
        let svg = self.to_svg(points, color_map)?;
        std::fs::write(path, svg)?;
        info!("rendered {} points to {}", points.len(), path.display());
        Ok(())
    }
}
