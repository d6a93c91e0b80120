//! # stl_transform
//!
//! Read the points out of binary STL files and move them around: rotate,
//! translate and scale point clouds, then plot them.
//!
//! ```no_run
//! use stl_transform::{
//!     render::{ColorMap, PointSink, SvgRenderer},
//!     stl::{decode, DecodeOptions},
//!     transform::{rotate, translate, RotationOrder},
//! };
//!
//! let points = decode("model.stl", &DecodeOptions::default())?.geometry.into_points();
//! let points = translate(&points, 0., 0., -10.);
//! let points = rotate(&points, 90., 0., 0., true, RotationOrder::Xyz);
//! SvgRenderer::default().render(&points, Some(ColorMap::Viridis), "model.svg".as_ref())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod geo;
pub mod render;
pub mod stl;
pub mod stone;
pub mod transform;

#[cfg(feature = "python")]
pub mod python;
