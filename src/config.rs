use crate::{
    render::{ColorMap, SvgRenderer},
    stl::DecodeOptions,
    transform::{Pipeline, RotationOrder, TransformError},
};
use std::path::PathBuf;
use structopt::StructOpt;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error types for command line options
pub enum ConfigError {
    #[error("radius must be greater than 0")]
    Radius,
    #[error("resolution must be at least 2")]
    Resolution,
    #[error("image size must be between 16 and 8192")]
    ImageSize,
    #[error("Not a decimal number")]
    ParseFloat(#[from] std::num::ParseFloatError),
    #[error("Not a whole number")]
    ParseInt(#[from] std::num::ParseIntError),
    #[error("Error parsing config")]
    Clap(#[from] clap::Error),
}

fn parse_radius(src: &str) -> Result<f32, ConfigError> {
    let radius = src.parse::<f32>()?;
    if radius.is_finite() && radius > 0. {
        Ok(radius)
    } else {
        Err(ConfigError::Radius)
    }
}

fn parse_resolution(src: &str) -> Result<usize, ConfigError> {
    let res = src.parse::<usize>()?;
    if res < 2 {
        Err(ConfigError::Resolution)
    } else {
        Ok(res)
    }
}

fn parse_image_size(src: &str) -> Result<u32, ConfigError> {
    let size = src.parse::<u32>()?;
    if size < 16 || size > 8192 {
        Err(ConfigError::ImageSize)
    } else {
        Ok(size)
    }
}

// set up program arguments
#[derive(Debug, StructOpt)]
#[structopt(name = "stl_transform")]
pub struct Opt {
    /// Log layout details while working
    #[structopt(long)]
    pub debug: bool,

    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Extract points from a binary STL, transform them and plot them
    Points(PointsOpt),
    /// Generate a half ellipsoid point grid and plot it
    Stone(StoneOpt),
}

#[derive(Debug, StructOpt)]
pub struct OutputOpt {
    /// SVG image to write
    #[structopt(short, long, parse(from_os_str))]
    pub output: PathBuf,

    /// Also dump the final points as JSON
    #[structopt(long, parse(from_os_str))]
    pub json: Option<PathBuf>,

    #[structopt(long, possible_values = &ColorMap::variants(), case_insensitive = true)]
    pub color_map: Option<ColorMap>,

    #[structopt(long, default_value = "800", parse(try_from_str = parse_image_size))]
    pub width: u32,

    #[structopt(long, default_value = "800", parse(try_from_str = parse_image_size))]
    pub height: u32,
}

impl OutputOpt {
    pub fn renderer(&self) -> SvgRenderer { SvgRenderer::new(self.width, self.height) }
}

#[derive(Debug, StructOpt)]
pub struct PointsOpt {
    #[structopt(short, long, parse(from_os_str))]
    pub input: PathBuf,

    #[structopt(flatten)]
    pub output: OutputOpt,

    /// Keep every vertex instead of the sorted unique set
    #[structopt(long)]
    pub keep_duplicates: bool,

    /// Plot the triangle vertices in winding order
    #[structopt(long)]
    pub triangles: bool,

    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub rotate_x: f32,

    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub rotate_y: f32,

    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub rotate_z: f32,

    /// Rotation angles are in degrees
    #[structopt(long)]
    pub degrees: bool,

    #[structopt(
        long,
        default_value = "xyz",
        possible_values = &RotationOrder::variants(),
        case_insensitive = true
    )]
    pub order: RotationOrder,

    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub translate_x: f32,

    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub translate_y: f32,

    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    pub translate_z: f32,

    #[structopt(long, default_value = "1", allow_hyphen_values = true)]
    pub scale_x: f32,

    #[structopt(long, default_value = "1", allow_hyphen_values = true)]
    pub scale_y: f32,

    #[structopt(long, default_value = "1", allow_hyphen_values = true)]
    pub scale_z: f32,

    /// Scale every axis by --scale-x
    #[structopt(long)]
    pub conservative: bool,

    /// JSON list of extra transforms, applied after the ones above
    #[structopt(long, parse(from_os_str))]
    pub pipeline: Option<PathBuf>,
}

impl PointsOpt {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            unique: !self.keep_duplicates,
            return_triangles: self.triangles,
            return_normals: false,
            return_number_of_triangles: true,
        }
    }

    /// Translate, then scale, then rotate, then whatever the pipeline file holds
    pub fn pipeline(&self) -> Result<Pipeline, TransformError> {
        let pipeline = Pipeline::new()
            .translate(self.translate_x, self.translate_y, self.translate_z)
            .scale(self.scale_x, self.scale_y, self.scale_z, self.conservative)
            .rotate(self.rotate_x, self.rotate_y, self.rotate_z, self.degrees, self.order);
        match &self.pipeline {
            Some(path) => Ok(pipeline.extend(Pipeline::from_json_file(path)?)),
            None => Ok(pipeline),
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct StoneOpt {
    #[structopt(flatten)]
    pub output: OutputOpt,

    #[structopt(long, default_value = "50", parse(try_from_str = parse_radius))]
    pub x_radius: f32,

    #[structopt(long, default_value = "50", parse(try_from_str = parse_radius))]
    pub y_radius: f32,

    #[structopt(long, default_value = "50", parse(try_from_str = parse_radius))]
    pub z_radius: f32,

    /// Samples along each axis
    #[structopt(long, default_value = "101", parse(try_from_str = parse_resolution))]
    pub res: usize,
}
