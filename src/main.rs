use log::{error, info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};
use std::{error::Error, fs::File, io::BufWriter, path::Path};
use stl_transform::{
    config::{Command, Opt, OutputOpt, PointsOpt, StoneOpt},
    geo::Point3d,
    render::PointSink,
    stl::decode,
    stone::generate_stone,
};
use structopt::StructOpt;

fn write_json(points: &[Point3d], path: &Path) -> Result<(), Box<dyn Error>> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(writer, points)?;
    info!("wrote {} points to {}", points.len(), path.display());
    Ok(())
}

fn output(points: &[Point3d], opt: &OutputOpt) -> Result<(), Box<dyn Error>> {
    if let Some(json) = &opt.json {
        write_json(points, json)?;
    }
    opt.renderer().render(points, opt.color_map, &opt.output)?;
    Ok(())
}

fn points(opt: &PointsOpt) -> Result<(), Box<dyn Error>> {
    let pipeline = opt.pipeline()?;
    let result = decode(&opt.input, &opt.decode_options())?;
    if let Some(count) = result.triangle_count {
        info!("{} triangles, {} rows", count, result.geometry.len());
    }

    let points = pipeline.apply(&result.geometry.into_points());
    output(&points, &opt.output)
}

fn stone(opt: &StoneOpt) -> Result<(), Box<dyn Error>> {
    let points = generate_stone(opt.x_radius, opt.y_radius, opt.z_radius, opt.res);
    info!("generated {} points", points.len());
    output(&points, &opt.output)
}

fn main() {
    let opt = Opt::from_args();

    let level = if opt.debug { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Mixed) {
        eprintln!("couldn't set up logging: {}", e);
    }

    let result = match &opt.cmd {
        Command::Points(points_opt) => points(points_opt),
        Command::Stone(stone_opt) => stone(stone_opt),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
