//! Command line interface for the cushion tools

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cushion_core::{stl, AlignConfig, AlignToOrigin, Bounds, FlipZ, Operator, SceneObject};
use log::info;
use nalgebra::Matrix4;
use std::fs;
use std::path::{Path, PathBuf};

use crate::TerminalApp;

#[derive(Parser)]
#[command(name = "cushion")]
#[command(about = "Align scanned seat shapes to the world origin")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print triangle count, vertex count and bounds of a scan
    Info(ScanArgs),

    /// Move the triangle spanned by three vertices onto the XY plane
    Align(AlignArgs),

    /// Turn the scan upside down (half turn about +Y)
    Flip(ScanArgs),

    /// Interactive preview with the tools panel
    View(ViewArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// STL scan (binary or ASCII)
    pub input: PathBuf,

    /// Tolerance for treating directions as parallel or antiparallel (0 = exact)
    #[arg(
        long,
        default_value_t = AlignConfig::default().parallel_epsilon,
        value_parser = parse_epsilon
    )]
    pub epsilon: f64,
}

fn parse_epsilon(value: &str) -> Result<f64, String> {
    let epsilon: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(format!("must be a finite, non-negative number, got {value}"));
    }
    Ok(epsilon)
}

impl ScanArgs {
    fn config(&self) -> AlignConfig {
        AlignConfig::new().with_parallel_epsilon(self.epsilon)
    }
}

#[derive(Args)]
pub struct AlignArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Three vertex indices spanning the reference triangle
    #[arg(long, num_args = 3, value_names = ["I", "J", "K"], required = true)]
    pub vertices: Vec<usize>,
}

#[derive(Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Vertex indices to select before opening the preview
    #[arg(long, num_args = 1..)]
    pub vertices: Vec<usize>,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Info(args) => {
            let object = load_scan(&args.input)?;
            print_summary(&object);
        }
        Commands::Align(args) => {
            let mut object = load_scan(&args.scan.input)?;
            object.select(&args.vertices)?;
            let applied = AlignToOrigin::new(args.scan.config()).execute(&mut object)?;
            print_result(AlignToOrigin::LABEL, &applied, &object);
        }
        Commands::Flip(args) => {
            let mut object = load_scan(&args.input)?;
            let applied = FlipZ::new(args.config()).execute(&mut object)?;
            print_result(FlipZ::LABEL, &applied, &object);
        }
        Commands::View(args) => {
            let mut object = load_scan(&args.scan.input)?;
            object.select(&args.vertices)?;
            let mut app = TerminalApp::new(object, args.scan.config())
                .context("failed to start terminal preview")?;
            app.run()?;
            print_summary(&app.into_object());
        }
    }
    Ok(())
}

/// Read and parse an STL file into a scene object named after the file
pub fn load_scan(path: &Path) -> Result<SceneObject> {
    let data =
        fs::read(path).with_context(|| format!("failed to read STL file {}", path.display()))?;
    let mesh = stl::parse_stl(&data)
        .with_context(|| format!("failed to parse STL file {}", path.display()))?;
    info!("loaded {} triangles from {}", mesh.triangles.len(), path.display());

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scan".to_string());
    Ok(SceneObject::new(name, mesh))
}

fn print_result(label: &str, applied: &Matrix4<f64>, object: &SceneObject) {
    println!("{label} applied:{applied}");
    print_summary(object);
}

fn print_summary(object: &SceneObject) {
    println!("Object: {}", object.name);
    println!("Triangles: {}", object.mesh.triangles.len());
    println!("Vertices: {}", object.mesh.vertex_count());
    match object.mesh.bounds() {
        Some(bounds) => println!("{}", describe_bounds(&bounds)),
        None => println!("Bounds: empty mesh"),
    }
}

fn describe_bounds(bounds: &Bounds) -> String {
    let (min, max) = (bounds.min, bounds.max);
    format!(
        "Bounds: ({:.4}, {:.4}, {:.4}) .. ({:.4}, {:.4}, {:.4})",
        min.x, min.y, min.z, max.x, max.y, max.z
    )
}
