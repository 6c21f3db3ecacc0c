//! Geofenced OSM extract.
//!
//! Reads an OSM PBF file, keeps everything inside the boundary polygons
//! (plus the ways and relations that touch them) and writes OSM XML.

mod config;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geofence::filter::{DiskLocations, ExtractOptions, Extractor, LocationStore, MemoryLocations};
use geofence::pip::{boundaries_bbox, load_boundaries};
use geofence::stream::{OutputHeader, PbfSource, XmlSink};

use crate::config::{Config, NodeCache};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Extract the OSM data inside boundary polygons")]
struct Args {
    /// OSM PBF file to read
    input: PathBuf,

    /// GeoJSON file with the boundary polygons
    #[arg(short, long)]
    boundary: PathBuf,

    /// Output OSM XML file (default: <input>-extract.osm)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to keep inside node locations
    #[arg(long, value_enum)]
    node_cache: Option<NodeCache>,

    /// Nodes tested per parallel batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Write the extraction report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long)]
    no_progress: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// File config with command line overrides applied
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };
        if let Some(node_cache) = self.node_cache {
            config.node_cache = node_cache;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.no_progress {
            config.progress = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.resolve_config()?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));

    info!("Geofence Extract");
    info!("Input: {}", args.input.display());
    info!("Output: {}", output.display());

    let polygons = load_boundaries(&args.boundary).with_context(|| {
        format!("Failed to load boundaries from {}", args.boundary.display())
    })?;
    let bounds = boundaries_bbox(&polygons);

    let extractor = Extractor::with_options(
        polygons,
        ExtractOptions {
            batch_size: config.batch_size,
            progress: config.progress,
        },
    );

    let store: Box<dyn LocationStore> = match config.node_cache {
        NodeCache::Memory => Box::new(MemoryLocations::new()),
        NodeCache::Disk => Box::new(
            DiskLocations::new(config.tmp_dir.as_deref())
                .context("Failed to create disk node cache")?,
        ),
    };

    let mut source = PbfSource::open_path(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let selection = extractor.select(&mut source, store)?;

    let header = OutputHeader {
        bounds,
        ..OutputHeader::default()
    };
    let mut sink = XmlSink::create(&output, &header)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let report = selection.write(&mut source, &mut sink)?;

    report.log();

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)
            .context("Failed to write report")?;
        info!("Report written to {}", path.display());
    }

    info!("Extract complete: {}", output.display());
    Ok(())
}

/// `<stem>-extract.osm` next to the input, dropping `.osm.pbf`, `.pbf` or `.osm`
fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("input");
    let stem = [".osm.pbf", ".pbf", ".osm"]
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name);
    input.with_file_name(format!("{}-extract.osm", stem))
}
