//! Paleomap - command-line entry point
//!
//! Loads a GeoJSON dataset once, then either answers one filter request
//! (JSON in, GeoJSON FeatureCollection with metadata out) or prints a
//! dataset summary.

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use paleomap::config::EngineConfig;
use paleomap::map::palettes::RAMP_REGISTRY;
use paleomap::map::record::NumericField;
use paleomap::map::statistics::numeric_extent;
use paleomap::map::{DatasetContext, FilterRequest, MapContext};
use paleomap::memprof;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser)]
#[command(name = "paleomap")]
#[command(about = "Filter and color ancient-DNA sample maps.", long_about = None)]
#[command(version)]
struct Args {
    /// Load the sample dataset (GeoJSON FeatureCollection) from this FILE.
    #[arg(short = 'd', long = "dataset", value_name = "FILE")]
    dataset: PathBuf,

    /// Read the filter request (JSON) from this FILE; '-' reads stdin. Defaults to an empty request.
    #[arg(short = 'r', long = "request", value_name = "FILE")]
    request: Option<PathBuf>,

    /// Read engine settings (flat JSON object) from this FILE.
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Write the response to this FILE instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print dataset statistics, slider breakpoints and ramp names instead of running a query.
    #[arg(long = "summary")]
    summary: bool,

    /// Pretty-print JSON output.
    #[arg(long = "pretty")]
    pretty: bool,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mem0 = memprof::checkpoint("start");

    let config = EngineConfig::load(args.settings.as_deref()).context("Failed to load settings")?;
    let context = DatasetContext::from_geojson_file(&args.dataset, config).with_context(|| {
        format!("Failed to load dataset {}", args.dataset.display())
    })?;
    memprof::delta("dataset loaded", mem0);

    let mut out = open_output(args.output.as_deref())?;

    if args.summary {
        write_summary(&context, &mut out)?;
    } else {
        let request = read_request(args.request.as_deref())?;
        let response = context.process(&request);
        info!(
            "Query returned {}/{} records",
            response.meta.filtered_count, response.meta.total_count
        );
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, &response)?;
        } else {
            serde_json::to_writer(&mut out, &response)?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn read_request(path: Option<&Path>) -> Result<FilterRequest> {
    let json = match path {
        None => return Ok(FilterRequest::default()),
        Some(p) if p == Path::new("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read request {}", p.display()))?,
    };
    serde_json::from_str(&json).context("Invalid filter request")
}

fn write_summary(context: &DatasetContext, out: &mut dyn Write) -> Result<()> {
    let stats = context.date_statistics();
    let scale = context.slider_scale();
    let slider = scale.slider();

    writeln!(out, "records:   {}", context.records().len())?;
    writeln!(
        out,
        "ages:      min={} p2={} p98={} max={}",
        stats.min, stats.p2, stats.p98, stats.max
    )?;
    if let (Some(lon), Some(lat)) = (
        numeric_extent(context.records(), NumericField::Longitude),
        numeric_extent(context.records(), NumericField::Latitude),
    ) {
        writeln!(
            out,
            "extent:    lon [{}, {}] lat [{}, {}]",
            lon.0, lon.1, lat.0, lat.1
        )?;
    }
    writeln!(
        out,
        "slider:    0..{} breaks at {} ({}) and {} ({})",
        slider.max,
        slider.left_break,
        scale.to_value(slider.left_break),
        slider.right_break,
        scale.to_value(slider.right_break)
    )?;
    writeln!(out, "ramps:     {}", RAMP_REGISTRY.names().join(", "))?;
    Ok(())
}
