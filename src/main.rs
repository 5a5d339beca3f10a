//! layout-generator: build a PCB design database from a CSV stackup
//!
//! Replays the stackup into a design database and adds a meandered
//! differential pair on `L03_SIG1`.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use layout_generator::config;
use layout_generator::layout::{TraceGeometry, DEFAULT_MEANDER_COUNT, DEFAULT_MEANDER_HEIGHT};
use layout_generator::{generate_layout, LayoutRequest};

/// Generate a layout from a CSV stackup.
///
/// Creates the output design database, replays the stackup into it and adds
/// a meandered differential pair (nets `diff_p`/`diff_n`) on `L03_SIG1`.
#[derive(Parser, Debug)]
#[command(name = "layout-generator")]
#[command(author, version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Path to stackup CSV file
    #[arg(value_name = "CSV")]
    csv: PathBuf,

    /// Output design database directory
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Trace width in mm
    #[arg(long)]
    width: f64,

    /// Gap between differential traces in mm
    #[arg(long)]
    gap: f64,

    /// Gap to ground in mm (accepted, not yet used)
    #[arg(long = "gap_to_ground", alias = "gap-to-ground", default_value_t = 0.0)]
    gap_to_ground: f64,

    /// Meander height inside each trace in mm
    #[arg(long = "intra_height", alias = "intra-height", default_value_t = DEFAULT_MEANDER_HEIGHT)]
    intra_height: f64,

    /// Number of intra-trace meanders
    #[arg(long = "intra_count", alias = "intra-count", default_value_t = DEFAULT_MEANDER_COUNT)]
    intra_count: i64,

    /// Meander height between traces in mm (accepted, not yet used)
    #[arg(long = "inter_height", alias = "inter-height", default_value_t = DEFAULT_MEANDER_HEIGHT)]
    inter_height: f64,

    /// Number of inter-trace meanders (accepted, not yet used)
    #[arg(long = "inter_count", alias = "inter-count", default_value_t = DEFAULT_MEANDER_COUNT)]
    inter_count: i64,

    /// Target tool version (e.g. 2024.1)
    #[arg(long = "edb_version", alias = "edb-version", value_name = "VERSION")]
    edb_version: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    const fn geometry(&self) -> TraceGeometry {
        TraceGeometry {
            width: self.width,
            gap: self.gap,
            intra_height: self.intra_height,
            intra_count: self.intra_count,
            gap_to_ground: self.gap_to_ground,
            inter_height: self.inter_height,
            inter_count: self.inter_count,
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints an error and every cause beneath it.
fn report(err: &dyn Error) {
    eprintln!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

/// Entry point for layout-generator.
fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        csv = %args.csv.display(),
        output = %args.output.display(),
        "Starting layout-generator"
    );

    let request = LayoutRequest {
        csv: args.csv.clone(),
        output: args.output.clone(),
        geometry: args.geometry(),
        edb_version: args.edb_version.clone().or_else(|| cfg.edb.version.clone()),
    };

    match generate_layout(&request, &cfg.edb.backend) {
        Ok(summary) => {
            info!(layers = summary.layers, traces = summary.traces, "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Layout generation failed");
            report(&e);
            ExitCode::FAILURE
        }
    }
}
