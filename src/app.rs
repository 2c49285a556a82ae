//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - runs the batch pipeline or the archive scan
//! - prints reports

use clap::Parser;
use tracing::debug;

use crate::cli::{Cli, Command, ProcessArgs, ScanArgs};
use crate::domain::PipelineConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sea-ice` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    debug!(?cli, "parsed arguments");

    match cli.command {
        Command::Process(args) => handle_process(args),
        Command::Scan(args) => handle_scan(args),
    }
}

/// Log to stderr. `RUST_LOG` wins when set; otherwise `-v` picks the level.
fn init_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => tracing_subscriber::EnvFilter::new(directives),
        Err(_) => tracing_subscriber::EnvFilter::new(match verbose {
            0 => "sea_ice_history=info",
            1 => "sea_ice_history=debug",
            2 => "sea_ice_history=trace",
            3.. => "trace",
        }),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();
}

fn handle_process(args: ProcessArgs) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;
    println!("{}", crate::report::format_run_summary(&run, &config));
    Ok(())
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let entries = pipeline::scan_archives(&args.input)?;
    print!("{}", crate::report::format_scan(&entries));
    Ok(())
}

pub fn config_from_args(args: &ProcessArgs) -> PipelineConfig {
    PipelineConfig {
        input_dir: args.input.clone(),
        output_path: args.output.clone(),
        metric_crs: args.metric_crs.clone(),
        output_crs: args.output_crs.clone(),
        simplify_tolerance_m: args.tolerance_m,
        min_area_m2: args.min_area_km2 * 1.0e6,
        jobs: args.jobs,
        pretty: args.pretty,
    }
}
