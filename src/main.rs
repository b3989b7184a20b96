//! Netatmo public station harvester
//!
//! Two steps, usually run in order:
//! 1. `stations` finds public stations in the configured regions and writes
//!    the station directory CSV
//! 2. `measurements` reads that directory and downloads historical
//!    temperature / humidity / pressure series for every outdoor module
//!
//! Usage:
//!   netatmo_harvest stations
//!   netatmo_harvest stations --lat-ne 45.5 --lon-ne 9.24 --lat-sw 45.44 --lon-sw 9.14
//!   netatmo_harvest measurements --date-begin 20230101 --date-end 20231231
//!
//! Environment:
//!   NETATMO_CLIENT_ID, NETATMO_CLIENT_SECRET, NETATMO_REFRESH_TOKEN
//!   RUST_LOG (default: info)

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgGroup, Args, Parser, Subcommand};

use netatmo_harvest::config::{credentials_from_env, load_config, HarvestConfig, DEFAULT_CONFIG_PATH};
use netatmo_harvest::error::HarvestError;
use netatmo_harvest::harvest::Harvester;
use netatmo_harvest::ingest::client::NetatmoClient;
use netatmo_harvest::model::BoundingBox;
use netatmo_harvest::store::load_device_module_pairs;
use netatmo_harvest::timestamps::{convert_to_unix_timestamp, format_elapsed};

#[derive(Parser)]
#[command(name = "netatmo_harvest", about = "Harvest public Netatmo station data into CSV files")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate public stations and write the station directory
    Stations(StationsArgs),
    /// Download historical measurements for every station module
    Measurements(MeasurementsArgs),
}

/// The four corner flags come as a set: any one of them requires the rest.
#[derive(Args)]
#[command(group(ArgGroup::new("bbox").multiple(true).args(["lat_ne", "lon_ne", "lat_sw", "lon_sw"])))]
struct StationsArgs {
    /// Scan this box instead of the configured regions
    #[arg(long, requires_all = ["lon_ne", "lat_sw", "lon_sw"], allow_hyphen_values = true)]
    lat_ne: Option<f64>,
    #[arg(long, requires_all = ["lat_ne", "lat_sw", "lon_sw"], allow_hyphen_values = true)]
    lon_ne: Option<f64>,
    #[arg(long, requires_all = ["lat_ne", "lon_ne", "lon_sw"], allow_hyphen_values = true)]
    lat_sw: Option<f64>,
    #[arg(long, requires_all = ["lat_ne", "lon_ne", "lat_sw"], allow_hyphen_values = true)]
    lon_sw: Option<f64>,

    /// Output file (default: output.stations_file from config)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct MeasurementsArgs {
    /// First day, YYYYMMDD
    #[arg(long)]
    date_begin: String,
    /// Start time on the first day, HHMM
    #[arg(long, default_value = "0000")]
    time_begin: String,
    /// Last day, YYYYMMDD
    #[arg(long)]
    date_end: String,
    /// End time on the last day, HHMM
    #[arg(long, default_value = "2359")]
    time_end: String,

    /// Device/module list (default: output.stations_file from config)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory for the series files (default: output.directory from config)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl StationsArgs {
    fn bounding_box(&self) -> Option<BoundingBox> {
        match (self.lat_ne, self.lon_ne, self.lat_sw, self.lon_sw) {
            (Some(lat_ne), Some(lon_ne), Some(lat_sw), Some(lon_sw)) => {
                Some(BoundingBox::new(lat_ne, lon_ne, lat_sw, lon_sw))
            }
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let started = Instant::now();

    let result = load_config(&cli.config).and_then(|config| match cli.command {
        Command::Stations(args) => run_stations(config, args),
        Command::Measurements(args) => run_measurements(config, args),
    });

    match result {
        Ok(()) => {
            log::info!("Done in {}", format_elapsed(started.elapsed().as_secs()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                log::error!("   caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

/// Authenticates and builds a harvester around the live API client.
fn connect(config: HarvestConfig) -> Result<Harvester<NetatmoClient>, HarvestError> {
    let credentials = credentials_from_env()?;
    let client = NetatmoClient::new(&config.api)?;
    let token = client.refresh_access_token(&credentials)?;
    Ok(Harvester::new(config, client, token.access_token))
}

fn run_stations(config: HarvestConfig, args: StationsArgs) -> Result<(), HarvestError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.stations_file));

    let cli_region = args
        .bounding_box()
        .map(|bbox| ("command line".to_string(), bbox));

    let harvester = connect(config)?;
    let regions = match cli_region {
        Some(region) => vec![region],
        None => harvester.configured_regions(),
    };
    if regions.is_empty() {
        log::warn!("No regions configured and none given on the command line");
    }

    let summary = harvester.write_stations(&regions, &output)?;
    log::info!(
        "{} stations from {} regions ({} empty, {} failed) -> {}",
        summary.stations.len(),
        summary.regions_found,
        summary.regions_empty,
        summary.regions_failed,
        output.display()
    );
    Ok(())
}

fn run_measurements(config: HarvestConfig, args: MeasurementsArgs) -> Result<(), HarvestError> {
    let date_begin = parse_cli_timestamp(&args.date_begin, &args.time_begin)?;
    let date_end = parse_cli_timestamp(&args.date_end, &args.time_end)?;

    let input = args
        .input
        .unwrap_or_else(|| PathBuf::from(&config.output.stations_file));
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let pairs = load_device_module_pairs(Path::new(&input))?;
    let harvester = connect(config)?;

    let summary = harvester.download_measurements(&pairs, date_begin, date_end, &output_dir)?;
    log::info!(
        "{} pairs complete, {} partial, {} failed; {} rows written to {}",
        summary.pairs_completed,
        summary.pairs_partial,
        summary.pairs_failed,
        summary.rows_written,
        output_dir.display()
    );
    Ok(())
}

fn parse_cli_timestamp(date: &str, time: &str) -> Result<i64, HarvestError> {
    convert_to_unix_timestamp(date, time)
        .ok_or_else(|| HarvestError::InvalidTimestamp(format!("{} {}", date, time)))
}
