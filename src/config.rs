/// Harvester configuration loader - parses harvest.toml
///
/// Keeps API endpoints, retry budget, pagination and pacing values and the
/// list of regions to scan out of the code, so they can be tuned (or shrunk
/// to zero in tests) without recompiling. Secrets are not stored here; see
/// [`credentials_from_env`].

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::HarvestError;
use crate::model::{BoundingBox, Credentials};

pub const DEFAULT_CONFIG_PATH: &str = "harvest.toml";

pub const ENV_CLIENT_ID: &str = "NETATMO_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "NETATMO_CLIENT_SECRET";
pub const ENV_REFRESH_TOKEN: &str = "NETATMO_REFRESH_TOKEN";

// ---------------------------------------------------------------------------
// Configuration sections
// ---------------------------------------------------------------------------

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub api: ApiConfig,
    pub retry: RetryPolicy,
    pub fetch: FetchPolicy,
    pub output: OutputConfig,
    #[serde(rename = "region")]
    pub regions: Vec<RegionConfig>,
}

/// Upstream API location and HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.netatmo.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Retry budget for the station locator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Re-attempts after the first request (default: 5, i.e. 6 attempts)
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 5 }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Pagination and pacing for the measurement fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchPolicy {
    /// Temporal resolution requested from getmeasure (default: "1day")
    pub scale: String,

    /// Measurement types, joined with ',' on the wire
    pub types: Vec<String>,

    /// Maximum entries per page (default: 1024, the API maximum)
    pub limit: u32,

    /// Seconds added to the last entry's timestamp to form the next cursor
    /// (default: 86400). Not read from the response.
    pub step_interval_secs: i64,

    /// Pause between consecutive page requests (default: 1000 ms)
    pub request_delay_ms: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            scale: "1day".to_string(),
            types: vec![
                "Temperature".to_string(),
                "Humidity".to_string(),
                "Pressure".to_string(),
            ],
            limit: 1024,
            step_interval_secs: 86_400,
            request_delay_ms: 1_000,
        }
    }
}

impl FetchPolicy {
    pub fn types_param(&self) -> String {
        self.types.join(",")
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Output locations and station directory options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives the per-module measurement CSVs
    pub directory: String,

    /// Station directory CSV (written by `stations`, read by `measurements`)
    pub stations_file: String,

    /// Module-type prefix selected into the `module_name` column
    pub module_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            stations_file: "stations.csv".to_string(),
            module_prefix: "02:".to_string(),
        }
    }
}

/// A named bounding box to scan for stations
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub lat_ne: f64,
    pub lon_ne: f64,
    pub lat_sw: f64,
    pub lon_sw: f64,
}

impl From<&RegionConfig> for BoundingBox {
    fn from(region: &RegionConfig) -> Self {
        BoundingBox::new(region.lat_ne, region.lon_ne, region.lat_sw, region.lon_sw)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str, origin: &Path) -> Result<HarvestConfig, HarvestError> {
    toml::from_str(contents).map_err(|e| HarvestError::ConfigParse(origin.to_path_buf(), e))
}

/// Loads configuration from `path`.
///
/// A missing file is not an error: every section has defaults, and the
/// region can be given on the command line. A file that exists but cannot
/// be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<HarvestConfig, HarvestError> {
    if !path.exists() {
        log::info!("No config file at {}, using defaults", path.display());
        return Ok(HarvestConfig::default());
    }

    let contents =
        fs::read_to_string(path).map_err(|e| HarvestError::ConfigRead(path.to_path_buf(), e))?;
    let config = parse_config(&contents, path)?;

    log::debug!(
        "Loaded {} ({} regions, base url {})",
        path.display(),
        config.regions.len(),
        config.api.base_url
    );
    Ok(config)
}

/// Reads OAuth credentials from the environment, loading `.env` if present.
pub fn credentials_from_env() -> Result<Credentials, HarvestError> {
    dotenv::dotenv().ok();

    let var = |name: &'static str| env::var(name).map_err(|_| HarvestError::MissingCredential(name));

    Ok(Credentials {
        client_id: var(ENV_CLIENT_ID)?,
        client_secret: var(ENV_CLIENT_SECRET)?,
        refresh_token: var(ENV_REFRESH_TOKEN)?,
    })
}
