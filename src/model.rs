/// Shared data types for the Netatmo harvester.
///
/// These are the plain values that flow between the API client, the
/// station locator, the measurement fetcher and the CSV store. None of
/// them own I/O resources.

/// Sentinel city name written when the upstream place has no city.
pub const NO_CITY: &str = "no city";

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// Geographic rectangle defined by its northeast and southwest corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_ne: f64,
    pub lon_ne: f64,
    pub lat_sw: f64,
    pub lon_sw: f64,
}

impl BoundingBox {
    pub fn new(lat_ne: f64, lon_ne: f64, lat_sw: f64, lon_sw: f64) -> Self {
        Self { lat_ne, lon_ne, lat_sw, lon_sw }
    }

    /// Query parameters in the order the public data endpoint expects.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("lat_ne", self.lat_ne.to_string()),
            ("lon_ne", self.lon_ne.to_string()),
            ("lat_sw", self.lat_sw.to_string()),
            ("lon_sw", self.lon_sw.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

/// One public weather station as discovered inside a bounding box.
///
/// Created once per discovery call and never mutated; each record becomes
/// one row of the station directory CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    /// Station MAC address, e.g. `70:ee:50:00:00:01`
    pub station_id: String,

    /// Module ids matching the configured module-type prefix
    pub selected_modules: Vec<String>,

    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,

    /// City name, or [`NO_CITY`] when the API omits it
    pub city: String,

    /// Every module id attached to the station
    pub modules: Vec<String>,
}

/// A device/module identifier pair to fetch measurements for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceModule {
    pub device_id: String,
    pub module_id: String,
}

impl DeviceModule {
    pub fn new(device_id: impl Into<String>, module_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            module_id: module_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// One entry of a getmeasure page: a start time and values sampled at a
/// fixed step from that time.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureEntry {
    /// UNIX timestamp of the first value
    pub beg_time: i64,

    /// Step reported by the API (seconds), if any
    pub step_time: Option<i64>,

    /// Ordered value tuples, one per step: temperature, humidity, pressure
    pub values: Vec<MeasureValues>,
}

/// A single sample. Any component may be missing upstream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasureValues {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl MeasureValues {
    /// Builds a sample from the raw positional list returned by the API.
    pub fn from_slice(raw: &[Option<f64>]) -> Self {
        Self {
            temperature: raw.first().copied().flatten(),
            humidity: raw.get(1).copied().flatten(),
            pressure: raw.get(2).copied().flatten(),
        }
    }
}

/// Parameters of one historical measurement request window.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureQuery {
    pub device_id: String,
    pub module_id: String,
    pub scale: String,
    /// Comma-separated measurement types, e.g. `Temperature,Humidity,Pressure`
    pub types: String,
    pub date_begin: i64,
    pub date_end: i64,
    pub limit: u32,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// OAuth client credentials plus the long-lived refresh token.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
