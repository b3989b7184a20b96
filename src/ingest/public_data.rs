/// Netatmo `getpublicdata` response parsing.
///
/// The endpoint returns every public station inside a bounding box. We
/// keep only what the station directory needs: the station MAC, its place
/// and its module list.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{check_status, ErrorBody};
use crate::error::ApiError;
use crate::model::{StationRecord, NO_CITY};

pub const PUBLIC_DATA_PATH: &str = "/api/getpublicdata";

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PublicDataResponse {
    status: Option<String>,
    body: Option<Vec<PublicStation>>,
    error: Option<ErrorBody>,
}

/// One station as listed by getpublicdata.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicStation {
    #[serde(rename = "_id")]
    pub id: String,
    pub place: Place,
    #[serde(default)]
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    /// `[longitude, latitude]`
    pub location: [f64; 2],
    #[serde(default)]
    pub altitude: f64,
    pub city: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a getpublicdata body into the listed stations.
///
/// # Errors
/// - `ApiError::Decode` — malformed JSON.
/// - `ApiError::Upstream` — error object or non-ok status.
pub fn parse_public_data(json: &str) -> Result<Vec<PublicStation>, ApiError> {
    let response: PublicDataResponse = serde_json::from_str(json)?;
    check_status(response.status.as_deref(), response.error)?;
    Ok(response.body.unwrap_or_default())
}

impl PublicStation {
    /// Converts to a station directory record, selecting the modules whose
    /// id starts with `module_prefix`.
    pub fn to_record(&self, module_prefix: &str) -> StationRecord {
        let [longitude, latitude] = self.place.location;
        StationRecord {
            station_id: self.id.clone(),
            selected_modules: self
                .modules
                .iter()
                .filter(|m| m.starts_with(module_prefix))
                .cloned()
                .collect(),
            latitude,
            longitude,
            altitude: self.place.altitude,
            city: self.place.city.clone().unwrap_or_else(|| NO_CITY.to_string()),
            modules: self.modules.clone(),
        }
    }
}

/// Builds the station map, keyed (and therefore de-duplicated) by station id.
pub fn collect_stations(
    stations: &[PublicStation],
    module_prefix: &str,
) -> BTreeMap<String, StationRecord> {
    stations
        .iter()
        .map(|s| (s.id.clone(), s.to_record(module_prefix)))
        .collect()
}
