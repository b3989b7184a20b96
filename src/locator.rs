/// Station locator: bounded re-attempt loop around getpublicdata.
///
/// The endpoint is not paginated. A "retry" re-issues the same query for
/// the same bounding box; the first non-empty answer ends the loop. Both
/// HTTP failures and valid-but-empty answers consume the retry budget.

use std::collections::BTreeMap;

use crate::config::RetryPolicy;
use crate::error::ApiError;
use crate::ingest::public_data::collect_stations;
use crate::ingest::NetatmoApi;
use crate::model::{BoundingBox, StationRecord};

/// Result of locating stations in one bounding box.
#[derive(Debug)]
pub enum LocateOutcome {
    /// Stations found, keyed by station id
    Found(BTreeMap<String, StationRecord>),

    /// Every attempt succeeded but returned no stations
    EmptyButValid { attempts: u32 },

    /// Budget spent and at least the final attempt failed upstream
    ExhaustedRetries { attempts: u32, last_error: ApiError },
}

impl LocateOutcome {
    /// Collapses the outcome into a plain map; anything but `Found` is empty.
    pub fn into_stations(self) -> BTreeMap<String, StationRecord> {
        match self {
            LocateOutcome::Found(stations) => stations,
            _ => BTreeMap::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, LocateOutcome::Found(_))
    }
}

/// Locates public stations in `bbox`, re-attempting up to
/// `policy.max_retries` times after the first request.
pub fn locate_stations<A: NetatmoApi + ?Sized>(
    api: &A,
    access_token: &str,
    bbox: &BoundingBox,
    policy: &RetryPolicy,
    module_prefix: &str,
) -> LocateOutcome {
    let max_attempts = policy.max_attempts();
    let mut last_error: Option<ApiError> = None;

    for attempt in 1..=max_attempts {
        match api.get_public_data(access_token, bbox) {
            Ok(stations) if !stations.is_empty() => {
                let found = collect_stations(&stations, module_prefix);
                log::info!(
                    "Found {} stations in {:?} (attempt {}/{})",
                    found.len(),
                    bbox,
                    attempt,
                    max_attempts
                );
                return LocateOutcome::Found(found);
            }
            Ok(_) => {
                log::warn!("No stations returned (attempt {}/{})", attempt, max_attempts);
                last_error = None;
            }
            Err(e) => {
                match e.status() {
                    Some(status) => log::warn!(
                        "getpublicdata failed with HTTP {} (attempt {}/{})",
                        status,
                        attempt,
                        max_attempts
                    ),
                    None => log::warn!(
                        "getpublicdata failed: {} (attempt {}/{})",
                        e,
                        attempt,
                        max_attempts
                    ),
                }
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(last_error) => {
            log::error!("Giving up on {:?} after {} attempts: {}", bbox, max_attempts, last_error);
            LocateOutcome::ExhaustedRetries {
                attempts: max_attempts,
                last_error,
            }
        }
        None => LocateOutcome::EmptyButValid {
            attempts: max_attempts,
        },
    }
}
