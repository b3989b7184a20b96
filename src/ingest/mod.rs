/// Netatmo API access.
///
/// `client` talks HTTP, `public_data` and `measure` own the JSON shapes of
/// the two data endpoints. The retry and pagination loops in
/// [`crate::locator`] and [`crate::fetcher`] only see the [`NetatmoApi`]
/// trait, so they can be driven by scripted fakes in tests.

pub mod client;
pub mod measure;
pub mod public_data;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::Deserialize;

use crate::error::ApiError;
use crate::model::{BoundingBox, MeasureEntry, MeasureQuery};
use public_data::PublicStation;

/// The two data endpoints the harvester depends on.
pub trait NetatmoApi {
    /// One getpublicdata call for `bbox`. An empty vector is a valid,
    /// successful answer.
    fn get_public_data(
        &self,
        access_token: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<PublicStation>, ApiError>;

    /// One getmeasure call. An empty vector means the API had no (more) data.
    fn get_measure(
        &self,
        access_token: &str,
        query: &MeasureQuery,
    ) -> Result<Vec<MeasureEntry>, ApiError>;
}

/// `{"error": {"code": .., "message": ..}}` as returned on API failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub code: i64,
    pub message: String,
}

/// Maps an error object or a non-"ok" status to `ApiError::Upstream`.
pub(crate) fn check_status(status: Option<&str>, error: Option<ErrorBody>) -> Result<(), ApiError> {
    if let Some(err) = error {
        return Err(ApiError::Upstream {
            code: err.code,
            message: err.message,
        });
    }
    match status {
        None | Some("ok") => Ok(()),
        Some(other) => Err(ApiError::Upstream {
            code: 0,
            message: format!("unexpected status '{}'", other),
        }),
    }
}
