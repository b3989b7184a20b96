/// Netatmo `getmeasure` request parameters and response parsing.
///
/// Only the optimized response form is handled: `body` is a list of
/// entries, each with a `beg_time`, a `step_time` and one value row per step.

use serde::Deserialize;

use super::{check_status, ErrorBody};
use crate::error::ApiError;
use crate::model::{MeasureEntry, MeasureQuery, MeasureValues};

pub const MEASURE_PATH: &str = "/api/getmeasure";

#[derive(Debug, Deserialize)]
struct MeasureResponse {
    status: Option<String>,
    body: Option<Vec<RawEntry>>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    beg_time: i64,
    step_time: Option<i64>,
    #[serde(default)]
    value: Vec<Vec<Option<f64>>>,
}

/// Query string for one getmeasure window.
pub fn build_measure_params(access_token: &str, query: &MeasureQuery) -> Vec<(&'static str, String)> {
    vec![
        ("access_token", access_token.to_string()),
        ("device_id", query.device_id.clone()),
        ("module_id", query.module_id.clone()),
        ("scale", query.scale.clone()),
        ("type", query.types.clone()),
        ("date_begin", query.date_begin.to_string()),
        ("date_end", query.date_end.to_string()),
        ("limit", query.limit.to_string()),
    ]
}

/// Parses a getmeasure body. A missing or empty `body` yields an empty
/// vector, which callers treat as "no more data".
pub fn parse_measure_response(json: &str) -> Result<Vec<MeasureEntry>, ApiError> {
    let response: MeasureResponse = serde_json::from_str(json)?;
    check_status(response.status.as_deref(), response.error)?;

    let entries = response
        .body
        .unwrap_or_default()
        .into_iter()
        .map(|raw| MeasureEntry {
            beg_time: raw.beg_time,
            step_time: raw.step_time,
            values: raw.value.iter().map(|row| MeasureValues::from_slice(row)).collect(),
        })
        .collect();

    Ok(entries)
}
