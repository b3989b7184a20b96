/// Measurement fetcher: paged, paced walk over getmeasure.
///
/// Starting from `date_begin`, each request asks for up to `limit` entries
/// in `[cursor, date_end]`. Every non-empty page is accumulated, handed to
/// a [`MeasurementSink`] straight away, and the cursor moves to the last
/// entry's `beg_time` plus the configured step. The walk stops when the
/// cursor reaches `date_end` or the API has nothing (more) to give.
///
/// The step comes from configuration, not from the response's
/// `step_time`. A mismatch is logged but does not change the cursor.

use std::thread;

use crate::config::FetchPolicy;
use crate::error::{ApiError, HarvestError};
use crate::ingest::NetatmoApi;
use crate::model::{DeviceModule, MeasureEntry, MeasureQuery};

/// Destination for fetched pages, written as they arrive.
pub trait MeasurementSink {
    /// Persists one page and returns the number of rows written.
    fn write_page(&mut self, entries: &[MeasureEntry], step_interval: i64) -> Result<usize, HarvestError>;
}

/// Why the fetch loop stopped.
#[derive(Debug)]
pub enum Termination {
    /// Cursor reached `date_end`
    Completed,
    /// The API answered with no entries
    EmptyPage,
    /// The API call failed; results so far are kept
    UpstreamError(ApiError),
    /// The last page would not have moved the cursor forward
    CursorStalled,
}

/// Everything one fetch produced.
#[derive(Debug)]
pub struct FetchOutcome {
    pub entries: Vec<MeasureEntry>,
    pub requests: u32,
    pub rows_written: usize,
    /// Final cursor position
    pub cursor: i64,
    pub termination: Termination,
}

impl FetchOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self.termination, Termination::Completed)
    }
}

/// Fetches `[date_begin, date_end)` for one device/module pair.
///
/// Upstream failures end the walk and are reported in
/// [`FetchOutcome::termination`]. Only sink (local persistence) errors are
/// returned as `Err`.
pub fn fetch_measurements<A, S>(
    api: &A,
    access_token: &str,
    pair: &DeviceModule,
    date_begin: i64,
    date_end: i64,
    policy: &FetchPolicy,
    sink: &mut S,
) -> Result<FetchOutcome, HarvestError>
where
    A: NetatmoApi + ?Sized,
    S: MeasurementSink + ?Sized,
{
    let step = policy.step_interval_secs;
    let delay = policy.request_delay();
    let types = policy.types_param();

    let mut cursor = date_begin;
    let mut entries = Vec::new();
    let mut requests = 0;
    let mut rows_written = 0;
    let mut termination = Termination::Completed;

    while cursor < date_end {
        let query = MeasureQuery {
            device_id: pair.device_id.clone(),
            module_id: pair.module_id.clone(),
            scale: policy.scale.clone(),
            types: types.clone(),
            date_begin: cursor,
            date_end,
            limit: policy.limit,
        };

        requests += 1;
        let page = match api.get_measure(access_token, &query) {
            Ok(page) => page,
            Err(e) => {
                log::warn!("{} {}: getmeasure failed, stopping: {}", pair.device_id, pair.module_id, e);
                termination = Termination::UpstreamError(e);
                break;
            }
        };

        let Some(last) = page.last() else {
            log::debug!("{} {}: no more data after {}", pair.device_id, pair.module_id, cursor);
            termination = Termination::EmptyPage;
            break;
        };
        let next = last.beg_time + step;

        if let Some(reported) = last.step_time.filter(|s| *s != step) {
            log::warn!(
                "{} {}: API reports step_time {}s but cursor advances by {}s",
                pair.device_id,
                pair.module_id,
                reported,
                step
            );
        }

        rows_written += sink.write_page(&page, step)?;
        log::info!(
            "{} {}: page {} with {} entries, cursor {} -> {}",
            pair.device_id,
            pair.module_id,
            requests,
            page.len(),
            cursor,
            next
        );
        entries.extend(page);

        if next <= cursor {
            log::warn!("{} {}: cursor did not advance past {}", pair.device_id, pair.module_id, cursor);
            termination = Termination::CursorStalled;
            break;
        }
        cursor = next;

        if cursor < date_end && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    Ok(FetchOutcome {
        entries,
        requests,
        rows_written,
        cursor,
        termination,
    })
}
