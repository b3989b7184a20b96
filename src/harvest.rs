/// Harvest orchestration
///
/// Ties the pieces together for the two runs the binary offers:
/// 1. Station discovery: locate stations in every region and merge them
///    into one station directory
/// 2. Measurement download: walk the requested time range for every
///    device/module pair, one pair at a time
///
/// Each region and each pair is independent. A region or pair that fails
/// upstream is logged and counted; the run carries on with the next one.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::fetcher::{fetch_measurements, Termination};
use crate::ingest::NetatmoApi;
use crate::locator::{locate_stations, LocateOutcome};
use crate::model::{BoundingBox, DeviceModule, StationRecord};
use crate::store::{write_station_directory, MeasurementCsv};
use crate::timestamps::format_elapsed;

// ---------------------------------------------------------------------------
// Run summaries
// ---------------------------------------------------------------------------

/// Result of a station discovery run
#[derive(Debug, Default)]
pub struct StationSummary {
    pub stations: BTreeMap<String, StationRecord>,
    pub regions_found: usize,
    pub regions_empty: usize,
    pub regions_failed: usize,
}

/// Result of a measurement download run
#[derive(Debug, Default)]
pub struct MeasurementSummary {
    pub pairs_completed: usize,
    /// Pairs that stopped early (no more data, upstream error, stalled cursor)
    pub pairs_partial: usize,
    pub pairs_failed: usize,
    pub entries: usize,
    pub rows_written: usize,
}

// ---------------------------------------------------------------------------
// Harvester
// ---------------------------------------------------------------------------

pub struct Harvester<A: NetatmoApi> {
    config: HarvestConfig,
    api: A,
    access_token: String,
}

impl<A: NetatmoApi> Harvester<A> {
    pub fn new(config: HarvestConfig, api: A, access_token: impl Into<String>) -> Self {
        Self {
            config,
            api,
            access_token: access_token.into(),
        }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Regions from configuration, in file order.
    pub fn configured_regions(&self) -> Vec<(String, BoundingBox)> {
        self.config
            .regions
            .iter()
            .map(|r| (r.name.clone(), BoundingBox::from(r)))
            .collect()
    }

    /// Locates stations in every region and merges the results by station id.
    pub fn discover_stations(&self, regions: &[(String, BoundingBox)]) -> StationSummary {
        let mut summary = StationSummary::default();

        for (name, bbox) in regions {
            log::info!("Scanning region '{}'", name);
            let outcome = locate_stations(
                &self.api,
                &self.access_token,
                bbox,
                &self.config.retry,
                &self.config.output.module_prefix,
            );

            match outcome {
                LocateOutcome::Found(stations) => {
                    log::info!("   {} - {} stations", name, stations.len());
                    summary.regions_found += 1;
                    summary.stations.extend(stations);
                }
                LocateOutcome::EmptyButValid { attempts } => {
                    log::info!("   {} - no stations after {} attempts", name, attempts);
                    summary.regions_empty += 1;
                }
                LocateOutcome::ExhaustedRetries { attempts, last_error } => {
                    log::error!("   {} - API failed after {} attempts: {}", name, attempts, last_error);
                    summary.regions_failed += 1;
                }
            }
        }

        summary
    }

    /// Runs discovery and writes the station directory to `path`.
    pub fn write_stations(
        &self,
        regions: &[(String, BoundingBox)],
        path: &Path,
    ) -> Result<StationSummary, HarvestError> {
        let summary = self.discover_stations(regions);
        write_station_directory(path, &summary.stations)?;
        Ok(summary)
    }

    /// Downloads `[date_begin, date_end)` for every pair into
    /// `output_dir`, one series file per pair.
    pub fn download_measurements(
        &self,
        pairs: &[DeviceModule],
        date_begin: i64,
        date_end: i64,
        output_dir: &Path,
    ) -> Result<MeasurementSummary, HarvestError> {
        let mut summary = MeasurementSummary::default();

        for (i, pair) in pairs.iter().enumerate() {
            let started = Instant::now();
            let mut sink = MeasurementCsv::for_pair(output_dir, pair);
            log::info!(
                "[{}/{}] {} {} -> {}",
                i + 1,
                pairs.len(),
                pair.device_id,
                pair.module_id,
                sink.path().display()
            );

            let outcome = fetch_measurements(
                &self.api,
                &self.access_token,
                pair,
                date_begin,
                date_end,
                &self.config.fetch,
                &mut sink,
            )?;

            summary.entries += outcome.entries.len();
            summary.rows_written += outcome.rows_written;

            match outcome.termination {
                Termination::Completed => summary.pairs_completed += 1,
                Termination::UpstreamError(_) if outcome.entries.is_empty() => summary.pairs_failed += 1,
                Termination::EmptyPage | Termination::UpstreamError(_) | Termination::CursorStalled => {
                    summary.pairs_partial += 1
                }
            }

            log::info!(
                "   {} rows in {} requests ({})",
                outcome.rows_written,
                outcome.requests,
                format_elapsed(started.elapsed().as_secs())
            );
        }

        Ok(summary)
    }
}
