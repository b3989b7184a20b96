/// CSV persistence: station directory, device/module list, measurement series.
///
/// ## Station directory
///
/// One row per station, module lists rendered as bracketed quoted lists
/// (`['02:00:00:00:00:a1', '02:00:00:00:00:a2']`):
///
/// ```text
/// MAC_address,module_name,latitude,longitude,altitude,city,full_modules
/// ```
///
/// The same file is the input of the measurement run: column 0 is the
/// device id, column 1 the module list with its punctuation stripped.
///
/// ## Measurement series
///
/// One file per device/module pair, `{device}_{module}_measurements.csv`
/// with colons removed, opened in append mode. The header is written only
/// when the file is empty.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::HarvestError;
use crate::fetcher::MeasurementSink;
use crate::model::{DeviceModule, MeasureEntry, StationRecord};
use crate::timestamps::format_acquisition_time;

pub const STATION_HEADER: [&str; 7] = [
    "MAC_address",
    "module_name",
    "latitude",
    "longitude",
    "altitude",
    "city",
    "full_modules",
];

pub const MEASUREMENT_HEADER: [&str; 4] = ["acquisition_time", "temperature", "humidity", "pressure"];

// ---------------------------------------------------------------------------
// Module list rendering
// ---------------------------------------------------------------------------

/// Renders module ids as `['a', 'b']`.
pub fn format_module_list(modules: &[String]) -> String {
    let quoted: Vec<String> = modules.iter().map(|m| format!("'{}'", m)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Parses a module list cell, stripping brackets and quotes.
///
/// Accepts the bracketed form written by [`format_module_list`] as well as
/// a bare id.
pub fn parse_module_list(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(|part| part.trim_matches(|c: char| matches!(c, '[' | ']' | '\'' | '"') || c.is_whitespace()))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn ensure_parent_dir(path: &Path) -> Result<(), HarvestError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| HarvestError::Io(parent.to_path_buf(), e))
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Station directory
// ---------------------------------------------------------------------------

/// Writes (overwriting) the station directory. Returns the number of rows.
pub fn write_station_directory(
    path: &Path,
    stations: &BTreeMap<String, StationRecord>,
) -> Result<usize, HarvestError> {
    ensure_parent_dir(path)?;
    let csv_err = |e| HarvestError::Csv(path.to_path_buf(), e);

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(STATION_HEADER).map_err(csv_err)?;

    for (station_id, record) in stations {
        writer
            .write_record([
                station_id.clone(),
                format_module_list(&record.selected_modules),
                record.latitude.to_string(),
                record.longitude.to_string(),
                record.altitude.to_string(),
                record.city.clone(),
                format_module_list(&record.modules),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|e| HarvestError::Io(path.to_path_buf(), e))?;
    log::info!("Wrote {} stations to {}", stations.len(), path.display());
    Ok(stations.len())
}

/// Loads device/module pairs from a station directory (or any CSV with a
/// header row, device id in column 0 and module list in column 1).
///
/// Each module id in the list yields one pair. Rows without a module are
/// skipped.
pub fn load_device_module_pairs(path: &Path) -> Result<Vec<DeviceModule>, HarvestError> {
    let csv_err = |e| HarvestError::Csv(path.to_path_buf(), e);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let mut pairs = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let device_id = record.get(0).unwrap_or("").trim();
        let modules = parse_module_list(record.get(1).unwrap_or(""));

        if device_id.is_empty() || modules.is_empty() {
            log::warn!("{}: row {} has no device/module, skipping", path.display(), line + 2);
            continue;
        }
        pairs.extend(modules.into_iter().map(|m| DeviceModule::new(device_id, m)));
    }

    log::info!("Loaded {} device/module pairs from {}", pairs.len(), path.display());
    Ok(pairs)
}

// ---------------------------------------------------------------------------
// Measurement series
// ---------------------------------------------------------------------------

/// `{device}_{module}_measurements.csv` with colons removed.
pub fn measurement_file_name(pair: &DeviceModule) -> String {
    format!(
        "{}_{}_measurements.csv",
        pair.device_id.replace(':', ""),
        pair.module_id.replace(':', "")
    )
}

/// Appending CSV writer for one device/module pair.
pub struct MeasurementCsv {
    path: PathBuf,
}

impl MeasurementCsv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Series file for `pair` inside `directory`.
    pub fn for_pair(directory: &Path, pair: &DeviceModule) -> Self {
        Self::new(directory.join(measurement_file_name(pair)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<(File, bool), HarvestError> {
        ensure_parent_dir(&self.path)?;
        let io_err = |e| HarvestError::Io(self.path.clone(), e);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        let is_empty = file.metadata().map_err(io_err)?.len() == 0;
        Ok((file, is_empty))
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl MeasurementSink for MeasurementCsv {
    /// Appends one row per sampled value. Value `i` of an entry is stamped
    /// `beg_time + i * step_interval`.
    fn write_page(&mut self, entries: &[MeasureEntry], step_interval: i64) -> Result<usize, HarvestError> {
        let (file, is_empty) = self.open()?;
        let csv_err = |e| HarvestError::Csv(self.path.clone(), e);

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            writer.write_record(MEASUREMENT_HEADER).map_err(csv_err)?;
        }

        let mut rows = 0;
        for entry in entries {
            for (i, values) in entry.values.iter().enumerate() {
                let timestamp = entry.beg_time + i as i64 * step_interval;
                let acquisition_time =
                    format_acquisition_time(timestamp).unwrap_or_else(|| timestamp.to_string());

                writer
                    .write_record([
                        acquisition_time,
                        optional(values.temperature),
                        optional(values.humidity),
                        optional(values.pressure),
                    ])
                    .map_err(csv_err)?;
                rows += 1;
            }
        }

        writer.flush().map_err(|e| HarvestError::Io(self.path.clone(), e))?;
        Ok(rows)
    }
}
