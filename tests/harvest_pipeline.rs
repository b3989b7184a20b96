/// Integration tests for the full harvest pipeline
///
/// These tests drive the public API end to end against an in-memory fake of
/// the Netatmo endpoints:
/// 1. Station discovery across regions, including retries
/// 2. Station directory written and read back as device/module pairs
/// 3. Measurement download for each pair into per-module CSV files
///
/// No network access is needed.
///
/// Run with: cargo test --test harvest_pipeline

use netatmo_harvest::config::{FetchPolicy, HarvestConfig, RegionConfig};
use netatmo_harvest::error::ApiError;
use netatmo_harvest::harvest::Harvester;
use netatmo_harvest::ingest::measure::parse_measure_response;
use netatmo_harvest::ingest::public_data::{parse_public_data, PublicStation};
use netatmo_harvest::ingest::NetatmoApi;
use netatmo_harvest::model::{BoundingBox, DeviceModule, MeasureEntry, MeasureQuery};
use netatmo_harvest::store::{load_device_module_pairs, measurement_file_name};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const T: i64 = 1_672_531_200; // 2023-01-01T00:00:00Z
const DAY: i64 = 86_400;

const STATIONS_JSON: &str = r#"{
  "status": "ok",
  "body": [
    {
      "_id": "70:ee:50:00:00:01",
      "place": { "location": [9.19, 45.4642], "altitude": 122, "city": "Milano" },
      "modules": ["02:00:00:00:00:a1", "05:00:00:00:00:b1"]
    },
    {
      "_id": "70:ee:50:00:00:02",
      "place": { "location": [9.21, 45.48], "altitude": 130 },
      "modules": ["02:00:00:00:00:a2"]
    }
  ]
}"#;

/// Fake API: scripted getpublicdata answers, getmeasure answers per module.
struct FakeNetatmo {
    public_data: RefCell<VecDeque<Result<Vec<PublicStation>, ApiError>>>,
    public_calls: Cell<u32>,
    measure_pages: RefCell<Vec<(String, VecDeque<Vec<MeasureEntry>>)>>,
    measure_calls: Cell<u32>,
}

impl FakeNetatmo {
    fn new() -> Self {
        Self {
            public_data: RefCell::new(VecDeque::new()),
            public_calls: Cell::new(0),
            measure_pages: RefCell::new(Vec::new()),
            measure_calls: Cell::new(0),
        }
    }

    fn push_public(&self, answer: Result<Vec<PublicStation>, ApiError>) {
        self.public_data.borrow_mut().push_back(answer);
    }

    fn push_measure(&self, module_id: &str, json: &str) {
        let page = parse_measure_response(json).expect("test page parses");
        let mut pages = self.measure_pages.borrow_mut();
        match pages.iter_mut().find(|(m, _)| m == module_id) {
            Some((_, queue)) => queue.push_back(page),
            None => pages.push((module_id.to_string(), VecDeque::from([page]))),
        }
    }
}

impl NetatmoApi for FakeNetatmo {
    fn get_public_data(&self, _: &str, _: &BoundingBox) -> Result<Vec<PublicStation>, ApiError> {
        self.public_calls.set(self.public_calls.get() + 1);
        self.public_data.borrow_mut().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn get_measure(&self, _: &str, query: &MeasureQuery) -> Result<Vec<MeasureEntry>, ApiError> {
        self.measure_calls.set(self.measure_calls.get() + 1);
        let mut pages = self.measure_pages.borrow_mut();
        Ok(pages
            .iter_mut()
            .find(|(m, _)| *m == query.module_id)
            .and_then(|(_, queue)| queue.pop_front())
            .unwrap_or_default())
    }
}

fn measure_page(beg_time: i64, temperature: f64) -> String {
    format!(
        r#"{{"status":"ok","body":[{{"beg_time":{},"step_time":86400,"value":[[{},80,1015.5]]}}]}}"#,
        beg_time, temperature
    )
}

fn config(output_dir: &std::path::Path) -> HarvestConfig {
    let mut config = HarvestConfig {
        fetch: FetchPolicy {
            request_delay_ms: 0,
            ..FetchPolicy::default()
        },
        regions: vec![
            RegionConfig { name: "north".to_string(), lat_ne: 45.56, lon_ne: 9.24, lat_sw: 45.50, lon_sw: 9.14 },
            RegionConfig { name: "centre".to_string(), lat_ne: 45.50, lon_ne: 9.24, lat_sw: 45.44, lon_sw: 9.14 },
        ],
        ..HarvestConfig::default()
    };
    config.output.directory = output_dir.display().to_string();
    config
}

fn server_error() -> Result<Vec<PublicStation>, ApiError> {
    Err(ApiError::HttpStatus {
        url: "https://api.netatmo.com/api/getpublicdata".to_string(),
        status: 500,
        body: "{}".to_string(),
    })
}

// ---------------------------------------------------------------------------
// 1. Station discovery
// ---------------------------------------------------------------------------

#[test]
fn test_discovery_retries_then_merges_regions() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeNetatmo::new();

    // Region "north": two failures, then the stations.
    api.push_public(server_error());
    api.push_public(Ok(Vec::new()));
    api.push_public(Ok(parse_public_data(STATIONS_JSON).unwrap()));
    // Region "centre": the first station again, found at once.
    api.push_public(Ok(parse_public_data(STATIONS_JSON).unwrap()[..1].to_vec()));

    let harvester = Harvester::new(config(dir.path()), api, "tok");
    let summary = harvester.discover_stations(&harvester.configured_regions());

    assert_eq!(summary.regions_found, 2);
    assert_eq!(summary.regions_failed, 0);
    assert_eq!(summary.stations.len(), 2, "overlapping regions merge by station id");
    assert_eq!(summary.stations["70:ee:50:00:00:02"].city, "no city");
}

#[test]
fn test_dead_region_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeNetatmo::new();
    for _ in 0..6 {
        api.push_public(server_error());
    }
    api.push_public(Ok(parse_public_data(STATIONS_JSON).unwrap()));

    let harvester = Harvester::new(config(dir.path()), api, "tok");
    let summary = harvester.discover_stations(&harvester.configured_regions());

    assert_eq!(summary.regions_failed, 1);
    assert_eq!(summary.regions_found, 1);
    assert_eq!(summary.stations.len(), 2);
}

// ---------------------------------------------------------------------------
// 2 + 3. Directory round trip and measurement download
// ---------------------------------------------------------------------------

#[test]
fn test_full_pipeline_writes_directory_and_series() {
    let dir = tempfile::tempdir().unwrap();
    let stations_csv = dir.path().join("stations.csv");
    let series_dir = dir.path().join("series");

    let api = FakeNetatmo::new();
    api.push_public(Ok(parse_public_data(STATIONS_JSON).unwrap()));

    // a1: three daily pages covering the whole range.
    api.push_measure("02:00:00:00:00:a1", &measure_page(T, 4.5));
    api.push_measure("02:00:00:00:00:a1", &measure_page(T + DAY, 5.5));
    api.push_measure("02:00:00:00:00:a1", &measure_page(T + 2 * DAY, 6.5));
    // a2: one page, then nothing.
    api.push_measure("02:00:00:00:00:a2", &measure_page(T, 7.0));

    let mut config = config(&series_dir);
    config.regions.truncate(1);
    let harvester = Harvester::new(config, api, "tok");

    let summary = harvester
        .write_stations(&harvester.configured_regions(), &stations_csv)
        .expect("directory written");
    assert_eq!(summary.stations.len(), 2);

    let pairs = load_device_module_pairs(&stations_csv).expect("directory readable");
    assert_eq!(
        pairs,
        vec![
            DeviceModule::new("70:ee:50:00:00:01", "02:00:00:00:00:a1"),
            DeviceModule::new("70:ee:50:00:00:02", "02:00:00:00:00:a2"),
        ],
        "rain gauge 05: is not selected"
    );

    let summary = harvester
        .download_measurements(&pairs, T, T + 3 * DAY, &series_dir)
        .expect("download succeeds");

    assert_eq!(summary.pairs_completed, 1);
    assert_eq!(summary.pairs_partial, 1);
    assert_eq!(summary.rows_written, 4);

    let a1 = fs::read_to_string(series_dir.join(measurement_file_name(&pairs[0]))).unwrap();
    assert_eq!(
        a1.lines().collect::<Vec<_>>(),
        vec![
            "acquisition_time,temperature,humidity,pressure",
            "202301010000,4.5,80,1015.5",
            "202301020000,5.5,80,1015.5",
            "202301030000,6.5,80,1015.5",
        ]
    );

    let a2 = fs::read_to_string(series_dir.join(measurement_file_name(&pairs[1]))).unwrap();
    assert_eq!(a2.lines().count(), 2, "header plus the single page");
}

#[test]
fn test_rerun_appends_without_second_header() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeNetatmo::new();
    api.push_measure("02:00:00:00:00:a1", &measure_page(T, 1.0));
    api.push_measure("02:00:00:00:00:a1", &measure_page(T + DAY, 2.0));

    let harvester = Harvester::new(config(dir.path()), api, "tok");
    let pairs = vec![DeviceModule::new("70:ee:50:00:00:01", "02:00:00:00:00:a1")];

    harvester.download_measurements(&pairs, T, T + DAY, dir.path()).unwrap();
    harvester.download_measurements(&pairs, T + DAY, T + 2 * DAY, dir.path()).unwrap();

    let text = fs::read_to_string(dir.path().join(measurement_file_name(&pairs[0]))).unwrap();
    let headers = text.lines().filter(|l| l.starts_with("acquisition_time")).count();
    assert_eq!(headers, 1);
    assert_eq!(text.lines().count(), 3);
}
