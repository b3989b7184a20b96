/// netatmo_harvest: public Netatmo weather station harvester.
///
/// # Module structure
///
/// ```text
/// netatmo_harvest
/// ├── model       — shared data types (StationRecord, MeasureEntry, BoundingBox, …)
/// ├── error       — ApiError / HarvestError
/// ├── config      — harvest.toml loader and credentials from the environment
/// ├── ingest
/// │   ├── client      — blocking HTTP client, OAuth token refresh
/// │   ├── public_data — getpublicdata JSON parsing
/// │   ├── measure     — getmeasure parameters + JSON parsing
/// │   └── fixtures (test only) — representative API response payloads
/// ├── locator     — bounded re-attempt loop for station discovery
/// ├── fetcher     — paged, paced historical measurement walk
/// ├── store       — station directory and measurement series CSVs
/// ├── timestamps  — date parsing and formatting helpers
/// └── harvest     — per-region / per-pair orchestration used by the binary
/// ```

/// Public modules
pub mod config;
pub mod error;
pub mod fetcher;
pub mod harvest;
pub mod ingest;
pub mod locator;
pub mod model;
pub mod store;
pub mod timestamps;
