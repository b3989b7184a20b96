/// Representative Netatmo API payloads for parser and loop tests.
///
/// Shapes follow the live API: `getpublicdata` returns `place.location` as
/// `[longitude, latitude]`, and `getmeasure` (optimized form) returns
/// entries of `beg_time` / `step_time` / `value` rows.

/// Two stations near Milano. The first carries a rain gauge (`05:`); the
/// second has no city, two outdoor modules and a wind gauge (`06:`). Neither
/// the rain nor the wind gauge may be selected by the default `02:` prefix.
#[cfg(test)]
pub(crate) fn fixture_public_data_json() -> &'static str {
    r#"{
      "status": "ok",
      "time_server": 1700000000,
      "body": [
        {
          "_id": "70:ee:50:00:00:01",
          "place": {
            "location": [9.1900, 45.4642],
            "timezone": "Europe/Rome",
            "country": "IT",
            "altitude": 122,
            "city": "Milano",
            "street": "Via Torino"
          },
          "mark": 10,
          "measures": {},
          "modules": ["02:00:00:00:00:a1", "05:00:00:00:00:b1"],
          "module_types": { "02:00:00:00:00:a1": "NAModule1", "05:00:00:00:00:b1": "NAModule3" }
        },
        {
          "_id": "70:ee:50:00:00:02",
          "place": {
            "location": [9.2100, 45.4800],
            "timezone": "Europe/Rome",
            "country": "IT",
            "altitude": 130.5
          },
          "mark": 7,
          "measures": {},
          "modules": ["02:00:00:00:00:a2", "02:00:00:00:00:a3", "06:00:00:00:00:c2"],
          "module_types": {}
        }
      ]
    }"#
}

/// Same station listed twice, as the API does when tiles overlap.
#[cfg(test)]
pub(crate) fn fixture_public_data_duplicate_json() -> &'static str {
    r#"{
      "status": "ok",
      "body": [
        { "_id": "70:ee:50:00:00:01", "place": { "location": [9.19, 45.46], "altitude": 122, "city": "Milano" }, "modules": ["02:00:00:00:00:a1"] },
        { "_id": "70:ee:50:00:00:01", "place": { "location": [9.19, 45.46], "altitude": 122, "city": "Milano" }, "modules": ["02:00:00:00:00:a1"] },
        { "_id": "70:ee:50:00:00:03", "place": { "location": [9.30, 45.50], "altitude": 140, "city": "Sesto" }, "modules": [] }
      ]
    }"#
}

/// Valid response for a box with no stations in it.
#[cfg(test)]
pub(crate) fn fixture_public_data_empty_json() -> &'static str {
    r#"{ "status": "ok", "time_server": 1700000000, "body": [] }"#
}

/// Expired token error object.
#[cfg(test)]
pub(crate) fn fixture_error_json() -> &'static str {
    r#"{ "error": { "code": 3, "message": "Access token expired" } }"#
}

/// Daily measurements: two entries, one with a null humidity.
#[cfg(test)]
pub(crate) fn fixture_measure_json() -> &'static str {
    r#"{
      "status": "ok",
      "time_exec": 0.02,
      "body": [
        {
          "beg_time": 1672531200,
          "step_time": 86400,
          "value": [[4.1, 82, 1021.3], [5.0, 79, 1019.8]]
        },
        {
          "beg_time": 1672790400,
          "step_time": 86400,
          "value": [[6.2, null, 1015.0]]
        }
      ]
    }"#
}

/// No data left in the requested window.
#[cfg(test)]
pub(crate) fn fixture_measure_empty_json() -> &'static str {
    r#"{ "status": "ok", "body": [] }"#
}

/// Token refresh response.
#[cfg(test)]
pub(crate) fn fixture_token_json() -> &'static str {
    r#"{
      "access_token": "5c3dd9b22733bf0c008b8f3a|1e8b2bd3a1f4b9a7",
      "refresh_token": "5c3dd9b22733bf0c008b8f3a|c8e1a8a7b6a6f1a0",
      "scope": ["read_station"],
      "expires_in": 10800,
      "expire_in": 10800
    }"#
}
