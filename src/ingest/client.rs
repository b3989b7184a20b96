/// Blocking HTTP client for the Netatmo API.
///
/// Handles the OAuth refresh-token exchange and implements [`NetatmoApi`]
/// over `reqwest::blocking`. No retries happen here; retry and pagination
/// policy lives in the locator and fetcher.
///
/// API Documentation: https://dev.netatmo.com/apidocumentation/weather

use serde::Deserialize;
use std::time::Duration;

use super::measure::{build_measure_params, parse_measure_response, MEASURE_PATH};
use super::public_data::{parse_public_data, PublicStation, PUBLIC_DATA_PATH};
use super::NetatmoApi;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{BoundingBox, Credentials, MeasureEntry, MeasureQuery};

pub const TOKEN_PATH: &str = "/oauth2/token";

/// Token refresh response
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds
    pub expires_in: Option<u64>,
}

/// Parses the body of a successful token refresh.
pub fn parse_token_response(json: &str) -> Result<AccessToken, ApiError> {
    Ok(serde_json::from_str(json)?)
}

pub struct NetatmoClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl NetatmoClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Request(config.base_url.clone(), e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges the refresh token for a fresh access token.
    pub fn refresh_access_token(&self, credentials: &Credentials) -> Result<AccessToken, ApiError> {
        let url = self.url(TOKEN_PATH);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        let body = self.send(self.http.post(&url).form(&form), &url)?;
        let token = parse_token_response(&body)?;

        log::info!(
            "Obtained access token (expires in {}s)",
            token.expires_in.map_or("?".to_string(), |s| s.to_string())
        );
        Ok(token)
    }

    /// Sends a request and returns the body of a 2xx response.
    fn send(&self, request: reqwest::blocking::RequestBuilder, url: &str) -> Result<String, ApiError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .map_err(|e| ApiError::Request(url.to_string(), e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Request(url.to_string(), e))?;

        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl NetatmoApi for NetatmoClient {
    fn get_public_data(
        &self,
        access_token: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<PublicStation>, ApiError> {
        let url = self.url(PUBLIC_DATA_PATH);
        let request = self
            .http
            .post(&url)
            .query(&[("access_token", access_token)])
            .query(&bbox.query_pairs()[..]);

        let body = self.send(request, &url)?;
        parse_public_data(&body)
    }

    fn get_measure(
        &self,
        access_token: &str,
        query: &MeasureQuery,
    ) -> Result<Vec<MeasureEntry>, ApiError> {
        let url = self.url(MEASURE_PATH);
        log::debug!(
            "getmeasure {} {} [{}, {}]",
            query.device_id,
            query.module_id,
            query.date_begin,
            query.date_end
        );

        let request = self.http.get(&url).query(&build_measure_params(access_token, query));
        let body = self.send(request, &url)?;
        parse_measure_response(&body)
    }
}
