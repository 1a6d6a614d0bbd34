//! Google Geocoding API client.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use crate::domain::models::{Coordinates, GeocodeStatus, MapSettings, DEFAULT_USER_AGENT};
use crate::error::{AppError, Result};
use crate::service::http::{create_client, parse_url};

const SERVICE: &str = "geocoding";

/// Known-good address used to probe the key before a full run.
pub const PROBE_ADDRESS: &str = "서울특별시 강남구 테헤란로 152";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: GeocodeStatus,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn first_location(&self) -> Option<Coordinates> {
        self.results.first().map(|r| Coordinates {
            lat: r.geometry.location.lat,
            lng: r.geometry.location.lng,
        })
    }

    fn error_message(&self) -> &str {
        self.error_message.as_deref().unwrap_or("")
    }
}

pub struct Geocoder {
    client: Client,
    endpoint: Url,
    settings: MapSettings,
}

impl Geocoder {
    pub fn new(settings: &MapSettings) -> Result<Self> {
        if !settings.has_usable_key() {
            return Err(AppError::MissingApiKey);
        }
        Ok(Self {
            client: create_client(
                DEFAULT_USER_AGENT,
                Duration::from_secs(settings.timeout_secs),
            )?,
            endpoint: parse_url(&settings.geocode_url)?,
            settings: settings.clone(),
        })
    }

    /// Coordinates of the best match for `address`, or `None` when the API
    /// has no answer. Failures are logged, never returned.
    pub async fn geocode(&self, address: &str) -> Option<Coordinates> {
        let cleaned = clean_address(address);
        let timeout = Duration::from_secs(self.settings.timeout_secs);
        let mut retries = 0;

        loop {
            if self.settings.pacing_ms > 0 {
                sleep(Duration::from_millis(self.settings.pacing_ms)).await;
            }

            let response = match self.request(&cleaned, timeout).await {
                Ok(response) => response,
                Err(e) => {
                    log::error!("[GEOCODE] Request failed: {}", e);
                    return None;
                }
            };

            match response.status {
                GeocodeStatus::Ok => {
                    let location = response.first_location();
                    if location.is_none() {
                        log::warn!("[GEOCODE] OK without results for '{}'", cleaned);
                    }
                    return location;
                }
                GeocodeStatus::ZeroResults => {
                    log::warn!("[GEOCODE] No results for '{}'", cleaned);
                    return None;
                }
                GeocodeStatus::OverQueryLimit if retries < self.settings.max_retries => {
                    retries += 1;
                    log::warn!(
                        "[GEOCODE] Over query limit, retrying in {}ms ({}/{})",
                        self.settings.retry_delay_ms,
                        retries,
                        self.settings.max_retries
                    );
                    sleep(Duration::from_millis(self.settings.retry_delay_ms)).await;
                }
                GeocodeStatus::RequestDenied => {
                    log::error!("[GEOCODE] API key rejected: {}", response.error_message());
                    return None;
                }
                status => {
                    log::warn!(
                        "[GEOCODE] API error {}: {}",
                        status.as_str(),
                        response.error_message()
                    );
                    return None;
                }
            }
        }
    }

    /// Geocode a known address to check the key, quota and connectivity.
    pub async fn test_connection(&self) -> Result<()> {
        let key_prefix: String = self.settings.api_key.chars().take(8).collect();
        log::info!("[GEOCODE] Testing API connection");
        log::info!("[GEOCODE]   test address: {}", PROBE_ADDRESS);
        log::info!("[GEOCODE]   API key: {}...", key_prefix);

        let timeout = Duration::from_secs(self.settings.probe_timeout_secs);
        let response = self.request(PROBE_ADDRESS, timeout).await?;

        match response.status {
            GeocodeStatus::Ok => {
                log::info!("[GEOCODE]   connection OK");
                Ok(())
            }
            GeocodeStatus::RequestDenied => {
                let message = match response.error_message() {
                    "" => "API key is not valid",
                    message => message,
                };
                Err(AppError::service(SERVICE, format!("API key error: {}", message)))
            }
            GeocodeStatus::OverQueryLimit => Err(AppError::service(SERVICE, "API quota exceeded")),
            status => Err(AppError::service(
                SERVICE,
                format!("{} - {}", status.as_str(), response.error_message()),
            )),
        }
    }

    async fn request(&self, address: &str, timeout: Duration) -> Result<GeocodeResponse> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("address", address),
                ("key", self.settings.api_key.as_str()),
                ("language", self.settings.language.as_str()),
                ("region", self.settings.region.as_str()),
            ])
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::service(SERVICE, format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<GeocodeResponse>()
            .await
            .map_err(|e| AppError::Parse(format!("Invalid geocoding response: {}", e)))
    }
}

/// Addresses copied from web pages often span lines.
pub fn clean_address(address: &str) -> String {
    address.trim().replace(['\n', '\r'], " ")
}
