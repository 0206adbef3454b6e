//! Postal-code geocoding client (Google Geocoding API shape)

use async_trait::async_trait;
use formdesk_core::models::{GeocodeResponse, GeocodeResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::ServiceError;

#[async_trait]
pub trait GeocodingApi: Send + Sync {
    /// Look up a postal code, returning only address components.
    async fn lookup(&self, postal_code: &str) -> Result<GeocodeResponse, ServiceError>;
}

#[derive(Deserialize)]
struct UpstreamResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

pub struct GeocodingClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl GeocodingClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let http_client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl GeocodingApi for GeocodingClient {
    async fn lookup(&self, postal_code: &str) -> Result<GeocodeResponse, ServiceError> {
        let response = self
            .http_client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", postal_code), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_response(response).await);
        }

        let upstream: UpstreamResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        match upstream.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(GeocodeResponse {
                results: upstream.results,
            }),
            other => Err(ServiceError::Decode(format!("geocoder status {other}"))),
        }
    }
}
