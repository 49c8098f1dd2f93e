//! LocationService - nearby-location lookups.

use async_trait::async_trait;
use reqwest::Client;
use whatnext_core::config::ApiConfig;
use whatnext_core::error::{Result, WhatnextError};
use whatnext_core::location::{Location, NearbyLocationProvider, NearbyQuery};

/// Client for `GET /nearby_locations`.
#[derive(Clone)]
pub struct LocationService {
    client: Client,
    endpoint: String,
}

impl LocationService {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: crate::build_client(api)?,
            endpoint: api.nearby_url(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NearbyLocationProvider for LocationService {
    async fn fetch_nearby(&self, query: &NearbyQuery) -> Result<Vec<Location>> {
        let pairs = query.to_query_pairs();
        tracing::debug!("[LocationService] GET {} {:?}", self.endpoint, pairs);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&pairs)
            .send()
            .await
            .map_err(|err| {
                WhatnextError::transport(None, format!("nearby request failed: {err}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::map_http_error(status, body));
        }

        let bytes = response.bytes().await.map_err(|err| {
            WhatnextError::transport(None, format!("failed to read nearby response: {err}"))
        })?;
        let locations: Vec<Location> = serde_json::from_slice(&bytes)
            .map_err(|err| WhatnextError::decode(format!("bad nearby payload: {err}")))?;

        tracing::debug!("[LocationService] {} locations", locations.len());
        Ok(locations)
    }
}
