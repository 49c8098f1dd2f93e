use async_trait::async_trait;

use super::model::Location;
use super::query::NearbyQuery;
use crate::error::Result;

/// Source of ranked nearby locations (implemented over HTTP in `whatnext-interaction`).
#[async_trait]
pub trait NearbyLocationProvider: Send + Sync {
    /// Returns locations ordered by rank, highest priority first.
    async fn fetch_nearby(&self, query: &NearbyQuery) -> Result<Vec<Location>>;
}
