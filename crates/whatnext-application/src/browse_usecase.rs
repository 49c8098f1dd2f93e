//! Turns fetched or recommended locations into a swipeable card stack.

use std::sync::Arc;

use whatnext_core::cards::{CardStackController, OffsetDecay};
use whatnext_core::chat::LocationBatch;
use whatnext_core::error::Result;
use whatnext_core::location::{Location, NearbyLocationProvider, NearbyQuery};

/// Builds [`CardStackController`]s with a shared card geometry.
pub struct BrowseUseCase {
    provider: Arc<dyn NearbyLocationProvider>,
    decay: OffsetDecay,
}

impl BrowseUseCase {
    pub fn new(provider: Arc<dyn NearbyLocationProvider>, decay: OffsetDecay) -> Self {
        Self { provider, decay }
    }

    /// Fetches nearby locations and stacks them in the order returned.
    ///
    /// An empty result yields an empty stack; transport and decode failures
    /// are returned to the caller.
    pub async fn load_nearby(
        &self,
        query: &NearbyQuery,
    ) -> Result<CardStackController<Location>> {
        tracing::debug!(
            "[BrowseUseCase] loading nearby locations around ({}, {})",
            query.latitude,
            query.longitude
        );
        let locations = self.provider.fetch_nearby(query).await?;
        tracing::info!("[BrowseUseCase] stacking {} nearby locations", locations.len());
        Ok(self.stack(locations))
    }

    /// Stacks the locations of a chat reply, keeping their ranking.
    pub fn from_batch(&self, batch: &LocationBatch) -> CardStackController<Location> {
        self.stack(batch.locations.clone())
    }

    fn stack(&self, locations: Vec<Location>) -> CardStackController<Location> {
        CardStackController::new(locations, self.decay)
    }
}
