//! Location domain module.
//!
//! - `model`: the `Location` payload, opening hours and coordinates
//! - `query`: `NearbyQuery`, parameters of the nearby-locations endpoint
//! - `provider`: collaborator trait for fetching nearby locations

mod model;
mod provider;
mod query;

pub use model::{Coordinates, GeoJson, Hours, Location};
pub use provider::NearbyLocationProvider;
pub use query::NearbyQuery;
