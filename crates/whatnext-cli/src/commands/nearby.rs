use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use whatnext_application::BrowseUseCase;
use whatnext_core::config::AppConfig;
use whatnext_core::location::{Coordinates, NearbyQuery};
use whatnext_interaction::LocationService;

use crate::{browse, helper};

#[derive(Args, Debug, Default)]
pub struct NearbyArgs {
    /// Latitude to search around
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude to search around
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,
    /// Maximum number of places
    #[arg(long)]
    limit: Option<u32>,
    /// Search radius in meters
    #[arg(long)]
    radius: Option<f64>,
    /// Comma separated categories
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,
    /// Only places open right now
    #[arg(long)]
    open: bool,
    /// Comma separated tags
    #[arg(long, value_delimiter = ',')]
    tag: Vec<String>,
    /// Sort key understood by the backend, e.g. `review_count` or `stars`
    #[arg(long)]
    sort_by: Option<String>,
}

impl NearbyArgs {
    /// Layers the flags over the configured query defaults.
    fn apply(self, mut query: NearbyQuery) -> NearbyQuery {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            query = query.at(Coordinates::new(lat, lon));
        } else if self.lat.is_some() || self.lon.is_some() {
            tracing::warn!("[Nearby] --lat and --lon must be given together; ignoring");
        }
        if let Some(limit) = self.limit {
            query = query.with_limit(limit);
        }
        if let Some(radius) = self.radius {
            query = query.with_radius(radius);
        }
        if !self.categories.is_empty() {
            query = query.with_categories(self.categories);
        }
        if self.open {
            query = query.open_now(true);
        }
        if !self.tag.is_empty() {
            query = query.with_tags(self.tag);
        }
        if let Some(sort_by) = self.sort_by {
            query = query.sorted_by(sort_by);
        }
        query
    }
}

pub async fn run(config: AppConfig, args: NearbyArgs) -> Result<()> {
    let query = args.apply(config.nearby.clone());
    let provider = Arc::new(LocationService::from_config(&config.api)?);
    let usecase = BrowseUseCase::new(provider, config.cards);

    let mut stack = usecase.load_nearby(&query).await?;
    if stack.is_empty() {
        println!("{}", "No places found nearby.".yellow());
        return Ok(());
    }

    let mut rl = helper::editor()?;
    browse::run(
        &mut rl,
        &mut stack,
        Coordinates::new(query.latitude, query.longitude),
    )
}
