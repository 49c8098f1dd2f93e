//! Query parameters for the nearby-locations endpoint.

use serde::{Deserialize, Serialize};

use super::model::Coordinates;

/// Parameters of a nearby-locations lookup.
///
/// Defaults mirror what the recommendation backend expects when the client has
/// no better information (campus coordinates, 10 km radius, most-reviewed first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub limit: u32,
    pub radius: f64,
    pub categories: Vec<String>,
    pub cur_open: u8,
    pub tag: Option<Vec<String>>,
    pub sort_by: String,
}

impl Default for NearbyQuery {
    fn default() -> Self {
        Self {
            latitude: 32.8723812680163,
            longitude: -117.21242234341588,
            limit: 20,
            radius: 10000.0,
            categories: vec!["any".to_string()],
            cur_open: 0,
            tag: None,
            sort_by: "review_count".to_string(),
        }
    }
}

impl NearbyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.latitude = coordinates.latitude;
        self.longitude = coordinates.longitude;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts results to places that are open right now.
    pub fn open_now(mut self, open: bool) -> Self {
        self.cur_open = u8::from(open);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn sorted_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self
    }

    /// Serialises the query into URL query pairs.
    ///
    /// `categories` and `tag` are comma-joined and left out entirely when empty.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("limit", self.limit.to_string()),
            ("radius", self.radius.to_string()),
            ("cur_open", self.cur_open.to_string()),
            ("sort_by", self.sort_by.clone()),
        ];

        let categories = self.categories.join(",");
        if !categories.is_empty() {
            pairs.push(("categories", categories));
        }

        if let Some(tag) = self.tag.as_ref().map(|t| t.join(",")) {
            if !tag.is_empty() {
                pairs.push(("tag", tag));
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn default_query_pairs() {
        let pairs = NearbyQuery::default().to_query_pairs();
        assert_eq!(value(&pairs, "limit"), Some("20"));
        assert_eq!(value(&pairs, "radius"), Some("10000"));
        assert_eq!(value(&pairs, "categories"), Some("any"));
        assert_eq!(value(&pairs, "cur_open"), Some("0"));
        assert_eq!(value(&pairs, "sort_by"), Some("review_count"));
        assert_eq!(value(&pairs, "tag"), None);
    }

    #[test]
    fn joins_categories_and_tags() {
        let pairs = NearbyQuery::new()
            .with_categories(["food", "drinks"])
            .with_tags(["cozy", "late night"])
            .open_now(true)
            .to_query_pairs();

        assert_eq!(value(&pairs, "categories"), Some("food,drinks"));
        assert_eq!(value(&pairs, "tag"), Some("cozy,late night"));
        assert_eq!(value(&pairs, "cur_open"), Some("1"));
    }

    #[test]
    fn omits_empty_lists() {
        let pairs = NearbyQuery::new()
            .with_categories(Vec::<String>::new())
            .with_tags(Vec::<String>::new())
            .to_query_pairs();

        assert_eq!(value(&pairs, "categories"), None);
        assert_eq!(value(&pairs, "tag"), None);
    }
}
