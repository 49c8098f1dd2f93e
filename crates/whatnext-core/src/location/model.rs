//! Location payload returned by the recommendation backend.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Haversine distance to `other`, in meters.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

/// GeoJSON point as stored by the backend (`[longitude, latitude]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJson {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

/// Weekly opening hours. Each day holds `["HHMM", ..., "HHMM"]`; the first entry
/// is the opening time and the last one the closing time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hours {
    pub monday: Option<Vec<String>>,
    pub tuesday: Option<Vec<String>>,
    pub wednesday: Option<Vec<String>>,
    pub thursday: Option<Vec<String>>,
    pub friday: Option<Vec<String>>,
    pub saturday: Option<Vec<String>>,
    pub sunday: Option<Vec<String>>,
}

impl Hours {
    fn day(&self, weekday: Weekday) -> Option<&Vec<String>> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    /// Returns `(open, close)` for the given day, if the day is listed.
    pub fn hours_for(&self, weekday: Weekday) -> Option<(&str, &str)> {
        let times = self.day(weekday)?;
        let open = times.first()?;
        let close = times.last()?;
        Some((open.as_str(), close.as_str()))
    }

    /// Human readable hours keyed by full weekday name, e.g. `"Monday" -> "09:00 - 17:30"`.
    pub fn formatted_hours(&self) -> BTreeMap<String, String> {
        const DAYS: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];

        DAYS.iter()
            .filter_map(|day| {
                let (open, close) = self.hours_for(*day)?;
                Some((
                    weekday_name(*day).to_string(),
                    format!("{} - {}", insert_every(open, ':', 2), insert_every(close, ':', 2)),
                ))
            })
            .collect()
    }

    /// Whether the place is open at the given local time.
    ///
    /// `"0000" - "0000"` means open around the clock. A closing time earlier than
    /// the opening time wraps past midnight. Days without an entry are closed.
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let Some((open, close)) = self.hours_for(at.weekday()) else {
            return false;
        };

        if open == "0000" && close == "0000" {
            return true;
        }

        let now = at.hour() * 100 + at.minute();
        let opening: u32 = open.replace(':', "").parse().unwrap_or(0);
        let closing: u32 = close.replace(':', "").parse().unwrap_or(2400);

        if closing < opening {
            now >= opening || now < closing
        } else {
            now >= opening && now < closing
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn insert_every(value: &str, separator: char, n: usize) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / n);
    for (i, ch) in value.chars().enumerate() {
        if i > 0 && i % n == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// A ranked place recommendation.
///
/// The card stack treats this as an opaque payload keyed by `business_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub business_id: String,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub display_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub stars: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub cur_open: Option<i32>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub tag: Option<Vec<String>>,
    #[serde(default)]
    pub hours: Option<Hours>,
    pub location: GeoJson,
    #[serde(default)]
    pub price: Option<String>,
}

impl Location {
    /// Creates a location with only the required fields set.
    pub fn new(business_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            name: name.into(),
            image_url: None,
            phone: None,
            display_phone: None,
            address: None,
            city: None,
            state: None,
            postal_code: None,
            latitude: None,
            longitude: None,
            stars: None,
            review_count: None,
            cur_open: None,
            categories: None,
            tag: None,
            hours: None,
            location: GeoJson {
                kind: "Point".to_string(),
                coordinates: Vec::new(),
            },
            price: None,
        }
    }

    /// Coordinates of the place, preferring the flat fields over the GeoJSON point.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => match self.location.coordinates.as_slice() {
                [lon, lat] => Some(Coordinates::new(*lat, *lon)),
                _ => None,
            },
        }
    }

    /// Distance from `from` in meters, when the place has coordinates.
    pub fn distance_meters(&self, from: &Coordinates) -> Option<f64> {
        self.coordinates().map(|here| from.distance_to(&here))
    }

    /// Single-line postal address, only when every component is present.
    pub fn full_address(&self) -> Option<String> {
        match (&self.address, &self.city, &self.state, &self.postal_code) {
            (Some(address), Some(city), Some(state), Some(postal)) => {
                Some(format!("{address}, {city}, {state} {postal}"))
            }
            _ => None,
        }
    }
}
