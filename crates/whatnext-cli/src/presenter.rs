//! Terminal rendering of location cards.

use chrono::Local;
use colored::Colorize;
use whatnext_core::cards::DetailPresenter;
use whatnext_core::location::{Coordinates, Location};

const WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Prints the detail view of a tapped card to stdout.
pub struct TerminalPresenter {
    origin: Coordinates,
}

impl TerminalPresenter {
    pub fn new(origin: Coordinates) -> Self {
        Self { origin }
    }
}

impl DetailPresenter<Location> for TerminalPresenter {
    fn present(&self, location: &Location) {
        println!();
        println!("{}", format!("== {} ==", location.name).bright_magenta().bold());

        let rating = rating_line(location);
        if !rating.is_empty() {
            println!("{}", rating.yellow());
        }
        if let Some(categories) = location.categories.as_ref().filter(|c| !c.is_empty()) {
            println!("{}", categories.join(", ").bright_black());
        }
        if let Some(address) = location.full_address().or_else(|| location.address.clone()) {
            println!("{}", address);
        }
        if let Some(phone) = location.display_phone.as_ref().or(location.phone.as_ref()) {
            println!("{}", phone);
        }

        let mut status = Vec::new();
        if let Some(meters) = location.distance_meters(&self.origin) {
            status.push(format!("{} away", format_distance(meters)));
        }
        if let Some(hours) = &location.hours {
            if hours.is_open_at(Local::now().naive_local()) {
                status.push("open now".green().to_string());
            } else {
                status.push("closed now".red().to_string());
            }
        }
        if !status.is_empty() {
            println!("{}", status.join(" · "));
        }

        if let Some(hours) = &location.hours {
            let formatted = hours.formatted_hours();
            if !formatted.is_empty() {
                println!("Hours:");
                for day in WEEK {
                    if let Some(range) = formatted.get(day) {
                        println!("  {:<10} {}", day, range);
                    }
                }
            }
        }
        println!();
    }
}

fn rating_line(location: &Location) -> String {
    let mut parts = Vec::new();
    if let Some(stars) = location.stars {
        parts.push(format!("★ {:.1}", stars));
    }
    if let Some(count) = location.review_count {
        parts.push(format!("({} reviews)", count));
    }
    if let Some(price) = &location.price {
        parts.push(price.clone());
    }
    parts.join(" ")
}

/// One-line summary used in card lists.
pub fn summary(location: &Location, origin: &Coordinates) -> String {
    let mut line = location.name.clone();
    if let Some(stars) = location.stars {
        line.push_str(&format!("  ★ {:.1}", stars));
    }
    if let Some(meters) = location.distance_meters(origin) {
        line.push_str(&format!("  {}", format_distance(meters)));
    }
    line
}

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
