use std::collections::HashMap;

use serde::Serialize;

use crate::models::Venue;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct VenueSummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

/// Buckets venues by (state, city). The input is stably sorted first, so
/// store ordering does not matter and venues keep their relative order
/// within a bucket.
pub fn group_by_location(venues: &[Venue], upcoming: &HashMap<i64, usize>) -> Vec<Area> {
    let mut sorted: Vec<&Venue> = venues.iter().collect();
    sorted.sort_by(|a, b| (&a.state, &a.city).cmp(&(&b.state, &b.city)));

    let mut areas: Vec<Area> = Vec::new();
    for venue in sorted {
        let summary = VenueSummary {
            id: venue.id,
            name: venue.name.clone(),
            num_upcoming_shows: upcoming.get(&venue.id).copied().unwrap_or(0),
        };
        match areas.last_mut() {
            Some(area) if area.state == venue.state && area.city == venue.city => {
                area.venues.push(summary)
            }
            _ => areas.push(Area {
                city: venue.city.clone(),
                state: venue.state.clone(),
                venues: vec![summary],
            }),
        }
    }
    areas
}
