use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::timing::{classify, Timing};
use crate::error::ListingError;
use crate::models::{Artist, Show, Venue};

/// A show with both sides of the join resolved to display names.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ShowSummary {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub start_time: String,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShowBreakdown {
    pub past_shows: Vec<ShowSummary>,
    pub upcoming_shows: Vec<ShowSummary>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

/// id -> name lookups for the two entities a show joins.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    venues: HashMap<i64, String>,
    artists: HashMap<i64, String>,
}

impl NameIndex {
    pub fn new(venues: &[Venue], artists: &[Artist]) -> Self {
        Self {
            venues: venues.iter().map(|v| (v.id, v.name.clone())).collect(),
            artists: artists.iter().map(|a| (a.id, a.name.clone())).collect(),
        }
    }

    pub fn summarize(&self, show: &Show) -> Result<ShowSummary, ListingError> {
        let venue_name = self
            .venues
            .get(&show.venue_id)
            .ok_or_else(|| ListingError::not_found("venue", show.venue_id))?;
        let artist_name = self
            .artists
            .get(&show.artist_id)
            .ok_or_else(|| ListingError::not_found("artist", show.artist_id))?;
        Ok(ShowSummary {
            show_id: show.id,
            venue_id: show.venue_id,
            venue_name: venue_name.clone(),
            artist_id: show.artist_id,
            artist_name: artist_name.clone(),
            start_time: show.start_time.clone(),
        })
    }
}

/// Splits shows into (past, upcoming), keeping input order inside each side.
pub fn partition<'a>(
    shows: &'a [Show],
    now: NaiveDateTime,
) -> Result<(Vec<&'a Show>, Vec<&'a Show>), ListingError> {
    let mut past = Vec::new();
    let mut upcoming = Vec::new();
    for show in shows {
        match classify(&show.start_time, now)? {
            Timing::Past => past.push(show),
            Timing::Upcoming => upcoming.push(show),
        }
    }
    Ok((past, upcoming))
}

pub fn aggregate(
    shows: &[Show],
    now: NaiveDateTime,
    names: &NameIndex,
) -> Result<ShowBreakdown, ListingError> {
    let (past, upcoming) = partition(shows, now)?;
    let past_shows = past
        .into_iter()
        .map(|show| names.summarize(show))
        .collect::<Result<Vec<_>, _>>()?;
    let upcoming_shows = upcoming
        .into_iter()
        .map(|show| names.summarize(show))
        .collect::<Result<Vec<_>, _>>()?;

    // Counts come from the same partitioning pass as the lists.
    Ok(ShowBreakdown {
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

/// Upcoming show count per venue id. Venues without shows are absent.
pub fn upcoming_counts(
    shows: &[Show],
    now: NaiveDateTime,
) -> Result<HashMap<i64, usize>, ListingError> {
    let mut per_venue: HashMap<i64, Vec<Show>> = HashMap::new();
    for show in shows {
        per_venue.entry(show.venue_id).or_default().push(show.clone());
    }

    let mut counts = HashMap::with_capacity(per_venue.len());
    for (venue_id, venue_shows) in per_venue {
        let (_, upcoming) = partition(&venue_shows, now)?;
        counts.insert(venue_id, upcoming.len());
    }
    Ok(counts)
}
