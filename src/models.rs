use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ListingError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: String,
    pub facebook_link: String,
    pub website: Option<String>,
    pub genres: Genres,
    pub seeking_talent: bool,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Genres,
    pub address: Option<String>,
    pub facebook_link: String,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Show {
    pub id: i64,
    pub artist_id: i64,
    pub venue_id: i64,
    pub start_time: String,
}

/// Free-text genre list, stored exactly as submitted (e.g. `"Jazz, Folk"`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Genres(String);

impl Genres {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn list(&self) -> Vec<String> {
        self.0
            .split(',')
            .map(|genre| genre.trim().to_string())
            .filter(|genre| !genre.is_empty())
            .collect()
    }
}

/// Fields shared by venues and artists once a form has been validated.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ListingFields {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: Option<String>,
    pub phone: String,
    pub genres: Genres,
    pub facebook_link: String,
    pub website: Option<String>,
    pub seeking_talent: bool,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct NewShow {
    pub artist_id: i64,
    pub venue_id: i64,
    pub start_time: String,
}

/// Raw venue or artist submission as it arrives from the form.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ListingForm {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// One entry per selected option of the multi-select; a single
    /// comma-separated entry is also accepted.
    pub genres: Vec<String>,
    pub facebook_link: Option<String>,
    pub website: Option<String>,
    #[serde(deserialize_with = "checkbox")]
    pub seeking_talent: Option<bool>,
    pub seeking_venue: Option<String>,
    pub seeking_description: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ShowForm {
    pub artist_id: Option<String>,
    pub venue_id: Option<String>,
    pub start_time: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct SearchForm {
    pub search_term: String,
}

impl ListingForm {
    pub fn validate(self) -> Result<ListingFields, ListingError> {
        Ok(ListingFields {
            name: required("name", self.name)?,
            city: required("city", self.city)?,
            state: required("state", self.state)?,
            phone: required("phone", self.phone)?,
            genres: Genres::new(required("genres", join_genres(self.genres))?),
            facebook_link: required("facebook_link", self.facebook_link)?,
            address: optional(self.address),
            website: optional(self.website),
            seeking_talent: self.seeking_talent.unwrap_or(false),
            seeking_venue: optional(self.seeking_venue),
            seeking_description: optional(self.seeking_description),
        })
    }
}

impl ShowForm {
    /// Checks presence and id syntax only; `start_time` is parsed by the caller.
    pub fn validate(self) -> Result<(i64, i64, String), ListingError> {
        let artist_id = parse_id("artist_id", required("artist_id", self.artist_id)?)?;
        let venue_id = parse_id("venue_id", required("venue_id", self.venue_id)?)?;
        let start_time = required("start_time", self.start_time)?;
        Ok((artist_id, venue_id, start_time))
    }
}

impl From<&Venue> for ListingFields {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            genres: venue.genres.clone(),
            facebook_link: venue.facebook_link.clone(),
            website: venue.website.clone(),
            seeking_talent: venue.seeking_talent,
            seeking_venue: venue.seeking_venue.clone(),
            seeking_description: venue.seeking_description.clone(),
        }
    }
}

impl From<&Artist> for ListingFields {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            address: artist.address.clone(),
            phone: artist.phone.clone(),
            genres: artist.genres.clone(),
            facebook_link: artist.facebook_link.clone(),
            website: artist.website.clone(),
            seeking_talent: artist.seeking_talent,
            seeking_venue: artist.seeking_venue.clone(),
            seeking_description: artist.seeking_description.clone(),
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ListingError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ListingError::Validation {
            field,
            reason: "is required".to_string(),
        }),
    }
}

fn join_genres(selected: Vec<String>) -> Option<String> {
    let joined = selected
        .iter()
        .map(|genre| genre.trim())
        .filter(|genre| !genre.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    Some(joined)
}

/// HTML checkboxes post `y`/`on` rather than `true`.
fn checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "y" | "yes" | "on" | "true" | "1" => Ok(Some(true)),
            "" | "n" | "no" | "off" | "false" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "`{other}` is not a checkbox value"
            ))),
        },
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_id(field: &'static str, value: String) -> Result<i64, ListingError> {
    value.parse::<i64>().map_err(|_| ListingError::Validation {
        field,
        reason: format!("`{value}` is not a valid id"),
    })
}
