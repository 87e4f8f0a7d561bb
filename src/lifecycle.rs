use tracing::{error, info, warn};

use crate::db::Store;
use crate::error::ListingError;
use crate::listing::normalize_timestamp;
use crate::models::{Artist, ListingForm, NewShow, Show, ShowForm, Venue};

pub fn create_venue(store: &mut Store, form: ListingForm) -> Result<Venue, ListingError> {
    let fields = form.validate().inspect_err(log_rejected)?;
    let venue = store.insert_venue(&fields).map_err(store_failure)?;
    info!(venue_id = venue.id, "venue {} was successfully listed", venue.name);
    Ok(venue)
}

pub fn update_venue(store: &mut Store, id: i64, form: ListingForm) -> Result<Venue, ListingError> {
    let fields = form.validate().inspect_err(log_rejected)?;
    let venue = store
        .update_venue(id, &fields)
        .map_err(store_failure)?
        .ok_or_else(|| ListingError::not_found("venue", id))?;
    info!(venue_id = id, "venue {} was successfully updated", venue.name);
    Ok(venue)
}

pub fn delete_venue(store: &mut Store, id: i64) -> Result<(), ListingError> {
    if !store.delete_venue(id).map_err(store_failure)? {
        return Err(ListingError::not_found("venue", id));
    }
    info!(venue_id = id, "venue deleted");
    Ok(())
}

pub fn create_artist(store: &mut Store, form: ListingForm) -> Result<Artist, ListingError> {
    let fields = form.validate().inspect_err(log_rejected)?;
    let artist = store.insert_artist(&fields).map_err(store_failure)?;
    info!(artist_id = artist.id, "artist {} was successfully listed", artist.name);
    Ok(artist)
}

pub fn update_artist(store: &mut Store, id: i64, form: ListingForm) -> Result<Artist, ListingError> {
    let fields = form.validate().inspect_err(log_rejected)?;
    let artist = store
        .update_artist(id, &fields)
        .map_err(store_failure)?
        .ok_or_else(|| ListingError::not_found("artist", id))?;
    info!(artist_id = id, "artist {} was successfully updated", artist.name);
    Ok(artist)
}

/// Shows are immutable once created; there is no update or delete.
pub fn create_show(store: &mut Store, form: ShowForm) -> Result<Show, ListingError> {
    let (artist_id, venue_id, raw_start) = form.validate().inspect_err(log_rejected)?;
    let start_time = normalize_timestamp(&raw_start).inspect_err(log_rejected)?;
    let show = store
        .insert_show(&NewShow {
            artist_id,
            venue_id,
            start_time,
        })
        .map_err(store_failure)?;
    info!(show_id = show.id, artist_id, venue_id, "show was successfully listed");
    Ok(show)
}

fn log_rejected(err: &ListingError) {
    warn!(kind = err.kind(), "rejected submission: {err}");
}

fn store_failure(err: rusqlite::Error) -> ListingError {
    error!("store operation failed, rolled back: {err}");
    ListingError::Store(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, city: &str) -> ListingForm {
        ListingForm {
            name: Some(name.into()),
            city: Some(city.into()),
            state: Some("CA".into()),
            phone: Some("123-123-1234".into()),
            genres: vec!["Jazz".into()],
            facebook_link: Some("https://www.facebook.com/x".into()),
            website: Some("https://example.com".into()),
            seeking_talent: Some(true),
            seeking_description: Some("Open mic on Sundays".into()),
            ..ListingForm::default()
        }
    }

    fn store() -> Store {
        Store::open_in_memory().expect("store")
    }

    #[test]
    fn created_venue_matches_submission() {
        let mut store = store();
        let venue = create_venue(&mut store, form("The Musical Hop", "San Francisco")).expect("create");
        let found = store.find_venue(venue.id).expect("query").expect("present");
        assert_eq!(found.name, "The Musical Hop");
        assert_eq!(found.city, "San Francisco");
        assert_eq!(found.website.as_deref(), Some("https://example.com"));
        assert!(found.seeking_talent);
        assert_eq!(found.seeking_description.as_deref(), Some("Open mic on Sundays"));
    }

    #[test]
    fn invalid_venue_is_not_written() {
        let mut store = store();
        let mut bad = form("The Musical Hop", "San Francisco");
        bad.phone = None;
        let err = create_venue(&mut store, bad).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(store.list_venues().expect("list").is_empty());
    }

    #[test]
    fn update_of_missing_artist_is_not_found_and_changes_nothing() {
        let mut store = store();
        let existing = create_artist(&mut store, form("Guns N Petals", "San Francisco")).expect("create");
        let err = update_artist(&mut store, existing.id + 100, form("Ghost", "Nowhere")).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(store.list_artists().expect("list"), vec![existing]);
    }

    #[test]
    fn update_rewrites_fields() {
        let mut store = store();
        let venue = create_venue(&mut store, form("The Musical Hop", "San Francisco")).expect("create");
        let updated = update_venue(&mut store, venue.id, form("The Musical Hop", "Oakland")).expect("update");
        assert_eq!(updated.id, venue.id);
        let found = store.find_venue(venue.id).expect("query").expect("present");
        assert_eq!(found.city, "Oakland");
    }

    #[test]
    fn show_with_bad_time_is_a_parse_error() {
        let mut store = store();
        let venue = create_venue(&mut store, form("The Musical Hop", "San Francisco")).expect("venue");
        let artist = create_artist(&mut store, form("Guns N Petals", "San Francisco")).expect("artist");
        let err = create_show(
            &mut store,
            ShowForm {
                artist_id: Some(artist.id.to_string()),
                venue_id: Some(venue.id.to_string()),
                start_time: Some("whenever".into()),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(store.list_shows().expect("list").is_empty());
    }

    #[test]
    fn show_start_is_normalized() {
        let mut store = store();
        let venue = create_venue(&mut store, form("The Musical Hop", "San Francisco")).expect("venue");
        let artist = create_artist(&mut store, form("Guns N Petals", "San Francisco")).expect("artist");
        let show = create_show(
            &mut store,
            ShowForm {
                artist_id: Some(artist.id.to_string()),
                venue_id: Some(venue.id.to_string()),
                start_time: Some("2035-01-01T10:00".into()),
            },
        )
        .expect("show");
        assert_eq!(show.start_time, "2035-01-01 10:00:00");
        assert_eq!(store.find_show(show.id).expect("query"), Some(show));
    }

    #[test]
    fn show_for_unknown_venue_is_a_store_error() {
        let mut store = store();
        let artist = create_artist(&mut store, form("Guns N Petals", "San Francisco")).expect("artist");
        let err = create_show(
            &mut store,
            ShowForm {
                artist_id: Some(artist.id.to_string()),
                venue_id: Some("77".into()),
                start_time: Some("2035-01-01 10:00:00".into()),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "store");
    }

    #[test]
    fn submitted_values_are_trimmed_and_blank_optionals_dropped() {
        let mut store = store();
        let mut padded = form("  The Musical Hop ", " San Francisco");
        padded.genres = vec![" Jazz ".into(), "Swing".into()];
        padded.website = Some("   ".into());
        padded.address = Some(" 1015 Folsom Street ".into());
        let venue = create_venue(&mut store, padded).expect("create");

        let found = store.find_venue(venue.id).expect("query").expect("present");
        assert_eq!(found, venue);
        assert_eq!(found.name, "The Musical Hop");
        assert_eq!(found.city, "San Francisco");
        assert_eq!(found.genres.as_str(), "Jazz, Swing");
        assert_eq!(found.website, None);
        assert_eq!(found.address.as_deref(), Some("1015 Folsom Street"));
    }

    #[test]
    fn deleting_missing_venue_is_not_found() {
        let mut store = store();
        assert_eq!(delete_venue(&mut store, 5).unwrap_err().kind(), "not_found");
    }
}
