mod config;
mod db;
pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod models;
mod utils;

use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::{Form, FormRejection};
use chrono::{Local, NaiveDateTime};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

pub use config::{AppConfig, Cli};
pub use db::Store;
use error::ListingError;
use listing::{
    aggregate, format_datetime, group_by_location, search, upcoming_counts, Area, DisplayStyle,
    NameIndex, SearchResults, ShowBreakdown, ShowSummary,
};
use models::{Artist, ListingForm, SearchForm, Show, ShowForm, Venue};

#[derive(Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path: Arc::new(db_path),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        let status = match &err {
            ListingError::Parse { .. } | ListingError::Validation { .. } => StatusCode::BAD_REQUEST,
            ListingError::NotFound { .. } => StatusCode::NOT_FOUND,
            ListingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message, "kind": self.kind }));
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ShowView {
    #[serde(flatten)]
    show: ShowSummary,
    start_time_display: String,
}

#[derive(Debug, Serialize)]
struct ShowsView {
    past_shows: Vec<ShowView>,
    upcoming_shows: Vec<ShowView>,
    past_shows_count: usize,
    upcoming_shows_count: usize,
}

#[derive(Debug, Serialize)]
struct VenuePage {
    #[serde(flatten)]
    venue: Venue,
    genre_list: Vec<String>,
    #[serde(flatten)]
    shows: ShowsView,
}

#[derive(Debug, Serialize)]
struct ArtistPage {
    #[serde(flatten)]
    artist: Artist,
    genre_list: Vec<String>,
    #[serde(flatten)]
    shows: ShowsView,
}

#[derive(Debug, Serialize)]
struct SearchPage {
    search_term: String,
    results: SearchResults,
}

#[derive(Debug, Serialize)]
struct ArtistItem {
    id: i64,
    name: String,
}

fn show_view(show: ShowSummary, style: DisplayStyle) -> Result<ShowView, ListingError> {
    let start_time_display = format_datetime(&show.start_time, style)?;
    Ok(ShowView {
        show,
        start_time_display,
    })
}

impl ShowsView {
    fn from_breakdown(breakdown: ShowBreakdown) -> Result<Self, ListingError> {
        let to_views = |shows: Vec<ShowSummary>| {
            shows
                .into_iter()
                .map(|show| show_view(show, DisplayStyle::Medium))
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(Self {
            past_shows: to_views(breakdown.past_shows)?,
            upcoming_shows: to_views(breakdown.upcoming_shows)?,
            past_shows_count: breakdown.past_shows_count,
            upcoming_shows_count: breakdown.upcoming_shows_count,
        })
    }
}

/// Undecodable form bodies are reported like any other invalid input.
fn form_rejected(rejection: FormRejection) -> ApiError {
    ApiError::from(ListingError::Validation {
        field: "form",
        reason: rejection.to_string(),
    })
}

fn reference_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Opens a store for the duration of one request on the blocking pool.
async fn with_store<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Store) -> Result<T, ListingError> + Send + 'static,
{
    let path = Arc::clone(&state.db_path);
    tokio::task::spawn_blocking(move || -> Result<T, ListingError> {
        let mut store = Store::open(&path)?;
        work(&mut store)
    })
    .await
    .map_err(|err| {
        error!("request task failed: {err}");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: "Something went wrong.".to_string(),
        }
    })?
    .map_err(ApiError::from)
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//  Venues
//  ----------------------------------------------------------------

async fn venues(State(state): State<AppState>) -> Result<Json<Vec<Area>>, ApiError> {
    let areas = with_store(&state, |store| {
        let venues = store.list_venues()?;
        let shows = store.list_shows()?;
        let counts = upcoming_counts(&shows, reference_now())?;
        Ok(group_by_location(&venues, &counts))
    })
    .await?;
    Ok(Json(areas))
}

async fn search_venues(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Json<SearchPage>, ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let term = form.search_term.clone();
    let results = with_store(&state, move |store| Ok(search(&store.list_venues()?, &term))).await?;
    Ok(Json(SearchPage {
        search_term: form.search_term,
        results,
    }))
}

async fn show_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
) -> Result<Json<VenuePage>, ApiError> {
    let page = with_store(&state, move |store| {
        let venue = store
            .find_venue(venue_id)?
            .ok_or_else(|| ListingError::not_found("venue", venue_id))?;
        let shows = store.shows_for_venue(venue_id)?;
        let names = NameIndex::new(std::slice::from_ref(&venue), &store.list_artists()?);
        let breakdown = aggregate(&shows, reference_now(), &names)?;
        Ok(VenuePage {
            genre_list: venue.genres.list(),
            venue,
            shows: ShowsView::from_breakdown(breakdown)?,
        })
    })
    .await?;
    Ok(Json(page))
}

async fn create_venue_submission(
    State(state): State<AppState>,
    form: Result<Form<ListingForm>, FormRejection>,
) -> Result<(StatusCode, Json<Venue>), ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let venue = with_store(&state, move |store| lifecycle::create_venue(store, form)).await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

async fn delete_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    with_store(&state, move |store| lifecycle::delete_venue(store, venue_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn edit_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
) -> Result<Json<Venue>, ApiError> {
    let venue = with_store(&state, move |store| {
        store
            .find_venue(venue_id)?
            .ok_or_else(|| ListingError::not_found("venue", venue_id))
    })
    .await?;
    Ok(Json(venue))
}

async fn edit_venue_submission(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
    form: Result<Form<ListingForm>, FormRejection>,
) -> Result<Json<Venue>, ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let venue =
        with_store(&state, move |store| lifecycle::update_venue(store, venue_id, form)).await?;
    Ok(Json(venue))
}

//  Artists
//  ----------------------------------------------------------------

async fn artists(State(state): State<AppState>) -> Result<Json<Vec<ArtistItem>>, ApiError> {
    let artists = with_store(&state, |store| Ok(store.list_artists()?)).await?;
    Ok(Json(
        artists
            .into_iter()
            .map(|artist| ArtistItem {
                id: artist.id,
                name: artist.name,
            })
            .collect(),
    ))
}

async fn search_artists(
    State(state): State<AppState>,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Result<Json<SearchPage>, ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let term = form.search_term.clone();
    let results = with_store(&state, move |store| Ok(search(&store.list_artists()?, &term))).await?;
    Ok(Json(SearchPage {
        search_term: form.search_term,
        results,
    }))
}

async fn show_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<i64>,
) -> Result<Json<ArtistPage>, ApiError> {
    let page = with_store(&state, move |store| {
        let artist = store
            .find_artist(artist_id)?
            .ok_or_else(|| ListingError::not_found("artist", artist_id))?;
        let shows = store.shows_for_artist(artist_id)?;
        let names = NameIndex::new(&store.list_venues()?, std::slice::from_ref(&artist));
        let breakdown = aggregate(&shows, reference_now(), &names)?;
        Ok(ArtistPage {
            genre_list: artist.genres.list(),
            artist,
            shows: ShowsView::from_breakdown(breakdown)?,
        })
    })
    .await?;
    Ok(Json(page))
}

async fn edit_artist(
    State(state): State<AppState>,
    Path(artist_id): Path<i64>,
) -> Result<Json<Artist>, ApiError> {
    let artist = with_store(&state, move |store| {
        store
            .find_artist(artist_id)?
            .ok_or_else(|| ListingError::not_found("artist", artist_id))
    })
    .await?;
    Ok(Json(artist))
}

async fn edit_artist_submission(
    State(state): State<AppState>,
    Path(artist_id): Path<i64>,
    form: Result<Form<ListingForm>, FormRejection>,
) -> Result<Json<Artist>, ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let artist =
        with_store(&state, move |store| lifecycle::update_artist(store, artist_id, form)).await?;
    Ok(Json(artist))
}

async fn create_artist_submission(
    State(state): State<AppState>,
    form: Result<Form<ListingForm>, FormRejection>,
) -> Result<(StatusCode, Json<Artist>), ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let artist = with_store(&state, move |store| lifecycle::create_artist(store, form)).await?;
    Ok((StatusCode::CREATED, Json(artist)))
}

//  Shows
//  ----------------------------------------------------------------

async fn shows(State(state): State<AppState>) -> Result<Json<Vec<ShowView>>, ApiError> {
    let views = with_store(&state, |store| {
        let names = NameIndex::new(&store.list_venues()?, &store.list_artists()?);
        store
            .list_shows()?
            .iter()
            .map(|show| show_view(names.summarize(show)?, DisplayStyle::Full))
            .collect::<Result<Vec<_>, _>>()
    })
    .await?;
    Ok(Json(views))
}

async fn create_show_submission(
    State(state): State<AppState>,
    form: Result<Form<ShowForm>, FormRejection>,
) -> Result<(StatusCode, Json<Show>), ApiError> {
    let Form(form) = form.map_err(form_rejected)?;
    let show = with_store(&state, move |store| lifecycle::create_show(store, form)).await?;
    Ok((StatusCode::CREATED, Json(show)))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/venues", get(venues))
        .route("/venues/search", post(search_venues))
        .route("/venues/create", post(create_venue_submission))
        .route("/venues/:venue_id", get(show_venue).delete(delete_venue))
        .route(
            "/venues/:venue_id/edit",
            get(edit_venue).post(edit_venue_submission),
        )
        .route("/artists", get(artists))
        .route("/artists/search", post(search_artists))
        .route("/artists/create", post(create_artist_submission))
        .route("/artists/:artist_id", get(show_artist))
        .route(
            "/artists/:artist_id/edit",
            get(edit_artist).post(edit_artist_submission),
        )
        .route("/shows", get(shows))
        .route("/shows/create", post(create_show_submission))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli).map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    let db_path = config.database_path();
    info!("database path: {}", db_path.display());

    let mut store = Store::open(&db_path)?;
    if config.seed_sample_data {
        store.seed_if_empty()?;
    }
    drop(store);

    let app = build_router(AppState::new(db_path));
    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("venue-listings listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
