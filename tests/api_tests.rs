use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;
use venue_listings_lib::{build_router, AppState, Store};

/// Seeded database in a temp dir; the dir must outlive the router.
fn setup_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("listings.sqlite");
    let mut store = Store::open(&path).expect("open store");
    store.seed_if_empty().expect("seed");
    (dir, build_router(AppState::new(path)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

const NEW_VENUE: &str = "name=The+Blue+Door&city=Portland&state=OR&phone=503-555-0100\
    &genres=Folk%2C+Blues&facebook_link=https%3A%2F%2Ffacebook.com%2Fbluedoor\
    &website=https%3A%2F%2Fbluedoor.example&seeking_talent=true\
    &seeking_description=Weekend+slots+open";

#[tokio::test]
async fn venues_are_grouped_by_city_and_state() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, get("/venues")).await;
    assert_eq!(status, StatusCode::OK);

    let areas = body.as_array().expect("areas");
    assert_eq!(areas.len(), 2);
    assert_eq!(areas[0]["city"], "San Francisco");
    assert_eq!(areas[0]["state"], "CA");
    let sf = areas[0]["venues"].as_array().expect("venues");
    assert_eq!(sf.len(), 2);
    assert_eq!(sf[0]["name"], "The Musical Hop");
    assert_eq!(sf[0]["num_upcoming_shows"], 0);
    assert_eq!(sf[1]["name"], "Park Square Live Music & Coffee");
    assert_eq!(sf[1]["num_upcoming_shows"], 2);
    assert_eq!(areas[1]["city"], "New York");
    assert_eq!(areas[1]["venues"][0]["num_upcoming_shows"], 1);
}

#[tokio::test]
async fn venue_search_is_case_insensitive() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, form("POST", "/venues/search", "search_term=hop")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["search_term"], "hop");
    assert_eq!(body["results"]["count"], 1);
    assert_eq!(body["results"]["data"][0]["name"], "The Musical Hop");

    let (_, body) = send(&app, form("POST", "/venues/search", "search_term=Music")).await;
    assert_eq!(body["results"]["count"], 2);
}

#[tokio::test]
async fn artist_search_with_empty_term_returns_everyone() {
    let (_dir, app) = setup_app();
    let (_, body) = send(&app, form("POST", "/artists/search", "search_term=")).await;
    assert_eq!(body["results"]["count"], 3);

    let (_, body) = send(&app, form("POST", "/artists/search", "search_term=band")).await;
    assert_eq!(body["results"]["count"], 1);
    assert_eq!(body["results"]["data"][0]["name"], "The Wild Sax Band");
}

#[tokio::test]
async fn venue_page_splits_past_and_upcoming_shows() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, get("/venues/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Park Square Live Music & Coffee");
    assert_eq!(body["past_shows_count"], 1);
    assert_eq!(body["upcoming_shows_count"], 2);
    assert_eq!(body["past_shows"][0]["artist_name"], "Matt Quevado");
    assert_eq!(body["upcoming_shows"][0]["artist_name"], "The Wild Sax Band");
    assert_eq!(body["upcoming_shows"][0]["start_time"], "2035-04-01 20:00:00");
    assert!(body["upcoming_shows"][0]["start_time_display"].is_string());
}

#[tokio::test]
async fn artist_page_names_the_venues() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, get("/artists/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "The Wild Sax Band");
    assert_eq!(body["upcoming_shows_count"], 3);
    assert_eq!(body["past_shows_count"], 0);
    assert_eq!(
        body["upcoming_shows"][2]["venue_name"],
        "The Dueling Pianos Bar"
    );
}

#[tokio::test]
async fn missing_venue_is_404() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, get("/venues/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn created_venue_round_trips_through_edit_page() {
    let (_dir, app) = setup_app();
    let (status, created) = send(&app, form("POST", "/venues/create", NEW_VENUE)).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("id");

    let (status, found) = send(&app, get(&format!("/venues/{id}/edit"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, created);
    assert_eq!(found["genres"], "Folk, Blues");
    assert_eq!(found["seeking_talent"], true);
    assert_eq!(found["website"], "https://bluedoor.example");
}

#[tokio::test]
async fn incomplete_venue_is_rejected_without_writing() {
    let (_dir, app) = setup_app();
    let (status, body) = send(
        &app,
        form("POST", "/venues/create", "name=Half+Done&city=Boise&state=ID"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, body) = send(&app, form("POST", "/venues/search", "search_term=Half")).await;
    assert_eq!(body["results"]["count"], 0);
}

#[tokio::test]
async fn editing_missing_artist_is_404() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, form("POST", "/artists/77/edit", NEW_VENUE)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (_, body) = send(&app, get("/artists")).await;
    assert_eq!(body.as_array().expect("artists").len(), 3);
}

#[tokio::test]
async fn editing_artist_updates_fields() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, form("POST", "/artists/1/edit", NEW_VENUE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "The Blue Door");

    let (_, body) = send(&app, get("/artists/1")).await;
    assert_eq!(body["city"], "Portland");
    assert_eq!(body["past_shows_count"], 1);
}

#[tokio::test]
async fn venue_hosting_shows_cannot_be_deleted() {
    let (_dir, app) = setup_app();
    let (status, body) = send(&app, form("DELETE", "/venues/1", "")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "store");

    let (status, _) = send(&app, get("/venues/1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_venue_can_be_deleted_once() {
    let (_dir, app) = setup_app();
    let (_, created) = send(&app, form("POST", "/venues/create", NEW_VENUE)).await;
    let id = created["id"].as_i64().expect("id");

    let (status, _) = send(&app, form("DELETE", &format!("/venues/{id}"), "")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, form("DELETE", &format!("/venues/{id}"), "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn show_creation_validates_start_time() {
    let (_dir, app) = setup_app();
    let (status, body) = send(
        &app,
        form(
            "POST",
            "/shows/create",
            "artist_id=1&venue_id=2&start_time=tomorrow-ish",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "parse");

    let (status, body) = send(
        &app,
        form(
            "POST",
            "/shows/create",
            "artist_id=1&venue_id=2&start_time=2036-02-01T19%3A30",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["start_time"], "2036-02-01 19:30:00");

    let (_, shows) = send(&app, get("/shows")).await;
    let shows = shows.as_array().expect("shows");
    assert_eq!(shows.len(), 6);
    assert_eq!(shows[0]["start_time"], "2036-02-01 19:30:00");
    assert_eq!(shows[0]["venue_name"], "The Dueling Pianos Bar");
    assert_eq!(shows[0]["artist_name"], "Guns N Petals");
}

const MULTI_SELECT_VENUE: &str = "name=The+Blue+Door&city=Portland&state=OR&phone=503-555-0100\
    &genres=Jazz&genres=Folk&facebook_link=https%3A%2F%2Ffacebook.com%2Fbluedoor\
    &seeking_talent=y";

#[tokio::test]
async fn browser_form_with_multi_select_and_checkbox_is_accepted() {
    let (_dir, app) = setup_app();
    let (status, created) = send(&app, form("POST", "/venues/create", MULTI_SELECT_VENUE)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["genres"], "Jazz, Folk");
    assert_eq!(created["seeking_talent"], true);
    assert_eq!(created["website"], Value::Null);

    let (status, body) = send(&app, form("POST", "/artists/2/edit", MULTI_SELECT_VENUE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genres"], "Jazz, Folk");
}

#[tokio::test]
async fn undecodable_form_is_a_validation_error() {
    let (_dir, app) = setup_app();
    let body = MULTI_SELECT_VENUE.replace("seeking_talent=y", "seeking_talent=maybe");
    let (status, body) = send(&app, form("POST", "/venues/create", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (_, body) = send(&app, form("POST", "/venues/search", "search_term=Blue")).await;
    assert_eq!(body["results"]["count"], 0);
}
