use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{fail, AppState, AuthUser, Failure};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: Option<i64>,
    pub tmdb_id: Option<i64>,
    pub title: String,
    pub year: Option<String>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
    pub watched: Option<bool>,
    pub overview: Option<String>,
    pub review: Option<String>,
}

fn movie(tmdb_id: i64, title: &str, year: &str, rating: f64) -> Movie {
    Movie {
        id: None,
        tmdb_id: Some(tmdb_id),
        title: title.to_string(),
        year: Some(year.to_string()),
        rating: Some(rating),
        poster_url: Some(format!("https://image.tmdb.org/t/p/w500/{tmdb_id}.jpg")),
        watched: None,
        overview: None,
        review: None,
    }
}

pub(crate) fn seed_catalogue() -> Vec<Movie> {
    vec![
        movie(438631, "Dune", "2021", 7.8),
        movie(872585, "Oppenheimer", "2023", 8.1),
        movie(157336, "Interstellar", "2014", 8.4),
        movie(949, "Heat", "1995", 7.9),
        movie(348, "Alien", "1979", 8.2),
        movie(238, "The Godfather", "1972", 8.7),
    ]
}

/// Trending as the upstream feed sends it, duplicate entry included.
pub(crate) fn seed_trending() -> Vec<Movie> {
    let catalogue = seed_catalogue();
    vec![
        catalogue[0].clone(),
        catalogue[1].clone(),
        catalogue[0].clone(),
        catalogue[2].clone(),
    ]
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct ReviewParams {
    review: Option<String>,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/cinema/trending", get(trending))
        .route("/cinema/my-list", get(my_list))
        .route("/cinema/search", get(search))
        .route("/cinema/watched/{tmdb_id}", post(mark_watched))
        .route("/cinema/watchlist/{tmdb_id}", post(add_to_watchlist))
        .route("/cinema/movie/{tmdb_id}", get(details))
        .route("/cinema/movie/{tmdb_id}/words", get(words))
        .route("/cinema/movie/{tmdb_id}/critique", get(critique))
}

async fn trending(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(json!({ "results": db.trending }))
}

async fn my_list(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Vec<Movie>> {
    let db = state.db.read().await;
    Json(db.lists.get(&user).cloned().unwrap_or_default())
}

async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Json<Value> {
    let needle = params.query.to_lowercase();
    let db = state.db.read().await;
    let results: Vec<&Movie> = db
        .catalogue
        .iter()
        .filter(|m| !needle.is_empty() && m.title.to_lowercase().contains(&needle))
        .collect();
    Json(json!({ "results": results }))
}

/// Put a catalogue movie on the user's list in `watched` state, or update
/// the entry already there.
async fn upsert(
    state: &AppState,
    user: i64,
    tmdb_id: i64,
    watched: bool,
    review: Option<String>,
) -> Result<Movie, Failure> {
    let mut db = state.db.write().await;
    let template = db
        .catalogue
        .iter()
        .find(|m| m.tmdb_id == Some(tmdb_id))
        .cloned()
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Movie not found"))?;
    let list = db.lists.entry(user).or_default();
    let entry = match list.iter().position(|m| m.tmdb_id == Some(tmdb_id)) {
        Some(index) => &mut list[index],
        None => {
            list.push(template);
            let last = list.len() - 1;
            &mut list[last]
        }
    };
    if watched || entry.watched.is_none() {
        entry.watched = Some(watched);
    }
    if review.is_some() {
        entry.review = review;
    }
    Ok(entry.clone())
}

async fn mark_watched(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(tmdb_id): Path<i64>,
    Query(params): Query<ReviewParams>,
) -> Result<Json<Movie>, Failure> {
    upsert(&state, user, tmdb_id, true, params.review).await.map(Json)
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(tmdb_id): Path<i64>,
) -> Result<Json<Movie>, Failure> {
    upsert(&state, user, tmdb_id, false, None).await.map(Json)
}

async fn details(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(tmdb_id): Path<i64>,
) -> Result<Json<Value>, Failure> {
    let db = state.db.read().await;
    let movie = db
        .catalogue
        .iter()
        .find(|m| m.tmdb_id == Some(tmdb_id))
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Movie not found"))?;
    Ok(Json(json!({
        "tmdb_id": tmdb_id,
        "title": movie.title,
        "original_title": movie.title,
        "overview": movie.overview,
        "runtime": 150,
        "vote_count": 12000,
        "genres": ["Drama"],
        "directors": ["Unknown Director"],
        "cast": [{ "name": "Lead Actor", "character": "Hero" }],
        "poster_url": movie.poster_url,
    })))
}

async fn words(_user: AuthUser, Path(tmdb_id): Path<i64>) -> Json<Value> {
    Json(json!({
        "tmdb_id": tmdb_id,
        "words": [
            { "word": "spice", "translation": "пряность", "context": "The spice must flow." },
            { "word": "desert", "translation": "пустыня" },
        ],
    }))
}

async fn critique(_user: AuthUser, Path(tmdb_id): Path<i64>) -> Json<Value> {
    Json(json!({ "critique": format!("Film {tmdb_id} rewards patient viewers.") }))
}
