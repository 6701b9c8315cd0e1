//! Cinema: trending, personal list, watch tracking, film details.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::api::Api;
use crate::client::{decode_json, ApiClient};
use crate::encoding::with_query;
use crate::endpoint::{decode_listing, Endpoint};
use crate::error::{ApiError, OrFallback};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Where a movie sits in the user's list. On the wire this is the nullable
/// `watched` flag: `true`, `false` (in the watchlist), or null/absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum WatchState {
    Watched,
    InWatchlist,
    #[default]
    Neither,
}

impl From<Option<bool>> for WatchState {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => WatchState::Watched,
            Some(false) => WatchState::InWatchlist,
            None => WatchState::Neither,
        }
    }
}

impl From<WatchState> for Option<bool> {
    fn from(state: WatchState) -> Self {
        match state {
            WatchState::Watched => Some(true),
            WatchState::InWatchlist => Some(false),
            WatchState::Neither => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    pub title: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub year: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub watched: WatchState,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
}

impl Movie {
    /// Catalogue id when known, local id otherwise; 0 when neither is set.
    pub fn stable_id(&self) -> i64 {
        self.tmdb_id.or(self.id).unwrap_or(0)
    }

    fn matches(&self, tmdb_id: i64) -> bool {
        self.tmdb_id == Some(tmdb_id) || self.id == Some(tmdb_id)
    }
}

/// Older backends send `year` as a number, newer ones as a string.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i64),
        Text(String),
    }
    Ok(Option::<Year>::deserialize(deserializer)?.map(|year| match year {
        Year::Number(n) => n.to_string(),
        Year::Text(s) => s,
    }))
}

/// Keep the first movie per stable id, preserving order. Movies without a
/// usable id cannot be keyed and are dropped.
pub fn dedupe_by_stable_id(movies: &[Movie]) -> Vec<Movie> {
    let mut seen = HashSet::new();
    movies
        .iter()
        .filter(|movie| {
            let id = movie.stable_id();
            id != 0 && seen.insert(id)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
}

/// A word or phrase from a film's dialogue, for the vocabulary quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieWord {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

#[derive(Deserialize)]
struct WordsPayload {
    #[serde(default)]
    words: Vec<MovieWord>,
}

#[derive(Deserialize)]
struct CritiquePayload {
    critique: String,
}

/// `GET /cinema/trending`
#[derive(Debug, Clone, Copy)]
pub struct FetchTrending;

impl Endpoint for FetchTrending {
    type Output = Vec<Movie>;
    const NAME: &'static str = "trending";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/cinema/trending")
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<Movie>, ApiError> {
        decode_listing(response)
    }
}

/// `GET /cinema/my-list`
#[derive(Debug, Clone, Copy)]
pub struct FetchMyList;

impl Endpoint for FetchMyList {
    type Output = Vec<Movie>;
    const NAME: &'static str = "my-list";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/cinema/my-list")
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<Movie>, ApiError> {
        decode_listing(response)
    }
}

/// `GET /cinema/search?query=`
#[derive(Debug, Clone)]
pub struct SearchMovies {
    pub query: String,
}

impl Endpoint for SearchMovies {
    type Output = Vec<Movie>;
    const NAME: &'static str = "search-movies";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get(&with_query("/cinema/search", &[("query", self.query.as_str())]))
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<Movie>, ApiError> {
        decode_listing(response)
    }
}

/// `POST /cinema/watched/{tmdb_id}`, optionally with a review.
#[derive(Debug, Clone)]
pub struct MarkWatched {
    pub tmdb_id: i64,
    pub review: Option<String>,
}

impl MarkWatched {
    pub fn new(tmdb_id: i64) -> Self {
        Self {
            tmdb_id,
            review: None,
        }
    }
}

impl Endpoint for MarkWatched {
    type Output = Movie;
    const NAME: &'static str = "mark-watched";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        let path = format!("/cinema/watched/{}", self.tmdb_id);
        let path = match &self.review {
            Some(review) => with_query(&path, &[("review", review.as_str())]),
            None => path,
        };
        client.request(HttpMethod::Post, &path)
    }

    fn parse_response(response: HttpResponse) -> Result<Movie, ApiError> {
        decode_json(response)
    }
}

/// `POST /cinema/watchlist/{tmdb_id}`
#[derive(Debug, Clone, Copy)]
pub struct AddToWatchlist {
    pub tmdb_id: i64,
}

impl Endpoint for AddToWatchlist {
    type Output = Movie;
    const NAME: &'static str = "add-to-watchlist";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.request(HttpMethod::Post, &format!("/cinema/watchlist/{}", self.tmdb_id))
    }

    fn parse_response(response: HttpResponse) -> Result<Movie, ApiError> {
        decode_json(response)
    }
}

/// `GET /cinema/movie/{tmdb_id}`
#[derive(Debug, Clone, Copy)]
pub struct FetchMovieDetails {
    pub tmdb_id: i64,
}

impl Endpoint for FetchMovieDetails {
    type Output = MovieDetails;
    const NAME: &'static str = "movie-details";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get(&format!("/cinema/movie/{}", self.tmdb_id))
    }

    fn parse_response(response: HttpResponse) -> Result<MovieDetails, ApiError> {
        decode_json(response)
    }
}

/// `GET /cinema/movie/{tmdb_id}/words`
#[derive(Debug, Clone, Copy)]
pub struct FetchMovieWords {
    pub tmdb_id: i64,
}

impl Endpoint for FetchMovieWords {
    type Output = Vec<MovieWord>;
    const NAME: &'static str = "movie-words";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get(&format!("/cinema/movie/{}/words", self.tmdb_id))
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<MovieWord>, ApiError> {
        decode_json::<WordsPayload>(response).map(|p| p.words)
    }
}

/// `GET /cinema/movie/{tmdb_id}/critique`
#[derive(Debug, Clone, Copy)]
pub struct FetchCritique {
    pub tmdb_id: i64,
}

impl Endpoint for FetchCritique {
    type Output = String;
    const NAME: &'static str = "critique";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get(&format!("/cinema/movie/{}/critique", self.tmdb_id))
    }

    fn parse_response(response: HttpResponse) -> Result<String, ApiError> {
        decode_json::<CritiquePayload>(response).map(|p| p.critique)
    }
}

/// State behind the cinema screen.
#[derive(Debug, Clone, Default)]
pub struct CinemaBoard {
    pub trending: Vec<Movie>,
    pub my_movies: Vec<Movie>,
    pub search_results: Vec<Movie>,
}

impl CinemaBoard {
    pub fn load<T: Transport>(api: &Api<T>) -> Self {
        let mut board = Self::default();
        board.refresh(api);
        board
    }

    /// Fetch trending and the user's list concurrently. Either side that
    /// fails renders empty.
    pub fn refresh<T: Transport>(&mut self, api: &Api<T>) {
        let (trending, mine) = api.join(&FetchTrending, &FetchMyList);
        self.trending = trending.or_fallback("trending");
        self.my_movies = mine.or_fallback("my-list");
    }

    pub fn watched(&self) -> Vec<&Movie> {
        self.my_movies
            .iter()
            .filter(|m| m.watched == WatchState::Watched)
            .collect()
    }

    pub fn watchlist(&self) -> Vec<&Movie> {
        self.my_movies
            .iter()
            .filter(|m| m.watched == WatchState::InWatchlist)
            .collect()
    }

    pub fn unique_trending(&self) -> Vec<Movie> {
        dedupe_by_stable_id(&self.trending)
    }

    /// A blank query clears results without touching the network.
    pub fn search<T: Transport>(&mut self, api: &Api<T>, query: &str) -> &[Movie] {
        self.search_results = if query.trim().is_empty() {
            Vec::new()
        } else {
            api.send(&SearchMovies {
                query: query.to_string(),
            })
            .or_fallback("search")
        };
        &self.search_results
    }

    /// Mark a movie watched. A movie already in the list is updated before
    /// the call and restored if the call fails; an unknown movie is picked
    /// up by refetching the list after the server confirms.
    pub fn mark_watched<T: Transport>(&mut self, api: &Api<T>, tmdb_id: i64) -> Result<(), ApiError> {
        let Some(index) = self.my_movies.iter().position(|m| m.matches(tmdb_id)) else {
            api.send(&MarkWatched::new(tmdb_id))?;
            self.reload_my_list(api);
            return Ok(());
        };

        let previous = self.my_movies[index].watched;
        self.my_movies[index].watched = WatchState::Watched;
        if let Err(err) = api.send(&MarkWatched::new(tmdb_id)) {
            warn!(tmdb_id, error = %err, "mark watched failed; rolling back");
            self.my_movies[index].watched = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Add to the watchlist, then refetch the list whatever the outcome.
    pub fn add_to_watchlist<T: Transport>(&mut self, api: &Api<T>, tmdb_id: i64) -> Result<(), ApiError> {
        let outcome = api.send(&AddToWatchlist { tmdb_id });
        self.reload_my_list(api);
        outcome.map(|_| ())
    }

    /// Refetch the user's list, keeping the current one on failure.
    fn reload_my_list<T: Transport>(&mut self, api: &Api<T>) {
        match api.send(&FetchMyList) {
            Ok(movies) => self.my_movies = movies,
            Err(err) => warn!(error = %err, "my-list reload failed; keeping cached list"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{api, ScriptedTransport};

    fn movie(id: Option<i64>, tmdb_id: Option<i64>, title: &str) -> Movie {
        Movie {
            id,
            tmdb_id,
            title: title.to_string(),
            year: None,
            rating: None,
            poster_url: None,
            watched: WatchState::Neither,
            overview: None,
            review: None,
        }
    }

    #[test]
    fn watch_state_from_wire() {
        let movies: Vec<Movie> = serde_json::from_str(
            r#"[
                {"tmdb_id":1,"title":"A","watched":true},
                {"tmdb_id":2,"title":"B","watched":false},
                {"tmdb_id":3,"title":"C","watched":null},
                {"tmdb_id":4,"title":"D"}
            ]"#,
        )
        .unwrap();
        let states: Vec<_> = movies.iter().map(|m| m.watched).collect();
        assert_eq!(
            states,
            vec![
                WatchState::Watched,
                WatchState::InWatchlist,
                WatchState::Neither,
                WatchState::Neither
            ]
        );
    }

    #[test]
    fn watch_state_to_wire() {
        let mut m = movie(None, Some(1), "A");
        m.watched = WatchState::InWatchlist;
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["watched"], false);
    }

    #[test]
    fn year_accepts_number_or_string() {
        let a: Movie = serde_json::from_str(r#"{"title":"A","year":1982}"#).unwrap();
        let b: Movie = serde_json::from_str(r#"{"title":"B","year":"1982"}"#).unwrap();
        let c: Movie = serde_json::from_str(r#"{"title":"C","year":null}"#).unwrap();
        assert_eq!(a.year.as_deref(), Some("1982"));
        assert_eq!(b.year.as_deref(), Some("1982"));
        assert_eq!(c.year, None);
    }

    #[test]
    fn stable_id_prefers_tmdb_id() {
        assert_eq!(movie(Some(5), Some(99), "A").stable_id(), 99);
        assert_eq!(movie(Some(5), None, "A").stable_id(), 5);
        assert_eq!(movie(None, None, "A").stable_id(), 0);
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let movies = vec![
            movie(Some(1), Some(10), "first"),
            movie(Some(2), Some(20), "second"),
            movie(Some(3), Some(10), "duplicate of first"),
            movie(Some(20), None, "local id collides with tmdb 20"),
            movie(None, None, "no id"),
            movie(Some(4), None, "local only"),
        ];
        let titles: Vec<_> = dedupe_by_stable_id(&movies)
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "local only"]);
    }

    #[test]
    fn search_encodes_query() {
        let client = api(ScriptedTransport::new());
        let req = SearchMovies {
            query: "blade runner".to_string(),
        }
        .build_request(client.client())
        .unwrap();
        assert_eq!(req.url, "http://test/cinema/search?query=blade%20runner");
    }

    #[test]
    fn mark_watched_with_review() {
        let client = api(ScriptedTransport::new());
        let req = MarkWatched {
            tmdb_id: 603,
            review: Some("great & weird".to_string()),
        }
        .build_request(client.client())
        .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://test/cinema/watched/603?review=great%20%26%20weird");
    }

    #[test]
    fn movie_words_unwraps_payload() {
        let resp = HttpResponse::new(
            200,
            r#"{"words":[{"word":"replicant","translation":"репликант","context":"tears in rain"}]}"#,
        );
        let words = FetchMovieWords::parse_response(resp).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "replicant");
    }

    #[test]
    fn critique_unwraps_payload() {
        let resp = HttpResponse::new(200, r#"{"critique":"A meditation on memory."}"#);
        assert_eq!(
            FetchCritique::parse_response(resp).unwrap(),
            "A meditation on memory."
        );
    }

    #[test]
    fn details_tolerate_sparse_payload() {
        let resp = HttpResponse::new(200, r#"{"title":"Dune","cast":[{"name":"Zendaya"}]}"#);
        let details = FetchMovieDetails::parse_response(resp).unwrap();
        assert_eq!(details.cast[0].character, "");
        assert!(details.genres.is_empty());
    }

    #[test]
    fn board_load_fails_soft_on_unauthorized_list() {
        let api = api(ScriptedTransport::new()
            .route(
                "/cinema/trending",
                200,
                r#"[{"tmdb_id":1,"title":"Dune"},{"tmdb_id":2,"title":"Arrival"}]"#,
            )
            .route("/cinema/my-list", 401, r#"{"detail":"Not authenticated"}"#));

        let board = CinemaBoard::load(&api);
        assert_eq!(board.trending.len(), 2);
        assert!(board.my_movies.is_empty());
    }

    #[test]
    fn board_splits_watched_and_watchlist() {
        let api = api(ScriptedTransport::new()
            .route("/cinema/trending", 200, "[]")
            .route(
                "/cinema/my-list",
                200,
                r#"[{"tmdb_id":1,"title":"A","watched":true},{"tmdb_id":2,"title":"B","watched":false},{"tmdb_id":3,"title":"C"}]"#,
            ));
        let board = CinemaBoard::load(&api);
        assert_eq!(board.watched().len(), 1);
        assert_eq!(board.watchlist().len(), 1);
        assert_eq!(board.watchlist()[0].title, "B");
    }

    #[test]
    fn blank_search_skips_network() {
        let api = api(ScriptedTransport::new());
        let mut board = CinemaBoard::default();
        assert!(board.search(&api, "   ").is_empty());
        assert!(api.transport().recorded().is_empty());
    }

    #[test]
    fn mark_watched_updates_local_copy() {
        let api = api(ScriptedTransport::new().route(
            "/cinema/watched/2",
            200,
            r#"{"tmdb_id":2,"title":"B","watched":true}"#,
        ));
        let mut board = CinemaBoard {
            my_movies: vec![{
                let mut m = movie(Some(9), Some(2), "B");
                m.watched = WatchState::InWatchlist;
                m
            }],
            ..Default::default()
        };
        board.mark_watched(&api, 2).unwrap();
        assert_eq!(board.my_movies[0].watched, WatchState::Watched);
        assert_eq!(api.transport().recorded().len(), 1);
    }

    #[test]
    fn mark_watched_rolls_back_on_failure() {
        let api = api(ScriptedTransport::new().route("/cinema/watched/2", 500, "boom"));
        let mut board = CinemaBoard {
            my_movies: vec![{
                let mut m = movie(Some(9), Some(2), "B");
                m.watched = WatchState::InWatchlist;
                m
            }],
            ..Default::default()
        };
        let err = board.mark_watched(&api, 2).unwrap_err();
        assert_eq!(err, ApiError::Server("boom".to_string()));
        assert_eq!(board.my_movies[0].watched, WatchState::InWatchlist);
    }

    #[test]
    fn mark_watched_unknown_movie_refetches_list() {
        let api = api(ScriptedTransport::new()
            .route("/cinema/watched/7", 200, r#"{"tmdb_id":7,"title":"New","watched":true}"#)
            .route("/cinema/my-list", 200, r#"[{"tmdb_id":7,"title":"New","watched":true}]"#));
        let mut board = CinemaBoard::default();
        board.mark_watched(&api, 7).unwrap();
        assert_eq!(board.watched().len(), 1);
    }

    #[test]
    fn add_to_watchlist_keeps_cached_list_when_reload_fails() {
        let api = api(ScriptedTransport::new().route(
            "/cinema/watchlist/5",
            200,
            r#"{"tmdb_id":5,"title":"E","watched":false}"#,
        ));
        let mut board = CinemaBoard {
            my_movies: vec![movie(None, Some(1), "cached")],
            ..Default::default()
        };
        board.add_to_watchlist(&api, 5).unwrap();
        assert_eq!(board.my_movies[0].title, "cached");
    }
}
