//! Synchronous API client core for the Aura backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for every
//! backend endpoint. Request building and response decoding stay pure; a
//! `Transport` moves the bytes, so a host app can either use the bundled
//! `UreqTransport` or execute the request itself (see the `ffi` crate).
//!
//! # Design
//! - Each backend call is an `Endpoint` type: `build_request` plus
//!   `parse_response`, so the I/O boundary is explicit.
//! - `ApiClient` holds the base URL and the `Session`; it attaches the
//!   bearer token whenever one is stored.
//! - `Api` pairs a client with a transport and adds concurrent fan-out for
//!   screen loads. Boards (`CinemaBoard`, `FoodBoard`, `ProfileOverview`)
//!   hold the derived state those screens render.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod auth;
pub mod cinema;
pub mod client;
pub mod config;
pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod food;
pub mod http;
pub mod languages;
pub mod logistics;
pub mod multipart;
pub mod prefs;
pub mod profile;
pub mod quiz;
pub mod session;
pub mod store;
pub mod transport;

pub use api::Api;
pub use auth::{TokenResponse, User};
pub use cinema::{CinemaBoard, Movie, WatchState};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use error::{ApiError, OrFallback};
pub use food::{DailySummary, FoodBoard, Meal, MealType};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use prefs::Preferences;
pub use profile::ProfileOverview;
pub use quiz::MovieQuiz;
pub use session::Session;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use transport::{Transport, UreqTransport};
