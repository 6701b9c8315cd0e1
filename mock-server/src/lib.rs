//! In-memory stand-in for the Aura backend.
//!
//! Serves every route the client core talks to, with the same JSON shapes,
//! bearer-token auth, and canned answers where the real backend would call
//! an AI model. State lives in memory and resets on restart.

use axum::{http::StatusCode, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

mod auth;
mod cinema;
mod food;
mod languages;
mod logistics;
mod state;

pub use auth::AuthUser;
pub use state::{AppState, Db};

/// Seed account present in every fresh server.
pub const DEMO_EMAIL: &str = "demo@aura.app";
pub const DEMO_PASSWORD: &str = "demo";

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

pub(crate) type Failure = (StatusCode, Json<Detail>);

pub(crate) fn fail(status: StatusCode, detail: &str) -> Failure {
    (
        status,
        Json(Detail {
            detail: detail.to_string(),
        }),
    )
}

pub fn app() -> Router {
    router(AppState::seeded())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(auth::routes())
        .merge(cinema::routes())
        .merge(food::routes())
        .merge(languages::routes())
        .merge(logistics::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}
