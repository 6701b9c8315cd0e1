use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, warn};

use crate::{fail, AppState, Failure};

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub calorie_goal: Option<i32>,
    pub created_at: String,
}

impl Account {
    pub fn new(id: i64, email: &str, password: &str, full_name: Option<String>) -> Self {
        Self {
            id,
            email: email.to_string(),
            username: email.to_string(),
            password: password.to_string(),
            full_name,
            avatar_url: None,
            calorie_goal: Some(2000),
            created_at: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
    user: Account,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
    #[serde(default)]
    full_name: Option<String>,
}

/// Account id behind a valid bearer token.
pub struct AuthUser(pub i64);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Failure;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

        let db = state.db.read().await;
        match db.tokens.get(token) {
            Some(id) => Ok(AuthUser(*id)),
            None => {
                warn!("unknown bearer token");
                Err(fail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
            }
        }
    }
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, Failure> {
    let mut db = state.db.write().await;
    let account = db
        .accounts
        .iter()
        .find(|a| a.email == form.username && a.password == form.password)
        .cloned()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Incorrect email or password"))?;
    let access_token = db.issue_token(account.id);
    info!(user_id = account.id, "login");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: account,
    }))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<TokenResponse>), Failure> {
    let mut db = state.db.write().await;
    if db.accounts.iter().any(|a| a.email == body.email) {
        return Err(fail(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let account = db.create_account(&body.email, &body.password, body.full_name);
    let access_token = db.issue_token(account.id);
    info!(user_id = account.id, "registered");
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            access_token,
            token_type: "bearer",
            user: account,
        }),
    ))
}

async fn me(State(state): State<AppState>, AuthUser(id): AuthUser) -> Result<Json<Account>, Failure> {
    let db = state.db.read().await;
    db.account(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}
