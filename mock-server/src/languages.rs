use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{fail, AppState, AuthUser, Failure};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabWord {
    pub id: i64,
    pub word: String,
    pub translation: String,
    pub example: Option<String>,
    pub language: Option<String>,
    pub learned: bool,
}

fn word(id: i64, word: &str, translation: &str, example: &str) -> VocabWord {
    VocabWord {
        id,
        word: word.to_string(),
        translation: translation.to_string(),
        example: Some(example.to_string()),
        language: Some("en".to_string()),
        learned: false,
    }
}

/// Every new account starts with the same short word list.
pub(crate) fn starter_words() -> Vec<VocabWord> {
    vec![
        word(1, "journey", "путешествие", "The journey took three days."),
        word(2, "reliable", "надёжный", "She is a reliable friend."),
        word(3, "to borrow", "одалживать", "Can I borrow your pen?"),
        word(4, "awkward", "неловкий", "There was an awkward silence."),
    ]
}

#[derive(Debug, Deserialize)]
struct RoleplayBody {
    scenario: String,
    message: String,
    #[serde(default)]
    history: Vec<String>,
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/languages/vocabulary", get(vocabulary))
        .route("/languages/vocabulary/{id}/learned", patch(mark_learned))
        .route("/languages/streak", get(streak))
        .route("/languages/roleplay", post(roleplay))
}

async fn vocabulary(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Vec<VocabWord>> {
    let db = state.db.read().await;
    Json(db.vocabulary.get(&user).cloned().unwrap_or_default())
}

async fn mark_learned(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Failure> {
    let mut db = state.db.write().await;
    let word = db
        .vocabulary
        .get_mut(&user)
        .and_then(|words| words.iter_mut().find(|w| w.id == id))
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Word not found"))?;
    word.learned = true;
    Ok(Json(json!({ "status": "ok" })))
}

async fn streak(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Value> {
    let db = state.db.read().await;
    let words = db.vocabulary.get(&user).map(Vec::as_slice).unwrap_or_default();
    let learned = words.iter().filter(|w| w.learned).count();
    let progress = if words.is_empty() { 0 } else { learned * 100 / words.len() };
    Json(json!({
        "total_words": words.len(),
        "learned_words": learned,
        "streak_days": if learned > 0 { 1 } else { 0 },
        "progress_percent": progress,
    }))
}

async fn roleplay(_user: AuthUser, Json(body): Json<RoleplayBody>) -> Json<Value> {
    let correction = body
        .message
        .starts_with(char::is_lowercase)
        .then_some("Start the sentence with a capital letter.");
    let tip = body
        .history
        .is_empty()
        .then(|| format!("Greet the other person first in the {} scenario.", body.scenario));
    Json(json!({
        "reply": format!("Got it: \"{}\". What would you like next?", body.message),
        "correction": correction,
        "tip": tip,
    }))
}
