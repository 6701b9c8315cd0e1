//! Language learning: vocabulary, streak, roleplay chat.

use serde::{Deserialize, Serialize};

use crate::client::{decode_ack, decode_json, ApiClient};
use crate::endpoint::{decode_listing, Endpoint};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabWord {
    pub id: i64,
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub learned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    #[serde(default)]
    pub total_words: Option<i64>,
    #[serde(default)]
    pub learned_words: Option<i64>,
    pub streak_days: i32,
    #[serde(default)]
    pub progress_percent: Option<i32>,
}

/// One line of a roleplay conversation so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurn {
    User(String),
    Ai(String),
}

impl ChatTurn {
    fn transcript_line(&self) -> String {
        match self {
            ChatTurn::User(text) => format!("User: {text}"),
            ChatTurn::Ai(text) => format!("AI: {text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleplayRequest {
    pub scenario: String,
    pub message: String,
    pub history: Vec<String>,
}

impl RoleplayRequest {
    pub fn new(scenario: &str, message: &str, turns: &[ChatTurn]) -> Self {
        Self {
            scenario: scenario.to_string(),
            message: message.to_string(),
            history: turns.iter().map(ChatTurn::transcript_line).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleplayReply {
    pub reply: String,
    #[serde(default)]
    pub correction: Option<String>,
    #[serde(default)]
    pub tip: Option<String>,
}

impl RoleplayReply {
    /// The reply followed by any non-empty correction and tip.
    pub fn display_text(&self) -> String {
        let mut text = self.reply.clone();
        if let Some(correction) = self.correction.as_deref().filter(|c| !c.is_empty()) {
            text.push_str("\n\n✏️ ");
            text.push_str(correction);
        }
        if let Some(tip) = self.tip.as_deref().filter(|t| !t.is_empty()) {
            text.push_str("\n💡 ");
            text.push_str(tip);
        }
        text
    }
}

/// `GET /languages/vocabulary`
#[derive(Debug, Clone, Copy)]
pub struct FetchVocabulary;

impl Endpoint for FetchVocabulary {
    type Output = Vec<VocabWord>;
    const NAME: &'static str = "vocabulary";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/languages/vocabulary")
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<VocabWord>, ApiError> {
        decode_listing(response)
    }
}

/// `PATCH /languages/vocabulary/{id}/learned`
#[derive(Debug, Clone, Copy)]
pub struct MarkWordLearned {
    pub id: i64,
}

impl Endpoint for MarkWordLearned {
    type Output = ();
    const NAME: &'static str = "mark-word-learned";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.request(HttpMethod::Patch, &format!("/languages/vocabulary/{}/learned", self.id))
    }

    fn parse_response(response: HttpResponse) -> Result<(), ApiError> {
        decode_ack(response)
    }
}

/// `GET /languages/streak`
#[derive(Debug, Clone, Copy)]
pub struct FetchStreak;

impl Endpoint for FetchStreak {
    type Output = Streak;
    const NAME: &'static str = "streak";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/languages/streak")
    }

    fn parse_response(response: HttpResponse) -> Result<Streak, ApiError> {
        decode_json(response)
    }
}

/// `POST /languages/roleplay`
#[derive(Debug, Clone)]
pub struct Roleplay(pub RoleplayRequest);

impl Endpoint for Roleplay {
    type Output = RoleplayReply;
    const NAME: &'static str = "roleplay";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.json_request(HttpMethod::Post, "/languages/roleplay", &self.0)
    }

    fn parse_response(response: HttpResponse) -> Result<RoleplayReply, ApiError> {
        decode_json(response)
    }
}
