//! Authentication endpoints.

use serde::{Deserialize, Serialize};

use crate::client::{decode_json, ApiClient};
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Shown on the login screen when the backend rejects the credentials or
/// answers with anything other than a token.
pub const LOGIN_FAILED: &str = "invalid email or password";
pub const REGISTRATION_FAILED: &str = "registration failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub calorie_goal: Option<i32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

/// `POST /auth/login` with a form body.
#[derive(Debug, Clone)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl Endpoint for Login {
    type Output = TokenResponse;
    const NAME: &'static str = "login";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.form_request(
            "/auth/login",
            &[("username", self.email.as_str()), ("password", self.password.as_str())],
        )
    }

    /// Anything that is not a token, including a 401 for bad credentials,
    /// reads as a login failure the user can act on.
    fn parse_response(response: HttpResponse) -> Result<TokenResponse, ApiError> {
        if !response.is_success() {
            return Err(ApiError::Server(LOGIN_FAILED.to_string()));
        }
        serde_json::from_slice(&response.body).map_err(|_| ApiError::Server(LOGIN_FAILED.to_string()))
    }
}

/// `POST /auth/register`. The backend wants the email as username too.
#[derive(Debug, Clone)]
pub struct Register {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
}

impl Endpoint for Register {
    type Output = TokenResponse;
    const NAME: &'static str = "register";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        let body = RegisterBody {
            username: &self.email,
            email: &self.email,
            password: &self.password,
            full_name: &self.full_name,
        };
        client.json_request(HttpMethod::Post, "/auth/register", &body)
    }

    /// Only 201 is success; otherwise the server's message is passed
    /// through verbatim for the registration form.
    fn parse_response(response: HttpResponse) -> Result<TokenResponse, ApiError> {
        if response.status != 201 {
            return Err(ApiError::Server(response.text()));
        }
        serde_json::from_slice(&response.body)
            .map_err(|_| ApiError::Server(REGISTRATION_FAILED.to_string()))
    }
}

/// `GET /auth/me`
#[derive(Debug, Clone, Copy)]
pub struct FetchCurrentUser;

impl Endpoint for FetchCurrentUser {
    type Output = User;
    const NAME: &'static str = "current-user";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/auth/me")
    }

    fn parse_response(response: HttpResponse) -> Result<User, ApiError> {
        decode_json(response)
    }
}
