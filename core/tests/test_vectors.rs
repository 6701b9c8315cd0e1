//! Verify request building and response decoding against the JSON vectors
//! in `test-vectors/`.
//!
//! Request vectors name an endpoint, its input, and the session token, then
//! list the exact method, URL, headers, and body expected. Response vectors
//! feed a status and raw body to the endpoint's decoder and describe either
//! the decoded value (compared as a JSON subset, so vectors can skip fields
//! they don't care about) or the error.

use aura_client::auth::{FetchCurrentUser, Login, Register};
use aura_client::cinema::{FetchMyList, FetchTrending, MarkWatched, SearchMovies};
use aura_client::food::{AddMeal, DeleteMeal, FetchTodaySummary};
use aura_client::{ApiClient, ApiError, ClientConfig, Endpoint, HttpMethod, HttpRequest, HttpResponse, Session};
use serde::Serialize;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client(token: Option<&str>) -> ApiClient {
    let session = Session::in_memory();
    if let Some(token) = token {
        session.set_token(token);
    }
    ApiClient::new(ClientConfig::new(BASE_URL), session)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn str_field(input: &Value, key: &str) -> String {
    input[key].as_str().unwrap().to_string()
}

fn build(endpoint: &str, input: &Value, client: &ApiClient) -> HttpRequest {
    let request = match endpoint {
        "login" => Login {
            email: str_field(input, "email"),
            password: str_field(input, "password"),
        }
        .build_request(client),
        "register" => Register {
            email: str_field(input, "email"),
            password: str_field(input, "password"),
            full_name: str_field(input, "full_name"),
        }
        .build_request(client),
        "current_user" => FetchCurrentUser.build_request(client),
        "trending" => FetchTrending.build_request(client),
        "search" => SearchMovies {
            query: str_field(input, "query"),
        }
        .build_request(client),
        "mark_watched" => MarkWatched {
            tmdb_id: input["tmdb_id"].as_i64().unwrap(),
            review: input["review"].as_str().map(str::to_string),
        }
        .build_request(client),
        "delete_meal" => DeleteMeal {
            id: input["id"].as_i64().unwrap(),
        }
        .build_request(client),
        "add_meal" => AddMeal(serde_json::from_value(input.clone()).unwrap()).build_request(client),
        other => panic!("unknown endpoint: {other}"),
    };
    request.unwrap()
}

fn decoded<T: Serialize>(result: Result<T, ApiError>) -> Result<Value, ApiError> {
    result.map(|value| serde_json::to_value(value).unwrap())
}

fn parse(endpoint: &str, response: HttpResponse) -> Result<Value, ApiError> {
    match endpoint {
        "login" => decoded(Login::parse_response(response)),
        "register" => decoded(Register::parse_response(response)),
        "current_user" => decoded(FetchCurrentUser::parse_response(response)),
        "trending" => decoded(FetchTrending::parse_response(response)),
        "my_list" => decoded(FetchMyList::parse_response(response)),
        "today" => decoded(FetchTodaySummary::parse_response(response)),
        "delete_meal" => decoded(DeleteMeal::parse_response(response)),
        other => panic!("unknown endpoint: {other}"),
    }
}

/// Every field present in `expected` must match `actual`; arrays must have
/// the same length.
fn assert_subset(expected: &Value, actual: &Value, context: &str) {
    match (expected, actual) {
        (Value::Object(exp), Value::Object(act)) => {
            for (key, value) in exp {
                let got = act
                    .get(key)
                    .unwrap_or_else(|| panic!("{context}: missing field {key}"));
                assert_subset(value, got, &format!("{context}.{key}"));
            }
        }
        (Value::Array(exp), Value::Array(act)) => {
            assert_eq!(exp.len(), act.len(), "{context}: array length");
            for (i, (e, a)) in exp.iter().zip(act).enumerate() {
                assert_subset(e, a, &format!("{context}[{i}]"));
            }
        }
        _ => assert_eq!(expected, actual, "{context}"),
    }
}

fn run_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["requests"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let c = client(case["token"].as_str());
        let req = build(endpoint, &case["input"], &c);
        let expected = &case["expected"];

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["url"].as_str().unwrap()), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let pair = h.as_array().unwrap();
                (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");

        if let Some(text) = expected["body_text"].as_str() {
            assert_eq!(req.body_text(), text, "{name}: body");
        } else if expected["body"].is_null() {
            assert!(req.body.is_none(), "{name}: expected no body");
        } else {
            let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(body, expected["body"], "{name}: body");
        }
    }

    for case in vectors["responses"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let response = HttpResponse::new(status, case["body"].as_str().unwrap());
        let expected = &case["expected"];

        let result = parse(endpoint, response);
        match expected["error"].as_str() {
            None => {
                let value = result.unwrap_or_else(|e| panic!("{name}: unexpected error {e:?}"));
                assert_subset(&expected["ok"], &value, name);
            }
            Some("unauthorized") => assert_eq!(result.unwrap_err(), ApiError::Unauthorized, "{name}"),
            Some("server") => assert_eq!(
                result.unwrap_err(),
                ApiError::Server(str_field(expected, "message")),
                "{name}"
            ),
            Some("network") => assert!(matches!(result.unwrap_err(), ApiError::Network(_)), "{name}"),
            Some(other) => panic!("{name}: unknown error kind {other}"),
        }
    }
}

#[test]
fn auth_vectors() {
    run_vectors(include_str!("../../test-vectors/auth.json"));
}

#[test]
fn cinema_vectors() {
    run_vectors(include_str!("../../test-vectors/cinema.json"));
}

#[test]
fn food_vectors() {
    run_vectors(include_str!("../../test-vectors/food.json"));
}
