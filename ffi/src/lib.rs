//! C-ABI wrapper around `aura-client-core`.
//!
//! # Overview
//! Lets a mobile host keep its own HTTP stack: it asks this library for a
//! fully built request (URL, headers, body with the bearer token already
//! attached), executes it, and hands the raw response back for decoding.
//! The session lives on the Rust side, so a parsed login or register
//! response stores the token for every later request.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `aura_build_*` functions return null on a null argument or a request
//!   that cannot be built.
//! - One `aura_parse_response` entry point, selected by `FfiEndpointKind`,
//!   returns a single `FfiResult` envelope with the decoded value as JSON.
//! - The caller owns all returned pointers and must call the matching
//!   `aura_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use aura_client::auth::{FetchCurrentUser, Login, Register, TokenResponse};
use aura_client::cinema::{FetchMyList, FetchTrending, MarkWatched};
use aura_client::food::{AnalyzePhoto, DeleteMeal, FetchMealHistory, FetchTodaySummary, MealType};
use aura_client::languages::{FetchStreak, FetchVocabulary};
use aura_client::logistics::FetchTrafficAdvice;
use aura_client::{
    ApiClient, ApiError, ClientConfig, Endpoint, HttpResponse, JsonFileStore, KeyValueStore, MemoryStore,
    Session,
};
use serde::Serialize;

use types::*;

/// Read a nullable C string. Invalid UTF-8 is replaced, not rejected.
unsafe fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Read a nullable byte buffer; null means empty.
unsafe fn read_bytes(ptr: *const u8, len: usize) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
}

// ---------------------------------------------------------------------------
// Client lifecycle and session
// ---------------------------------------------------------------------------

/// Create a client bound to `base_url`.
///
/// With a non-null `store_path` the token and preferences persist in that
/// JSON file across launches; with null they live only as long as the
/// client. Returns null if `base_url` is null or an internal panic occurs.
/// The caller must free the returned pointer with `aura_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn aura_client_new(base_url: *const c_char, store_path: *const c_char) -> *mut FfiAuraClient {
    catch_unwind(|| {
        let Some(url) = (unsafe { read_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let store: Arc<dyn KeyValueStore> = match unsafe { read_str(store_path) } {
            Some(path) => Arc::new(JsonFileStore::open(path)),
            None => Arc::new(MemoryStore::new()),
        };
        let inner = ApiClient::new(ClientConfig::new(&url), Session::new(store));
        Box::into_raw(Box::new(FfiAuraClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `aura_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_client_free(client: *mut FfiAuraClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// Store `token` as the session token. Ignored if either pointer is null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_session_set_token(client: *const FfiAuraClient, token: *const c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { client.as_ref() };
        if let (Some(client), Some(token)) = (client, unsafe { read_str(token) }) {
            client.inner.session().set_token(&token);
        }
    }));
}

/// Forget the session token (logout). Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_session_clear(client: *const FfiAuraClient) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if let Some(client) = unsafe { client.as_ref() } {
            client.inner.session().clear();
        }
    }));
}

/// True when a non-empty token is stored. False for a null client.
#[unsafe(no_mangle)]
pub extern "C" fn aura_session_is_logged_in(client: *const FfiAuraClient) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { client.as_ref() }
            .map(|c| c.inner.session().is_logged_in())
            .unwrap_or(false)
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Shared body of every `aura_build_*`: resolve the client, let `make`
/// produce the endpoint from the remaining arguments, and build it.
fn build_with<E, F>(client: *const FfiAuraClient, make: F) -> *mut FfiHttpRequest
where
    E: Endpoint,
    F: FnOnce() -> Option<E>,
{
    catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { client.as_ref() }?;
        let endpoint = make()?;
        endpoint
            .build_request(&client.inner)
            .ok()
            .map(FfiHttpRequest::from_core)
    }))
    .ok()
    .flatten()
    .unwrap_or(std::ptr::null_mut())
}

/// `POST /auth/login` with the form body. Null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_build_login(
    client: *const FfiAuraClient,
    email: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, || {
        Some(Login {
            email: unsafe { read_str(email) }?,
            password: unsafe { read_str(password) }?,
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_register(
    client: *const FfiAuraClient,
    email: *const c_char,
    password: *const c_char,
    full_name: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, || {
        Some(Register {
            email: unsafe { read_str(email) }?,
            password: unsafe { read_str(password) }?,
            full_name: unsafe { read_str(full_name) }?,
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_current_user(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchCurrentUser))
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_trending(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchTrending))
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_my_list(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchMyList))
}

/// `review` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_build_mark_watched(
    client: *const FfiAuraClient,
    tmdb_id: i64,
    review: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, || {
        Some(MarkWatched {
            tmdb_id,
            review: unsafe { read_str(review) },
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_today_summary(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchTodaySummary))
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_meal_history(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchMealHistory))
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_delete_meal(client: *const FfiAuraClient, meal_id: i64) -> *mut FfiHttpRequest {
    build_with(client, || Some(DeleteMeal { id: meal_id }))
}

/// Multipart JPEG upload. `meal_type` is one of `breakfast`, `lunch`,
/// `dinner`, `snack`; null means `snack`. Null for an unknown meal type.
#[unsafe(no_mangle)]
pub extern "C" fn aura_build_analyze_photo(
    client: *const FfiAuraClient,
    image: *const u8,
    image_len: usize,
    meal_type: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, || {
        let meal_type = match unsafe { read_str(meal_type) } {
            Some(name) => MealType::parse(&name)?,
            None => MealType::default(),
        };
        Some(AnalyzePhoto::new(unsafe { read_bytes(image, image_len) }, meal_type))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_vocabulary(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchVocabulary))
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_streak(client: *const FfiAuraClient) -> *mut FfiHttpRequest {
    build_with(client, || Some(FetchStreak))
}

#[unsafe(no_mangle)]
pub extern "C" fn aura_build_traffic_advice(
    client: *const FfiAuraClient,
    destination: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, || {
        Some(FetchTrafficAdvice {
            destination: unsafe { read_str(destination) }?,
        })
    })
}

// ---------------------------------------------------------------------------
// Parse response
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse::new(resp.status, unsafe { read_bytes(resp.body, resp.body_len) })
}

fn decode_as<E>(response: HttpResponse) -> Result<String, ApiError>
where
    E: Endpoint,
    E::Output: Serialize,
{
    let output = E::parse_response(response)?;
    to_json(&output)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Server(format!("failed to encode result: {e}")))
}

/// Store the token from a successful login or register.
fn with_token(client: &FfiAuraClient, tokens: Result<TokenResponse, ApiError>) -> Result<String, ApiError> {
    let tokens = tokens?;
    client.inner.session().set_token(&tokens.access_token);
    to_json(&tokens)
}

/// Decode `response` as the answer to the `kind` request.
///
/// Login and register results also store the access token in the session.
#[unsafe(no_mangle)]
pub extern "C" fn aura_parse_response(
    client: *const FfiAuraClient,
    kind: FfiEndpointKind,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_ref() }) else {
            return FfiResult::null_arg("client");
        };
        let Some(resp) = (unsafe { response.as_ref() }) else {
            return FfiResult::null_arg("response");
        };
        let status = resp.status;
        let response = ffi_response_to_core(resp);

        let decoded = match kind {
            FfiEndpointKind::Login => with_token(client, Login::parse_response(response)),
            FfiEndpointKind::Register => with_token(client, Register::parse_response(response)),
            FfiEndpointKind::CurrentUser => decode_as::<FetchCurrentUser>(response),
            FfiEndpointKind::Trending => decode_as::<FetchTrending>(response),
            FfiEndpointKind::MyList => decode_as::<FetchMyList>(response),
            FfiEndpointKind::MarkWatched => decode_as::<MarkWatched>(response),
            FfiEndpointKind::TodaySummary => decode_as::<FetchTodaySummary>(response),
            FfiEndpointKind::MealHistory => decode_as::<FetchMealHistory>(response),
            FfiEndpointKind::DeleteMeal => decode_as::<DeleteMeal>(response),
            FfiEndpointKind::AnalyzePhoto => decode_as::<AnalyzePhoto>(response),
            FfiEndpointKind::Vocabulary => decode_as::<FetchVocabulary>(response),
            FfiEndpointKind::Streak => decode_as::<FetchStreak>(response),
            FfiEndpointKind::TrafficAdvice => decode_as::<FetchTrafficAdvice>(response),
        };

        match decoded {
            Ok(json) => FfiResult::ok_json(json, status),
            Err(e) => FfiResult::from_error(e, status),
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic("panic in aura_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `aura_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        aura_free_string(req.url);
        if !req.body.is_null() && req.body_len > 0 {
            drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.body, req.body_len)) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                aura_free_string(h.key);
                aura_free_string(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by `aura_parse_response`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        aura_free_string(result.error_message);
        aura_free_string(result.json);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn aura_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
