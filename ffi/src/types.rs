//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests and responses cross the boundary as plain data: C strings for
//! URLs and headers, a pointer/length pair for bodies (multipart bodies are
//! binary). Parsed results come back as JSON text inside one `FfiResult`
//! envelope, so the host decodes them with its own JSON library instead of
//! mirroring every DTO as a C struct.

use std::ffi::CString;
use std::os::raw::c_char;

use aura_client::{ApiClient, ApiError, HttpMethod};

/// Opaque handle to an `ApiClient` and its session. C callers receive a
/// pointer to this and pass it back into every FFI function.
pub struct FfiAuraClient {
    pub(crate) inner: ApiClient,
}

/// Convert to a C string, dropping interior NULs instead of failing.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let cleaned = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(cleaned).unwrap_or_default().into_raw()
}

/// Hand a byte buffer to C as a pointer/length pair.
pub(crate) fn into_c_bytes(bytes: Vec<u8>) -> (*mut u8, usize) {
    if bytes.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = bytes.len();
    (Box::into_raw(bytes.into_boxed_slice()) as *mut u8, len)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `aura_build_*` functions. The host executes the request and
/// passes the response back through `aura_parse_response`. `body` is null
/// when `body_len` is 0.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: aura_client::HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };
        let (body, body_len) = into_c_bytes(req.body.unwrap_or_default());

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: into_c_string(req.url),
            headers,
            headers_len,
            body,
            body_len,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host builds this after executing a request and passes a pointer to
/// `aura_parse_response`. The FFI layer reads but does not free it.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

/// Which decoder `aura_parse_response` should apply.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiEndpointKind {
    Login = 0,
    Register = 1,
    CurrentUser = 2,
    Trending = 3,
    MyList = 4,
    MarkWatched = 5,
    TodaySummary = 6,
    MealHistory = 7,
    DeleteMeal = 8,
    AnalyzePhoto = 9,
    Vocabulary = 10,
    Streak = 11,
    TrafficAdvice = 12,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Network = 1,
    Unauthorized = 2,
    Server = 3,
    Panic = 4,
    NullArg = 5,
}

/// Result envelope for `aura_parse_response`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `json`
/// holds the decoded value (`null` for calls without a payload). On
/// failure `json` is null and `error_message` is the text to show.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub json: *mut c_char,
}

impl FfiResult {
    fn boxed(error_code: FfiErrorCode, message: Option<String>, http_status: u16, json: Option<String>) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: message.map_or(std::ptr::null_mut(), into_c_string),
            http_status,
            json: json.map_or(std::ptr::null_mut(), into_c_string),
        }))
    }

    pub(crate) fn ok_json(json: String, http_status: u16) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, http_status, Some(json))
    }

    pub(crate) fn from_error(err: ApiError, http_status: u16) -> *mut Self {
        let code = match &err {
            ApiError::Network(_) => FfiErrorCode::Network,
            ApiError::Unauthorized => FfiErrorCode::Unauthorized,
            ApiError::Server(_) => FfiErrorCode::Server,
        };
        Self::boxed(code, Some(err.to_string()), http_status, None)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, Some(format!("null argument: {name}")), 0, None)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg.to_string()), 0, None)
    }
}
