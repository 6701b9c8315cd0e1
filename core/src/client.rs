//! Request builder and response decoder for the Aura API.
//!
//! # Design
//! `ApiClient` holds the base URL and an injected `Session`. It builds
//! `HttpRequest` values and never touches the network; endpoints pair a
//! builder call with a decoder in `Endpoint`. The session is only read while
//! a request is built, so one client can be shared across threads.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::encoding::form_encode;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartUpload;
use crate::session::Session;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";
pub const JSON: &str = "application/json";
pub const FORM: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Session) -> Self {
        Self {
            base_url: config.base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Join the base address and `path` into an absolute URL.
    pub fn url(&self, path: &str) -> Result<String, ApiError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::Network(format!("invalid base URL: {:?}", self.base_url)));
        }
        if !path.starts_with('/') {
            return Err(ApiError::Network(format!("invalid request path: {path:?}")));
        }
        Ok(format!("{}{path}", self.base_url))
    }

    /// Bodyless request with the JSON content type and, when logged in, the
    /// bearer header.
    pub fn request(&self, method: HttpMethod, path: &str) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![(CONTENT_TYPE.to_string(), JSON.to_string())];
        self.attach_auth(&mut headers);
        Ok(HttpRequest {
            method,
            url: self.url(path)?,
            headers,
            body: None,
        })
    }

    pub fn get(&self, path: &str) -> Result<HttpRequest, ApiError> {
        self.request(HttpMethod::Get, path)
    }

    pub fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(body)
            .map_err(|e| ApiError::Network(format!("failed to encode request body: {e}")))?;
        let mut req = self.request(method, path)?;
        req.body = Some(body);
        Ok(req)
    }

    /// Form-encoded POST (login).
    pub fn form_request(&self, path: &str, fields: &[(&str, &str)]) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![(CONTENT_TYPE.to_string(), FORM.to_string())];
        self.attach_auth(&mut headers);
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path)?,
            headers,
            body: Some(form_encode(fields).into_bytes()),
        })
    }

    pub fn multipart_request(
        &self,
        path: &str,
        upload: &MultipartUpload,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![(CONTENT_TYPE.to_string(), upload.content_type())];
        self.attach_auth(&mut headers);
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path)?,
            headers,
            body: Some(upload.encode()),
        })
    }

    fn attach_auth(&self, headers: &mut Vec<(String, String)>) {
        if let Some(bearer) = self.session.bearer() {
            headers.push((AUTHORIZATION.to_string(), bearer));
        }
    }
}

/// Decode a JSON response. 401 is `Unauthorized` whatever the body holds;
/// any other non-2xx status, or a body that does not decode into `T`, is
/// `Server` with the raw text.
pub fn decode_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_slice(&response.body).map_err(|_| ApiError::Server(response.text()))
}

/// Decode a response whose payload carries no information. Any JSON value
/// or an empty body counts as success.
pub fn decode_ack(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)?;
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    serde_json::from_slice::<serde::de::IgnoredAny>(&response.body)
        .map(|_| ())
        .map_err(|_| ApiError::Server(response.text()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 401 {
        return Err(ApiError::Unauthorized);
    }
    if !response.is_success() {
        return Err(ApiError::Server(response.text()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ClientConfig::new("http://localhost:3000"), Session::in_memory())
    }

    #[test]
    fn get_without_token_omits_authorization() {
        let req = client().get("/food/today").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/food/today");
        assert_eq!(req.header("content-type"), Some(JSON));
        assert_eq!(req.header("authorization"), None);
        assert!(req.body.is_none());
    }

    #[test]
    fn get_with_token_attaches_bearer() {
        let c = client();
        c.session().set_token("abc");
        let req = c.get("/auth/me").unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn cleared_token_stops_attaching_header() {
        let c = client();
        c.session().set_token("abc");
        c.session().clear();
        let req = c.get("/auth/me").unwrap();
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn json_request_serializes_body() {
        #[derive(Serialize)]
        struct Body {
            text: &'static str,
        }
        let req = client()
            .json_request(HttpMethod::Post, "/logistics/parse-task", &Body { text: "gym at 7" })
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"], "gym at 7");
    }

    #[test]
    fn invalid_base_url_is_network_error() {
        let c = ApiClient::new(ClientConfig::new("aura-api"), Session::in_memory());
        let err = c.get("/auth/me").unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn relative_path_is_network_error() {
        let err = client().get("auth/me").unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[test]
    fn status_401_is_unauthorized_regardless_of_body() {
        let resp = HttpResponse::new(401, r#"{"id":1,"email":"a@b.c"}"#);
        let err = decode_json::<serde_json::Value>(resp).unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }

    #[test]
    fn undecodable_body_is_server_error_with_raw_text() {
        let resp = HttpResponse::new(500, "Internal Server Error");
        let err = decode_json::<Vec<u32>>(resp).unwrap_err();
        assert_eq!(err, ApiError::Server("Internal Server Error".to_string()));
    }

    #[test]
    fn non_success_status_is_server_error_even_if_body_decodes() {
        let resp = HttpResponse::new(404, "[]");
        assert_eq!(
            decode_json::<Vec<u32>>(resp).unwrap_err(),
            ApiError::Server("[]".to_string())
        );
    }

    #[test]
    fn success_body_decodes() {
        let resp = HttpResponse::new(200, "[1,2,3]");
        assert_eq!(decode_json::<Vec<u32>>(resp).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn ack_accepts_empty_object_and_empty_body() {
        assert!(decode_ack(HttpResponse::new(200, "{}")).is_ok());
        assert!(decode_ack(HttpResponse::new(204, "")).is_ok());
        assert_eq!(
            decode_ack(HttpResponse::new(401, "{}")).unwrap_err(),
            ApiError::Unauthorized
        );
        assert!(matches!(
            decode_ack(HttpResponse::new(502, "<html>bad gateway</html>")).unwrap_err(),
            ApiError::Server(_)
        ));
    }
}
