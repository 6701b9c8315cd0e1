//! Executor: builds, sends, and decodes endpoint calls.

use std::thread;

use tracing::{debug, info, warn};

use crate::auth::{Login, Register, TokenResponse};
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::session::Session;
use crate::transport::{Transport, UreqTransport};

/// An `ApiClient` paired with a transport.
///
/// `Api` is `Sync`, so screen loads fan out over scoped threads that share
/// one instance.
pub struct Api<T: Transport = UreqTransport> {
    client: ApiClient,
    transport: T,
}

impl Api<UreqTransport> {
    pub fn connect(config: ClientConfig, session: Session) -> Self {
        Self::new(ApiClient::new(config, session), UreqTransport::new())
    }
}

impl<T: Transport> Api<T> {
    pub fn new(client: ApiClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn send<E: Endpoint>(&self, endpoint: &E) -> Result<E::Output, ApiError> {
        let request = endpoint.build_request(&self.client)?;
        debug!(endpoint = E::NAME, method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(&request).inspect_err(|e| {
            warn!(endpoint = E::NAME, error = %e, "transport failed");
        })?;
        debug!(endpoint = E::NAME, status = response.status, "received response");
        E::parse_response(response)
    }

    /// Issue two calls concurrently and wait for both.
    pub fn join<A, B>(&self, a: &A, b: &B) -> (Result<A::Output, ApiError>, Result<B::Output, ApiError>)
    where
        A: Endpoint + Sync,
        B: Endpoint + Sync,
        A::Output: Send,
        B::Output: Send,
    {
        thread::scope(|scope| {
            let first = scope.spawn(|| self.send(a));
            let second = scope.spawn(|| self.send(b));
            (joined(first.join()), joined(second.join()))
        })
    }

    /// Log in and store the returned token in the session.
    pub fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let login = Login {
            email: email.to_string(),
            password: password.to_string(),
        };
        let tokens = self.send(&login)?;
        self.session().set_token(&tokens.access_token);
        info!(user_id = tokens.user.id, "logged in");
        Ok(tokens)
    }

    /// Create an account and store the returned token in the session.
    pub fn register(&self, email: &str, password: &str, full_name: &str) -> Result<TokenResponse, ApiError> {
        let register = Register {
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
        };
        let tokens = self.send(&register)?;
        self.session().set_token(&tokens.access_token);
        info!(user_id = tokens.user.id, "registered");
        Ok(tokens)
    }

    pub fn logout(&self) {
        self.session().clear();
        info!("logged out");
    }
}

/// Flatten a scoped-thread join; a panicked worker reads as a failed call.
pub(crate) fn joined<O>(result: thread::Result<Result<O, ApiError>>) -> Result<O, ApiError> {
    result.unwrap_or_else(|_| Err(ApiError::Network("request worker panicked".to_string())))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for unit tests.

    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};

    /// Answers by URL path (query string ignored) and records every request.
    #[derive(Default)]
    pub struct ScriptedTransport {
        routes: Mutex<Vec<(String, HttpResponse)>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(self, path: &str, status: u16, body: &str) -> Self {
            self.routes
                .lock()
                .unwrap()
                .push((path.to_string(), HttpResponse::new(status, body)));
            self
        }

        pub fn recorded(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request.clone());
            let path = request
                .url
                .strip_prefix("http://test")
                .unwrap_or(&request.url)
                .split('?')
                .next()
                .unwrap_or_default()
                .to_string();
            self.routes
                .lock()
                .unwrap()
                .iter()
                .find(|(p, _)| *p == path)
                .map(|(_, r)| r.clone())
                .ok_or_else(|| ApiError::Network(format!("connection refused: {path}")))
        }
    }

    pub fn api(transport: ScriptedTransport) -> Api<ScriptedTransport> {
        Api::new(
            ApiClient::new(ClientConfig::new("http://test"), Session::in_memory()),
            transport,
        )
    }
}
