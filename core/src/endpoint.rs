//! The `Endpoint` seam: one type per backend operation.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::{decode_json, ApiClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// A fixed backend operation: how to build its request and how to decode
/// its response. Decoding is an associated function because the response
/// shape never depends on the request's arguments.
pub trait Endpoint {
    type Output;

    /// Short label used in logs.
    const NAME: &'static str;

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError>;

    fn parse_response(response: HttpResponse) -> Result<Self::Output, ApiError>;
}

/// A list payload as the backend has served it over time: either a bare
/// array or an object wrapping it under `results`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { results: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped { results } => results,
        }
    }
}

pub fn decode_listing<T: DeserializeOwned>(response: HttpResponse) -> Result<Vec<T>, ApiError> {
    decode_json::<Listing<T>>(response).map(Listing::into_vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_accepts_both_shapes() {
        let bare = decode_listing::<u32>(HttpResponse::new(200, "[1,2]")).unwrap();
        let wrapped = decode_listing::<u32>(HttpResponse::new(200, r#"{"results":[1,2]}"#)).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn listing_rejects_other_objects() {
        let err = decode_listing::<u32>(HttpResponse::new(200, r#"{"detail":"nope"}"#)).unwrap_err();
        assert_eq!(err, ApiError::Server(r#"{"detail":"nope"}"#.to_string()));
    }
}
