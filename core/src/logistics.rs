//! Logistics: place search, routing, traffic advice, task parsing.

use serde::{Deserialize, Serialize};

use crate::client::{decode_json, ApiClient};
use crate::encoding::with_query;
use crate::endpoint::{decode_listing, Endpoint};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Car,
    Walk,
    Transit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
    #[serde(default)]
    pub transport: TransportMode,
}

impl RouteRequest {
    /// A car route between two points.
    pub fn by_car(from: (f64, f64), to: (f64, f64)) -> Self {
        Self {
            from_lat: from.0,
            from_lon: from.1,
            to_lat: to.0,
            to_lon: to.1,
            transport: TransportMode::Car,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub distance_km: f64,
    pub duration_min: i32,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficAdvice {
    pub destination: String,
    pub traffic_status: String,
    pub advice: String,
    pub hour: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub title: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `GET /logistics/search-place?q=`. Coordinates narrow the search when
/// both are known.
#[derive(Debug, Clone)]
pub struct SearchPlace {
    pub query: String,
    pub near: Option<(f64, f64)>,
}

impl Endpoint for SearchPlace {
    type Output = Vec<Place>;
    const NAME: &'static str = "search-place";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        let path = match self.near {
            Some((lat, lon)) => {
                let (lat, lon) = (lat.to_string(), lon.to_string());
                with_query(
                    "/logistics/search-place",
                    &[("q", self.query.as_str()), ("lat", lat.as_str()), ("lon", lon.as_str())],
                )
            }
            None => with_query("/logistics/search-place", &[("q", self.query.as_str())]),
        };
        client.get(&path)
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<Place>, ApiError> {
        decode_listing(response)
    }
}

/// `POST /logistics/route`
#[derive(Debug, Clone)]
pub struct PlanRoute(pub RouteRequest);

impl Endpoint for PlanRoute {
    type Output = Route;
    const NAME: &'static str = "route";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.json_request(HttpMethod::Post, "/logistics/route", &self.0)
    }

    fn parse_response(response: HttpResponse) -> Result<Route, ApiError> {
        decode_json(response)
    }
}

/// `GET /logistics/traffic-advice?destination=`
#[derive(Debug, Clone)]
pub struct FetchTrafficAdvice {
    pub destination: String,
}

impl Endpoint for FetchTrafficAdvice {
    type Output = TrafficAdvice;
    const NAME: &'static str = "traffic-advice";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get(&with_query(
            "/logistics/traffic-advice",
            &[("destination", self.destination.as_str())],
        ))
    }

    fn parse_response(response: HttpResponse) -> Result<TrafficAdvice, ApiError> {
        decode_json(response)
    }
}

/// `POST /logistics/parse-task`
#[derive(Debug, Clone)]
pub struct ParseTask {
    pub text: String,
}

#[derive(Serialize)]
struct ParseTaskBody<'a> {
    text: &'a str,
}

impl Endpoint for ParseTask {
    type Output = ParsedTask;
    const NAME: &'static str = "parse-task";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.json_request(HttpMethod::Post, "/logistics/parse-task", &ParseTaskBody { text: &self.text })
    }

    fn parse_response(response: HttpResponse) -> Result<ParsedTask, ApiError> {
        decode_json(response)
    }
}
