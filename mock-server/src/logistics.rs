use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::{AppState, AuthUser};

const PLACES: &[(&str, &str, f64, f64, &str)] = &[
    ("Cafe Pushkin", "Tverskoy Blvd 26A", 55.7637, 37.6050, "cafe"),
    ("Coffee Bean", "Pokrovka St 18", 55.7596, 37.6432, "cafe"),
    ("Central Pharmacy", "Nikolskaya St 19", 55.7583, 37.6233, "pharmacy"),
    ("Red Square", "Red Square", 55.7539, 37.6208, "landmark"),
    ("Sheremetyevo Airport", "Khimki, Moscow Oblast", 55.9726, 37.4146, "airport"),
];

#[derive(Debug, Deserialize)]
struct PlaceParams {
    #[serde(default)]
    q: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RouteBody {
    from_lat: f64,
    from_lon: f64,
    to_lat: f64,
    to_lon: f64,
    #[serde(default = "default_transport")]
    transport: String,
}

fn default_transport() -> String {
    "car".to_string()
}

#[derive(Debug, Deserialize)]
struct TrafficParams {
    destination: String,
}

#[derive(Debug, Deserialize)]
struct TaskBody {
    text: String,
}

/// Great-circle distance in kilometres.
fn distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * 6371.0 * h.sqrt().asin()
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/logistics/search-place", get(search_place))
        .route("/logistics/route", post(route))
        .route("/logistics/traffic-advice", get(traffic_advice))
        .route("/logistics/parse-task", post(parse_task))
}

async fn search_place(_user: AuthUser, Query(params): Query<PlaceParams>) -> Json<Value> {
    let needle = params.q.to_lowercase();
    let mut matches: Vec<_> = PLACES
        .iter()
        .filter(|(name, _, _, _, kind)| {
            name.to_lowercase().contains(&needle) || kind.contains(needle.as_str())
        })
        .collect();
    if let (Some(lat), Some(lon)) = (params.lat, params.lon) {
        matches.sort_by(|a, b| {
            distance_km((lat, lon), (a.2, a.3)).total_cmp(&distance_km((lat, lon), (b.2, b.3)))
        });
    }
    let results: Vec<Value> = matches
        .into_iter()
        .map(|(name, address, lat, lon, kind)| {
            json!({ "name": name, "address": address, "lat": lat, "lon": lon, "type": kind })
        })
        .collect();
    Json(json!({ "results": results }))
}

async fn route(_user: AuthUser, Json(body): Json<RouteBody>) -> Json<Value> {
    let distance = distance_km((body.from_lat, body.from_lon), (body.to_lat, body.to_lon));
    let speed_kmh = match body.transport.as_str() {
        "walk" => 5.0,
        "transit" => 25.0,
        _ => 40.0,
    };
    let duration = (distance / speed_kmh * 60.0).ceil() as i64;
    Json(json!({
        "distance_km": (distance * 10.0).round() / 10.0,
        "duration_min": duration,
        "status": "ok",
    }))
}

async fn traffic_advice(_user: AuthUser, Query(params): Query<TrafficParams>) -> Json<Value> {
    let hour = OffsetDateTime::now_utc().hour();
    let (status, advice) = match hour {
        7..=9 | 17..=19 => ("heavy", "Leave 20 minutes early or take the metro."),
        10..=16 => ("moderate", "Expect minor delays on the ring road."),
        _ => ("light", "Roads are clear, go whenever you like."),
    };
    Json(json!({
        "destination": params.destination,
        "traffic_status": status,
        "advice": advice,
        "hour": hour,
    }))
}

/// Splits "title at HH:MM [in place]" style text into its parts.
async fn parse_task(_user: AuthUser, Json(body): Json<TaskBody>) -> Json<Value> {
    let text = body.text.trim();
    let (head, scheduled_time) = match text.rsplit_once(" at ") {
        Some((head, time)) if time.chars().next().is_some_and(|c| c.is_ascii_digit()) => {
            (head, Some(time.split_whitespace().next().unwrap_or(time)))
        }
        _ => (text, None),
    };
    let (title, destination) = match head.split_once(" in ") {
        Some((title, place)) => (title, Some(place)),
        None => (head, None),
    };
    Json(json!({
        "title": title,
        "destination": destination,
        "scheduled_time": scheduled_time,
        "notes": Value::Null,
    }))
}
