use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::debug;

use crate::{fail, AppState, AuthUser, Failure};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
    pub meal_type: String,
    pub eaten_at: String,
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewMeal {
    name: String,
    calories: f64,
    proteins: f64,
    fats: f64,
    carbs: f64,
    #[serde(default = "default_meal_type")]
    meal_type: String,
}

fn default_meal_type() -> String {
    "snack".to_string()
}

#[derive(Debug, Deserialize)]
struct AnalyzeParams {
    #[serde(default = "default_meal_type")]
    meal_type: String,
}

fn now() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

fn today() -> String {
    OffsetDateTime::now_utc().date().to_string()
}

fn sum(meals: &[&Meal], field: impl Fn(&Meal) -> f64) -> f64 {
    meals.iter().map(|m| field(m)).sum()
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/food/today", get(today_summary))
        .route("/food/history", get(history))
        .route("/food/manual", post(add_manual))
        .route("/food/analyze-photo", post(analyze_photo))
        .route("/food/meal/{id}", delete(delete_meal))
        .route("/food/dinner-ideas", post(dinner_ideas))
        .route("/food/scan-product", post(scan_product))
}

async fn today_summary(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Value> {
    let date = today();
    let db = state.db.read().await;
    let meals: Vec<&Meal> = db
        .meals
        .get(&user)
        .map(|meals| meals.iter().filter(|m| m.eaten_at.starts_with(&date)).collect())
        .unwrap_or_default();
    let advice = (!meals.is_empty()).then_some("Add some vegetables to dinner.");
    Json(json!({
        "date": date,
        "total_calories": sum(&meals, |m| m.calories),
        "total_proteins": sum(&meals, |m| m.proteins),
        "total_fats": sum(&meals, |m| m.fats),
        "total_carbs": sum(&meals, |m| m.carbs),
        "meals": meals,
        "ai_advice": advice,
    }))
}

async fn history(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Vec<Meal>> {
    let db = state.db.read().await;
    let mut meals = db.meals.get(&user).cloned().unwrap_or_default();
    meals.reverse();
    Json(meals)
}

async fn add_manual(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<NewMeal>,
) -> (StatusCode, Json<Meal>) {
    let mut db = state.db.write().await;
    let meal = Meal {
        id: db.next_id(),
        name: input.name,
        calories: input.calories,
        proteins: input.proteins,
        fats: input.fats,
        carbs: input.carbs,
        meal_type: input.meal_type,
        eaten_at: now(),
        ai_analysis: None,
    };
    db.meals.entry(user).or_default().push(meal.clone());
    (StatusCode::CREATED, Json(meal))
}

/// Read the single `file` part of a photo upload.
async fn photo_bytes(mut multipart: Multipart) -> Result<Vec<u8>, Failure> {
    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed multipart body"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if field.content_type() != Some("image/jpeg") {
            return Err(fail(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected image/jpeg"));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed multipart body"))?;
        if photo.replace(bytes.to_vec()).is_some() {
            return Err(fail(StatusCode::BAD_REQUEST, "Expected exactly one file"));
        }
    }
    photo.ok_or_else(|| fail(StatusCode::BAD_REQUEST, "Missing file"))
}

async fn analyze_photo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<AnalyzeParams>,
    multipart: Multipart,
) -> Result<Json<Meal>, Failure> {
    let photo = photo_bytes(multipart).await?;
    debug!(bytes = photo.len(), meal_type = %params.meal_type, "photo received");
    let mut db = state.db.write().await;
    let meal = Meal {
        id: db.next_id(),
        name: "Chicken salad".to_string(),
        calories: 420.0,
        proteins: 32.0,
        fats: 18.0,
        carbs: 24.0,
        meal_type: params.meal_type,
        eaten_at: now(),
        ai_analysis: Some(format!("Recognised from a {}-byte photo.", photo.len())),
    };
    db.meals.entry(user).or_default().push(meal.clone());
    Ok(Json(meal))
}

async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Failure> {
    let mut db = state.db.write().await;
    let meals = db.meals.entry(user).or_default();
    let index = meals
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Meal not found"))?;
    meals.remove(index);
    Ok(Json(json!({})))
}

async fn dinner_ideas(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<Value> {
    let date = today();
    let db = state.db.read().await;
    let goal = db
        .account(user)
        .and_then(|a| a.calorie_goal)
        .map(f64::from)
        .unwrap_or(2200.0);
    let eaten: f64 = db
        .meals
        .get(&user)
        .map(|meals| {
            meals
                .iter()
                .filter(|m| m.eaten_at.starts_with(&date))
                .map(|m| m.calories)
                .sum()
        })
        .unwrap_or(0.0);
    Json(json!({
        "ideas": "Grilled salmon with rice; lentil soup; omelette with greens.",
        "calories_remaining": (goal - eaten).max(0.0),
    }))
}

async fn scan_product(_user: AuthUser, multipart: Multipart) -> Result<Json<Value>, Failure> {
    photo_bytes(multipart).await?;
    Ok(Json(json!({
        "name": "Greek yogurt",
        "calories": 97.0,
        "proteins": 9.0,
        "fats": 5.0,
        "carbs": 4.0,
        "serving_size": "100 g",
        "ingredients_summary": "Milk, live cultures.",
    })))
}
