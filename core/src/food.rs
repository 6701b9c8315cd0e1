//! Food logging: daily summary, meal history, photo analysis.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::api::Api;
use crate::auth::User;
use crate::client::{decode_ack, decode_json, ApiClient};
use crate::encoding::with_query;
use crate::endpoint::{decode_listing, Endpoint};
use crate::error::{ApiError, OrFallback};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::MultipartUpload;
use crate::transport::Transport;

/// Daily goal used when neither the user nor the profile sets one.
pub const DEFAULT_CALORIE_GOAL: u32 = 2200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    #[default]
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    /// Case-insensitive lookup; `None` for anything but the four kinds.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// Meals logged by older app versions carry capitalized or free-form
/// types. Those read as unset instead of failing the whole list.
fn lenient_meal_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<MealType>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(serde_json::Value::as_str).and_then(MealType::parse))
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
    #[serde(default, deserialize_with = "lenient_meal_type")]
    pub meal_type: Option<MealType>,
    /// ISO-8601 timestamp as sent by the backend.
    #[serde(default)]
    pub eaten_at: Option<String>,
    #[serde(default)]
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    #[serde(default)]
    pub date: Option<String>,
    pub total_calories: f64,
    pub total_proteins: f64,
    pub total_fats: f64,
    pub total_carbs: f64,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub ai_advice: Option<String>,
}

impl DailySummary {
    /// Share of `goal` eaten today, capped at 1. Zero goal means zero.
    pub fn calorie_progress(&self, goal: u32) -> f64 {
        if goal == 0 {
            return 0.0;
        }
        (self.total_calories / f64::from(goal)).clamp(0.0, 1.0)
    }

    pub fn meals_count(&self) -> usize {
        self.meals.len()
    }
}

/// Preference override first, then the account's goal, then the default.
pub fn effective_calorie_goal(override_goal: Option<u32>, user: Option<&User>) -> u32 {
    override_goal
        .filter(|g| *g > 0)
        .or_else(|| {
            user.and_then(|u| u.calorie_goal)
                .and_then(|g| u32::try_from(g).ok())
                .filter(|g| *g > 0)
        })
        .unwrap_or(DEFAULT_CALORIE_GOAL)
}

/// Body of a manually entered meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
    pub meal_type: MealType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DinnerIdeas {
    pub ideas: String,
    pub calories_remaining: f64,
}

/// Nutrition facts read off a product label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub name: String,
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbs: f64,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub ingredients_summary: Option<String>,
}

/// `GET /food/today`
#[derive(Debug, Clone, Copy)]
pub struct FetchTodaySummary;

impl Endpoint for FetchTodaySummary {
    type Output = DailySummary;
    const NAME: &'static str = "today-summary";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/food/today")
    }

    fn parse_response(response: HttpResponse) -> Result<DailySummary, ApiError> {
        decode_json(response)
    }
}

/// `GET /food/history`
#[derive(Debug, Clone, Copy)]
pub struct FetchMealHistory;

impl Endpoint for FetchMealHistory {
    type Output = Vec<Meal>;
    const NAME: &'static str = "meal-history";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.get("/food/history")
    }

    fn parse_response(response: HttpResponse) -> Result<Vec<Meal>, ApiError> {
        decode_listing(response)
    }
}

/// `POST /food/manual`
#[derive(Debug, Clone)]
pub struct AddMeal(pub NewMeal);

impl Endpoint for AddMeal {
    type Output = Meal;
    const NAME: &'static str = "add-meal";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.json_request(HttpMethod::Post, "/food/manual", &self.0)
    }

    fn parse_response(response: HttpResponse) -> Result<Meal, ApiError> {
        decode_json(response)
    }
}

/// `POST /food/analyze-photo?meal_type=` with a JPEG.
#[derive(Debug, Clone)]
pub struct AnalyzePhoto {
    pub upload: MultipartUpload,
    pub meal_type: MealType,
}

impl AnalyzePhoto {
    pub fn new(image: Vec<u8>, meal_type: MealType) -> Self {
        Self {
            upload: MultipartUpload::jpeg_photo(image),
            meal_type,
        }
    }
}

impl Endpoint for AnalyzePhoto {
    type Output = Meal;
    const NAME: &'static str = "analyze-photo";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        let path = with_query("/food/analyze-photo", &[("meal_type", self.meal_type.as_str())]);
        client.multipart_request(&path, &self.upload)
    }

    fn parse_response(response: HttpResponse) -> Result<Meal, ApiError> {
        decode_json(response)
    }
}

/// `DELETE /food/meal/{id}`
#[derive(Debug, Clone, Copy)]
pub struct DeleteMeal {
    pub id: i64,
}

impl Endpoint for DeleteMeal {
    type Output = ();
    const NAME: &'static str = "delete-meal";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.request(HttpMethod::Delete, &format!("/food/meal/{}", self.id))
    }

    fn parse_response(response: HttpResponse) -> Result<(), ApiError> {
        decode_ack(response)
    }
}

/// `POST /food/dinner-ideas`
#[derive(Debug, Clone, Copy)]
pub struct FetchDinnerIdeas;

impl Endpoint for FetchDinnerIdeas {
    type Output = DinnerIdeas;
    const NAME: &'static str = "dinner-ideas";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.request(HttpMethod::Post, "/food/dinner-ideas")
    }

    fn parse_response(response: HttpResponse) -> Result<DinnerIdeas, ApiError> {
        decode_json(response)
    }
}

/// `POST /food/scan-product` with a JPEG of the label.
#[derive(Debug, Clone)]
pub struct ScanProduct {
    pub upload: MultipartUpload,
}

impl ScanProduct {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            upload: MultipartUpload::jpeg_photo(image),
        }
    }
}

impl Endpoint for ScanProduct {
    type Output = ScanResult;
    const NAME: &'static str = "scan-product";

    fn build_request(&self, client: &ApiClient) -> Result<HttpRequest, ApiError> {
        client.multipart_request("/food/scan-product", &self.upload)
    }

    fn parse_response(response: HttpResponse) -> Result<ScanResult, ApiError> {
        decode_json(response)
    }
}

/// State behind the food screen.
#[derive(Debug, Clone, Default)]
pub struct FoodBoard {
    pub summary: Option<DailySummary>,
    pub meals: Vec<Meal>,
}

impl FoodBoard {
    pub fn load<T: Transport>(api: &Api<T>) -> Self {
        let mut board = Self::default();
        board.refresh(api);
        board
    }

    pub fn refresh<T: Transport>(&mut self, api: &Api<T>) {
        let (summary, meals) = api.join(&FetchTodaySummary, &FetchMealHistory);
        self.summary = summary.map(Some).or_fallback("today-summary");
        self.meals = meals.or_fallback("meal-history");
    }

    pub fn calorie_progress(&self, goal: u32) -> f64 {
        self.summary
            .as_ref()
            .map(|s| s.calorie_progress(goal))
            .unwrap_or(0.0)
    }

    /// Remove a meal once the server confirms the delete.
    pub fn delete_meal<T: Transport>(&mut self, api: &Api<T>, id: i64) -> Result<(), ApiError> {
        api.send(&DeleteMeal { id })?;
        self.meals.retain(|m| m.id != id);
        if let Some(summary) = self.summary.as_mut() {
            summary.meals.retain(|m| m.id != id);
        }
        info!(meal_id = id, "meal deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{api, ScriptedTransport};

    const SUMMARY: &str = r#"{
        "date":"2026-10-16","total_calories":1100.0,"total_proteins":60.0,
        "total_fats":40.0,"total_carbs":120.0,
        "meals":[{"id":1,"name":"Oatmeal","calories":350.0,"proteins":12.0,"fats":6.0,"carbs":60.0,"meal_type":"breakfast"}]
    }"#;

    fn summary(total: f64) -> DailySummary {
        DailySummary {
            date: None,
            total_calories: total,
            total_proteins: 0.0,
            total_fats: 0.0,
            total_carbs: 0.0,
            meals: Vec::new(),
            ai_advice: None,
        }
    }

    #[test]
    fn progress_is_capped_and_guarded() {
        assert_eq!(summary(1100.0).calorie_progress(2200), 0.5);
        assert_eq!(summary(5000.0).calorie_progress(2200), 1.0);
        assert_eq!(summary(1100.0).calorie_progress(0), 0.0);
    }

    #[test]
    fn goal_resolution_order() {
        let user: User = serde_json::from_str(r#"{"id":1,"email":"a@b.c","calorie_goal":1900}"#).unwrap();
        assert_eq!(effective_calorie_goal(Some(1600), Some(&user)), 1600);
        assert_eq!(effective_calorie_goal(None, Some(&user)), 1900);
        assert_eq!(effective_calorie_goal(None, None), DEFAULT_CALORIE_GOAL);
        assert_eq!(effective_calorie_goal(Some(0), None), DEFAULT_CALORIE_GOAL);
    }

    #[test]
    fn summary_decodes() {
        let s = FetchTodaySummary::parse_response(HttpResponse::new(200, SUMMARY)).unwrap();
        assert_eq!(s.meals_count(), 1);
        assert_eq!(s.meals[0].meal_type, Some(MealType::Breakfast));
    }

    #[test]
    fn unknown_or_capitalized_meal_type_does_not_break_the_list() {
        let body = r#"[
            {"id":1,"name":"Pancakes","calories":500.0,"proteins":9.0,"fats":14.0,"carbs":80.0,"meal_type":"brunch"},
            {"id":2,"name":"Nuts","calories":180.0,"proteins":6.0,"fats":15.0,"carbs":6.0,"meal_type":"Snack"},
            {"id":3,"name":"Tea","calories":2.0,"proteins":0.0,"fats":0.0,"carbs":0.0,"meal_type":null}
        ]"#;
        let meals = FetchMealHistory::parse_response(HttpResponse::new(200, body)).unwrap();
        assert_eq!(meals.len(), 3);
        assert_eq!(meals[0].meal_type, None);
        assert_eq!(meals[1].meal_type, Some(MealType::Snack));
        assert_eq!(meals[2].meal_type, None);

        let summary = r#"{"total_calories":180.0,"total_proteins":6.0,"total_fats":15.0,"total_carbs":6.0,
            "meals":[{"id":2,"name":"Nuts","calories":180.0,"proteins":6.0,"fats":15.0,"carbs":6.0,"meal_type":"Snack"}]}"#;
        let s = FetchTodaySummary::parse_response(HttpResponse::new(200, summary)).unwrap();
        assert_eq!(s.meals[0].meal_type, Some(MealType::Snack));
    }

    #[test]
    fn meal_type_parse() {
        assert_eq!(MealType::parse("Dinner"), Some(MealType::Dinner));
        assert_eq!(MealType::parse(" lunch "), Some(MealType::Lunch));
        assert_eq!(MealType::parse("brunch"), None);
    }

    #[test]
    fn manual_meal_body() {
        let client = api(ScriptedTransport::new());
        let req = AddMeal(NewMeal {
            name: "Apple".to_string(),
            calories: 95.0,
            proteins: 0.5,
            fats: 0.3,
            carbs: 25.0,
            meal_type: MealType::Snack,
        })
        .build_request(client.client())
        .unwrap();
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["meal_type"], "snack");
        assert_eq!(body["calories"], 95.0);
    }

    #[test]
    fn analyze_photo_is_single_part_multipart() {
        let client = api(ScriptedTransport::new());
        client.session().set_token("abc");
        let endpoint = AnalyzePhoto {
            upload: MultipartUpload::jpeg_photo(vec![1, 2, 3]).with_boundary("B"),
            meal_type: MealType::Lunch,
        };
        let req = endpoint.build_request(client.client()).unwrap();
        assert_eq!(req.url, "http://test/food/analyze-photo?meal_type=lunch");
        assert_eq!(req.header("Content-Type"), Some("multipart/form-data; boundary=B"));
        assert_eq!(req.header("Authorization"), Some("Bearer abc"));

        let body = req.body.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert_eq!(text.matches("Content-Disposition").count(), 1);
        assert!(text.contains("name=\"file\"; filename=\"photo.jpg\""));
        assert!(text.contains("Content-Type: image/jpeg"));
        assert!(body.windows(3).any(|w| w == [1, 2, 3]));
    }

    #[test]
    fn delete_meal_accepts_empty_object() {
        assert!(DeleteMeal::parse_response(HttpResponse::new(200, "{}")).is_ok());
    }

    #[test]
    fn board_load_and_delete() {
        let api = api(ScriptedTransport::new()
            .route("/food/today", 200, SUMMARY)
            .route(
                "/food/history",
                200,
                r#"[{"id":1,"name":"Oatmeal","calories":350.0,"proteins":12.0,"fats":6.0,"carbs":60.0}]"#,
            )
            .route("/food/meal/1", 200, "{}"));

        let mut board = FoodBoard::load(&api);
        assert_eq!(board.calorie_progress(2200), 0.5);
        assert_eq!(board.meals.len(), 1);

        board.delete_meal(&api, 1).unwrap();
        assert!(board.meals.is_empty());
        assert!(board.summary.as_ref().unwrap().meals.is_empty());
    }

    #[test]
    fn board_load_fails_soft() {
        let api = api(ScriptedTransport::new());
        let board = FoodBoard::load(&api);
        assert!(board.summary.is_none());
        assert!(board.meals.is_empty());
        assert_eq!(board.calorie_progress(2200), 0.0);
    }

    #[test]
    fn failed_delete_keeps_meal() {
        let api = api(ScriptedTransport::new().route("/food/meal/1", 401, ""));
        let mut board = FoodBoard {
            summary: None,
            meals: vec![Meal {
                id: 1,
                name: "Soup".to_string(),
                calories: 200.0,
                proteins: 8.0,
                fats: 5.0,
                carbs: 20.0,
                meal_type: None,
                eaten_at: None,
                ai_analysis: None,
            }],
        };
        assert!(board.delete_meal(&api, 1).unwrap_err().is_unauthorized());
        assert_eq!(board.meals.len(), 1);
    }
}
