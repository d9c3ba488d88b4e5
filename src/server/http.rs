//! REST endpoints for missions, clues, progress, and hunter profiles.
//!
//! Stateless counterparts to the tracking socket. Position checks here run
//! the same proximity evaluation but flatten the result into dedicated
//! response fields; no live odometer is involved.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::tracking::protocol::{LocationCheck, Navigation};
use crate::tracking::service::{MissionDetail, NearbyClue, SkipResult};
use crate::tracking::{
    Clue, ClueProgress, Coordinates, Difficulty, Mission, MissionCategory, TrackingError,
    TrackingService,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: Arc<TrackingService>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/missions", get(list_missions).post(create_mission))
        .route("/missions/:id", get(mission_detail))
        .route("/missions/:id/clues", post(add_clue))
        .route("/missions/:id/check", post(check_location))
        .route("/missions/:id/skip", post(skip_clue))
        .route("/missions/:id/reset", post(reset_progress))
        .route("/missions/:id/progress", get(mission_progress))
        .route("/clues/nearby", get(nearby_clues))
        .route("/hunters/:id/stats", get(hunter_stats))
        .route("/hunters/:id/badges", get(hunter_badges))
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Wrapper that turns service errors into HTTP responses.
struct ApiError(TrackingError);

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match &self.0 {
            TrackingError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TrackingError::MissionNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            TrackingError::NoSession => (StatusCode::BAD_REQUEST, self.0.to_string()),
            TrackingError::Policy(_) => (StatusCode::CONFLICT, self.0.to_string()),
            TrackingError::Storage(e) => {
                tracing::error!("Storage error serving request: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };
        (code, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CreateMissionRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    category: MissionCategory,
    location_name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    estimated_distance_km: f64,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default = "default_mission_points")]
    points: i64,
}

fn default_mission_points() -> i64 {
    10
}

#[derive(Deserialize)]
struct AddClueRequest {
    clue_order: i64,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    radius_m: Option<f64>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    points: Option<i64>,
    #[serde(default)]
    required: Option<bool>,
}

#[derive(Deserialize)]
struct CheckRequest {
    hunter_id: Uuid,
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct HunterRequest {
    hunter_id: Uuid,
}

#[derive(Deserialize)]
struct HunterQuery {
    hunter_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct ProgressQuery {
    hunter_id: Uuid,
}

#[derive(Deserialize)]
struct NearbyQuery {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    radius_m: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

async fn list_missions(
    State(service): State<Arc<TrackingService>>,
) -> ApiResult<Json<Vec<Mission>>> {
    Ok(Json(service.active_missions()?))
}

async fn create_mission(
    State(service): State<Arc<TrackingService>>,
    Json(req): Json<CreateMissionRequest>,
) -> ApiResult<(StatusCode, Json<Mission>)> {
    let mission = Mission {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        category: req.category,
        location_name: req.location_name,
        latitude: req.latitude,
        longitude: req.longitude,
        estimated_distance_km: req.estimated_distance_km,
        difficulty: req.difficulty,
        points: req.points,
        is_active: true,
        created_at: chrono::Utc::now(),
    };
    service.create_mission(&mission)?;
    Ok((StatusCode::CREATED, Json(mission)))
}

async fn mission_detail(
    State(service): State<Arc<TrackingService>>,
    Path(mission_id): Path<Uuid>,
    Query(q): Query<HunterQuery>,
) -> ApiResult<Json<MissionDetail>> {
    Ok(Json(service.mission_detail(mission_id, q.hunter_id)?))
}

async fn add_clue(
    State(service): State<Arc<TrackingService>>,
    Path(mission_id): Path<Uuid>,
    Json(req): Json<AddClueRequest>,
) -> ApiResult<(StatusCode, Json<Clue>)> {
    let mut clue = Clue::new(mission_id, req.clue_order, req.name, req.latitude, req.longitude);
    clue.description = req.description;
    clue.hint = req.hint;
    clue.image_url = req.image_url;
    clue.radius_m = req.radius_m.unwrap_or(service.default_clue_radius());
    if let Some(points) = req.points {
        clue.points = points;
    }
    if let Some(required) = req.required {
        clue.required = required;
    }

    let clue = service.add_clue(clue)?;
    Ok((StatusCode::CREATED, Json(clue)))
}

async fn check_location(
    State(service): State<Arc<TrackingService>>,
    Path(mission_id): Path<Uuid>,
    Json(req): Json<CheckRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let position = Coordinates::new(req.latitude, req.longitude);
    let check = service.check_location(req.hunter_id, mission_id, position)?;
    Ok(Json(check_response(check)))
}

async fn skip_clue(
    State(service): State<Arc<TrackingService>>,
    Path(mission_id): Path<Uuid>,
    Json(req): Json<HunterRequest>,
) -> ApiResult<Json<SkipResult>> {
    Ok(Json(service.skip_current_clue(req.hunter_id, mission_id)?))
}

async fn reset_progress(
    State(service): State<Arc<TrackingService>>,
    Path(mission_id): Path<Uuid>,
    Json(req): Json<HunterRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = service.reset_progress(req.hunter_id, mission_id)?;
    Ok(Json(json!({
        "message": "Mission progress reset",
        "removed": removed,
    })))
}

async fn mission_progress(
    State(service): State<Arc<TrackingService>>,
    Path(mission_id): Path<Uuid>,
    Query(q): Query<ProgressQuery>,
) -> ApiResult<Json<Vec<ClueProgress>>> {
    Ok(Json(service.progress_entries(q.hunter_id, mission_id)?))
}

async fn nearby_clues(
    State(service): State<Arc<TrackingService>>,
    Query(q): Query<NearbyQuery>,
) -> ApiResult<Json<Vec<NearbyClue>>> {
    let position = Coordinates::new(q.latitude, q.longitude);
    Ok(Json(service.nearby_clues(position, q.radius_m)?))
}

async fn hunter_stats(
    State(service): State<Arc<TrackingService>>,
    Path(hunter_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let overview = service.stats_overview(hunter_id)?;
    Ok(Json(json!(overview)))
}

async fn hunter_badges(
    State(service): State<Arc<TrackingService>>,
    Path(hunter_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let board = service.badge_board(hunter_id)?;
    Ok(Json(json!(board)))
}

// ---------------------------------------------------------------------------
// Response shaping
// ---------------------------------------------------------------------------

/// Flatten a proximity check into the response fields REST clients read.
fn check_response(check: LocationCheck) -> serde_json::Value {
    let LocationCheck {
        navigation,
        progress,
        completion,
    } = check;

    match navigation {
        Navigation::SearchingClue {
            clue,
            distance_m,
            formatted_distance,
            message,
        } => json!({
            "status": "tracking",
            "current_clue": clue,
            "distance": distance_m,
            "formatted_distance": formatted_distance,
            "message": message,
            "progress": progress,
        }),

        Navigation::ClueReached {
            clue,
            distance_m,
            points,
            message,
            newly_recorded,
        } => json!({
            "status": "clue_reached",
            "current_clue": clue,
            "distance": distance_m,
            "points": points,
            "newly_recorded": newly_recorded,
            "message": message,
            "progress": progress,
        }),

        Navigation::HeadingToFinish {
            destination,
            distance_m,
            formatted_distance,
            message,
        } => json!({
            "status": "heading_to_finish",
            "destination": destination,
            "distance": distance_m,
            "formatted_distance": formatted_distance,
            "message": message,
            "progress": progress,
        }),

        Navigation::AllCluesCompleted { distance_m, message } => json!({
            "status": "all_clues_completed",
            "distance": distance_m,
            "message": message,
            "progress": progress,
            "completion": completion,
        }),
    }
}

/// Serve the REST API until the listener fails.
pub async fn run(addr: &str, service: Arc<TrackingService>) -> anyhow::Result<()> {
    let app = build_router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
