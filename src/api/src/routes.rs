//! API route handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::TeamRepository;
use crate::types::{
    AthleteRequest, AthleteResponse, CreatedResponse, ErrorResponse, HealthResponse,
    MeetRequest, MeetResponse, MeetResultResponse, MessageResponse, ResultRequest,
    ResultResponse, TopTimeResponse, ValidationError,
};

/// Application state shared across handlers.
pub struct AppState {
    pub repo: TeamRepository,
    pub config: AppConfig,
}

type SharedState = Arc<AppState>;

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        if let ValidationError::InvalidDate(ref raw) = err {
            tracing::debug!(date = %raw, "Rejected meet date");
        }
        Self::bad_request(err.to_string())
    }
}

// Store failures reach the client verbatim.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Store error: {:#}", err);
        Self::internal(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Entity names used in path and message text.
#[derive(Debug, Clone, Copy)]
enum Entity {
    Athlete,
    Meet,
    Result,
}

impl Entity {
    fn label(self) -> &'static str {
        match self {
            Entity::Athlete => "Athlete",
            Entity::Meet => "Meet",
            Entity::Result => "Result",
        }
    }

    fn invalid_id(self) -> ApiError {
        ApiError::bad_request(format!("Invalid {} ID", self.label().to_lowercase()))
    }

    fn not_found(self) -> ApiError {
        ApiError::not_found(format!("{} not found", self.label()))
    }

    fn changed(self, id: i64, verb: &str) -> Json<MessageResponse> {
        tracing::info!("{} {} {}", self.label(), id, verb);
        Json(MessageResponse {
            message: format!("{} {} successfully", self.label(), verb),
        })
    }

    fn created(self, id: i64) -> (StatusCode, Json<CreatedResponse>) {
        tracing::info!("{} {} created", self.label(), id);
        (
            StatusCode::CREATED,
            Json(CreatedResponse {
                id,
                message: format!("{} created successfully", self.label()),
            }),
        )
    }
}

fn parse_id(raw: &str, entity: Entity) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| entity.invalid_id())
}

/// Run a repository call on the blocking pool.
///
/// rusqlite calls block, and the connection lock is held for the whole call.
async fn with_repo<T, F>(state: &SharedState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TeamRepository) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || f(&state.repo))
        .await
        .map_err(|e| ApiError::internal(format!("Store task failed: {}", e)))?;
    Ok(result?)
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/hello", get(hello))
        .route("/api/athletes", get(list_athletes).post(create_athlete))
        .route(
            "/api/athletes/:id",
            get(get_athlete).put(update_athlete).delete(delete_athlete),
        )
        .route("/api/meets", get(list_meets).post(create_meet))
        .route(
            "/api/meets/:id",
            get(get_meet).put(update_meet).delete(delete_meet),
        )
        .route("/api/meets/:id/results", get(meet_results))
        .route("/api/results", get(list_results).post(create_result))
        .route(
            "/api/results/:id",
            get(get_result).put(update_result).delete(delete_result),
        )
        .route("/api/top-times", get(top_times))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Backend is running".to_string(),
    })
}

pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello from Jones County XC backend!".to_string(),
    })
}

// ==================== Athletes ====================

pub async fn list_athletes(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AthleteResponse>>, ApiError> {
    let athletes = with_repo(&state, |repo| repo.get_all_athletes()).await?;
    Ok(Json(athletes.into_iter().map(AthleteResponse::from).collect()))
}

pub async fn get_athlete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<AthleteResponse>, ApiError> {
    let id = parse_id(&id, Entity::Athlete)?;
    with_repo(&state, move |repo| repo.get_athlete_by_id(id))
        .await?
        .map(|a| Json(a.into()))
        .ok_or_else(|| Entity::Athlete.not_found())
}

pub async fn create_athlete(
    State(state): State<SharedState>,
    payload: Result<Json<AthleteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = parse_body(payload)?.validate()?;
    let id = with_repo(&state, move |repo| repo.create_athlete(&params)).await?;
    Ok(Entity::Athlete.created(id))
}

pub async fn update_athlete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<AthleteRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Athlete)?;
    let params = parse_body(payload)?.validate()?;

    if !with_repo(&state, move |repo| repo.update_athlete(id, &params)).await? {
        return Err(Entity::Athlete.not_found());
    }
    Ok(Entity::Athlete.changed(id, "updated"))
}

pub async fn delete_athlete(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Athlete)?;

    if !with_repo(&state, move |repo| repo.delete_athlete(id)).await? {
        return Err(Entity::Athlete.not_found());
    }
    Ok(Entity::Athlete.changed(id, "deleted"))
}

// ==================== Meets ====================

pub async fn list_meets(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MeetResponse>>, ApiError> {
    let meets = with_repo(&state, |repo| repo.get_all_meets()).await?;
    Ok(Json(meets.into_iter().map(MeetResponse::from).collect()))
}

pub async fn get_meet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MeetResponse>, ApiError> {
    let id = parse_id(&id, Entity::Meet)?;
    with_repo(&state, move |repo| repo.get_meet_by_id(id))
        .await?
        .map(|m| Json(m.into()))
        .ok_or_else(|| Entity::Meet.not_found())
}

pub async fn create_meet(
    State(state): State<SharedState>,
    payload: Result<Json<MeetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = parse_body(payload)?.validate()?;
    let id = with_repo(&state, move |repo| repo.create_meet(&params)).await?;
    Ok(Entity::Meet.created(id))
}

pub async fn update_meet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<MeetRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Meet)?;
    let params = parse_body(payload)?.validate()?;

    if !with_repo(&state, move |repo| repo.update_meet(id, &params)).await? {
        return Err(Entity::Meet.not_found());
    }
    Ok(Entity::Meet.changed(id, "updated"))
}

pub async fn delete_meet(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Meet)?;

    if !with_repo(&state, move |repo| repo.delete_meet(id)).await? {
        return Err(Entity::Meet.not_found());
    }
    Ok(Entity::Meet.changed(id, "deleted"))
}

/// Results for one meet, annotated with athlete name and grade.
pub async fn meet_results(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MeetResultResponse>>, ApiError> {
    let id = parse_id(&id, Entity::Meet)?;
    let rows = with_repo(&state, move |repo| repo.get_meet_results(id)).await?;
    Ok(Json(rows.into_iter().map(MeetResultResponse::from).collect()))
}

// ==================== Results ====================

pub async fn list_results(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ResultResponse>>, ApiError> {
    let results = with_repo(&state, |repo| repo.get_all_results()).await?;
    Ok(Json(results.into_iter().map(ResultResponse::from).collect()))
}

pub async fn get_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ResultResponse>, ApiError> {
    let id = parse_id(&id, Entity::Result)?;
    with_repo(&state, move |repo| repo.get_result_by_id(id))
        .await?
        .map(|r| Json(r.into()))
        .ok_or_else(|| Entity::Result.not_found())
}

pub async fn create_result(
    State(state): State<SharedState>,
    payload: Result<Json<ResultRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = parse_body(payload)?.validate()?;
    let id = with_repo(&state, move |repo| repo.create_result(&params)).await?;
    Ok(Entity::Result.created(id))
}

pub async fn update_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<ResultRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Result)?;
    let params = parse_body(payload)?.validate()?;

    if !with_repo(&state, move |repo| repo.update_result(id, &params)).await? {
        return Err(Entity::Result.not_found());
    }
    Ok(Entity::Result.changed(id, "updated"))
}

pub async fn delete_result(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id, Entity::Result)?;

    if !with_repo(&state, move |repo| repo.delete_result(id)).await? {
        return Err(Entity::Result.not_found());
    }
    Ok(Entity::Result.changed(id, "deleted"))
}

/// Leaderboard endpoint.
pub async fn top_times(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TopTimeResponse>>, ApiError> {
    let limit = state.config.leaderboard.top_times_limit;
    let rows = with_repo(&state, move |repo| repo.get_top_times(limit)).await?;
    Ok(Json(rows.into_iter().map(TopTimeResponse::from).collect()))
}
