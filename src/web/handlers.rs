use super::app::AppState;
use super::{JsonBody, Result, WebError};
use crate::core::{Film, FilmDraft, FilmId, FilmPatch};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, label) = if state.films.is_ready().await {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "loading")
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
        }),
    )
}

// ============================================================================
// Films
// ============================================================================

pub async fn list_films(State(state): State<AppState>) -> Result<Json<Vec<Film>>> {
    Ok(Json(state.films.list().await?))
}

pub async fn read_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Film>> {
    let id = parse_film_id(&id)?;
    Ok(Json(state.films.get(id).await?))
}

pub async fn create_film(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<FilmDraft>,
) -> Result<Json<Film>> {
    Ok(Json(state.films.insert(draft).await?))
}

pub async fn update_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<FilmPatch>,
) -> Result<Json<Film>> {
    let id = parse_film_id(&id)?;
    Ok(Json(state.films.update(id, patch).await?))
}

pub async fn delete_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_film_id(&id)?;
    state.films.remove(id).await?;
    Ok(MessageResponse::new("Film deleted"))
}

fn parse_film_id(raw: &str) -> Result<FilmId> {
    raw.trim()
        .parse::<FilmId>()
        .map_err(|_| WebError::Input("film id must be a positive integer".to_string()))
}

// ============================================================================
// Accounts
// ============================================================================

pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    state.accounts.register(&email, &password).await?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("Manager registered successfully"),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> Result<Json<TokenResponse>> {
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let account = state.accounts.authenticate(&email, &password).await?;
    let token = state.tokens.issue(&account)?;

    Ok(Json(TokenResponse { token }))
}
