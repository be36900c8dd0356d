use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use roost_types::api::{ChirpResponse, CreateChirpRequest};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::validation;

fn to_response(chirp: roost_db::Chirp) -> ChirpResponse {
    ChirpResponse {
        id: chirp.id,
        body: chirp.body,
        author_id: chirp.author_id,
    }
}

/// POST /api/chirps: validate and clean the body, then store it under the
/// authenticated author.
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(author_id)): Extension<AuthUser>,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = validation::clean_chirp_body(&req.body)?;
    let chirp = state.db.create_chirp(&body, author_id)?;
    Ok((StatusCode::CREATED, Json(to_response(chirp))))
}

/// GET /api/chirps: every chirp, ascending by ID. An empty list, not an
/// error, when there are none.
pub async fn list_chirps(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    let chirps = state.db.chirps()?;
    Ok(Json(chirps.into_iter().map(to_response).collect()))
}

/// GET /api/chirps/{id}
pub async fn get_chirp(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ChirpResponse>, ApiError> {
    Ok(Json(to_response(state.db.get_chirp(id)?)))
}

/// DELETE /api/chirps/{id}: authors may only delete their own chirps.
pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    state.db.delete_chirp(id, user_id)?;
    Ok(StatusCode::NO_CONTENT)
}
