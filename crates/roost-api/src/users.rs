use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use roost_auth::password;
use roost_types::api::{RegisterRequest, UpdateUserRequest, UserResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::run_blocking;

/// POST /api/users: register a new account. 409 when the email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(move || {
        let hashed = password::hash_password(&req.password)?;
        Ok(state.db.create_user(&req.email, &hashed)?)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

/// PUT /api/users: replace the caller's own email and password.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = run_blocking(move || {
        let hashed = password::hash_password(&req.password)?;
        Ok(state.db.update_user(user_id, &req.email, &hashed)?)
    })
    .await?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
    }))
}
