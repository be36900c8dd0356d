use axum::{Json, extract::State, http::HeaderMap, http::StatusCode};
use chrono::{Duration, Utc};

use roost_auth::{password, tokens};
use roost_db::DbError;
use roost_types::api::{LoginRequest, LoginResponse, RefreshResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware;
use crate::run_blocking;

/// POST /api/login: verify the password and hand out both credential tiers:
/// a one-hour access token and a 60-day refresh token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let verify_state = state.clone();
    let user = run_blocking(move || {
        // An unknown email and a wrong password are the same failure to the
        // caller; neither leaks which accounts exist.
        let user = verify_state
            .db
            .user_by_email(&req.email)
            .map_err(|err| match err {
                DbError::NotFound(_) => ApiError::Unauthorized("incorrect email or password"),
                other => other.into(),
            })?;
        password::verify_password(&req.password, &user.hashed_password)?;
        Ok(user)
    })
    .await?;

    let token = tokens::make_jwt(user.id, &state.jwt_secret, Duration::hours(1))?;
    let refresh_token = tokens::make_refresh_token();
    state
        .db
        .save_refresh_token(user.id, &refresh_token, Utc::now() + Duration::days(60))?;

    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        token,
        refresh_token,
    }))
}

/// POST /api/refresh: trade a still-valid refresh token for a fresh access
/// token. Redemption does not rotate the refresh token; it stays usable
/// until it expires or is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token = middleware::bearer_token(&headers)?;

    // Unknown and expired tokens are indistinguishable to the caller.
    let user = state
        .db
        .user_for_refresh_token(refresh_token, Utc::now())
        .map_err(|err| match err {
            DbError::NotFound(_) => ApiError::Unauthorized("invalid or expired refresh token"),
            other => other.into(),
        })?;

    let token = tokens::make_jwt(user.id, &state.jwt_secret, Duration::hours(1))?;
    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke: delete the refresh token record. Later redemption
/// attempts fail; 404 when the token was never issued or is already gone.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = middleware::bearer_token(&headers)?;
    state.db.revoke_refresh_token(refresh_token)?;
    Ok(StatusCode::NO_CONTENT)
}
