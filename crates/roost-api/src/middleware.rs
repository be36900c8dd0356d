use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::ApiError;

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`] before a protected handler runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub u64);

/// Pull the credential out of `Authorization: Bearer <token>`. The scheme
/// prefix is literal; anything else is a malformed header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized(
            "missing or malformed authorization header",
        ))
}

/// Resolve the acting user from the access token and stash it in request
/// extensions for the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;
    let user_id = roost_auth::tokens::validate_jwt(token, &state.jwt_secret)?;
    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}
