//! HTTP surface of roost: handlers, the request-authorization layer, chirp
//! body validation, and the error boundary that maps store and credential
//! failures onto status codes.

pub mod chirps;
pub mod error;
pub mod middleware;
pub mod sessions;
pub mod users;
pub mod validation;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use tracing::error;

use roost_db::Database;

pub use error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Assemble the `/api` routes.
///
/// Mutating chirp and user routes sit behind the authorization layer, so an
/// unauthenticated mutation never reaches a handler. Refresh and revoke read
/// their own bearer header instead: a refresh token is opaque, not a JWT the
/// layer could validate.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/users", post(users::register))
        .route("/api/login", post(sessions::login))
        .route("/api/refresh", post(sessions::refresh))
        .route("/api/revoke", post(sessions::revoke))
        .route("/api/chirps", get(chirps::list_chirps))
        .route("/api/chirps/{id}", get(chirps::get_chirp))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/users", put(users::update_user))
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/{id}", delete(chirps::delete_chirp))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    public.merge(protected)
}

async fn healthz() -> &'static str {
    "OK"
}

/// Run password hashing (deliberately slow) off the async workers.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|err| {
        error!("blocking task failed to join: {err}");
        ApiError::Internal(err.to_string())
    })?
}
