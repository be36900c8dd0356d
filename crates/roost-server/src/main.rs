use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use roost_api::{ApiError, AppState, AppStateInner};

/// What the admin surface works with: the application state plus the site
/// hit counter, owned here by the composition root rather than by a global.
#[derive(Clone)]
struct AdminState {
    app: AppState,
    site_hits: Arc<AtomicU64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost=debug,tower_http=debug".into()),
        )
        .init();

    // Config. The signing secret is required; everything else has a default.
    let jwt_secret = std::env::var("ROOST_JWT_SECRET").context("ROOST_JWT_SECRET must be set")?;
    let db_path = std::env::var("ROOST_DB_PATH").unwrap_or_else(|_| "roost.json".into());
    let host = std::env::var("ROOST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ROOST_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .context("ROOST_PORT must be a port number")?;
    let site_dir = std::env::var("ROOST_SITE_DIR").unwrap_or_else(|_| "site".into());

    // An unreadable or corrupt snapshot aborts startup here.
    let db = roost_db::Database::open(db_path)?;

    let app_state: AppState = Arc::new(AppStateInner { db, jwt_secret });
    let admin_state = AdminState {
        app: app_state.clone(),
        site_hits: Arc::new(AtomicU64::new(0)),
    };

    // Only static-site traffic is counted; the API routes are not.
    let site = Router::new()
        .nest_service("/app", ServeDir::new(&site_dir))
        .layer(middleware::from_fn_with_state(
            admin_state.clone(),
            count_site_hit,
        ));

    let admin = Router::new()
        .route("/admin/metrics", get(handle_metrics))
        .route("/admin/reset", post(handle_reset))
        .with_state(admin_state);

    let app = roost_api::router(app_state)
        .merge(site)
        .merge(admin)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("roost listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn count_site_hit(State(state): State<AdminState>, req: Request, next: Next) -> Response {
    state.site_hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}

async fn handle_metrics(State(state): State<AdminState>) -> Html<String> {
    let hits = state.site_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>\n\n<body>\n    <h1>Welcome, Roost Admin</h1>\n    <p>Roost has been visited {} times!</p>\n</body>\n\n</html>",
        hits
    ))
}

/// Zero the hit counter and wipe the store. Debug/bootstrap entry point.
async fn handle_reset(State(state): State<AdminState>) -> Result<impl IntoResponse, ApiError> {
    state.site_hits.store(0, Ordering::Relaxed);
    state.app.db.reset()?;
    Ok("state reset")
}
