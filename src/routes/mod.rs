use axum::{
    debug_handler,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, StatusCode,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{configuration::Settings, modules::database::is_postgres_reachable, state::AppState};

pub mod chat;

pub async fn app(config: Settings, test_pool: Option<PgPool>) -> anyhow::Result<Router> {
    let state = AppState::new(&config, test_pool).await?;
    Ok(router(state))
}

/// Permissive cross-origin policy, stamped on every response.
pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(chat::router())
        .route("/health", get(health_check))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Answers `OPTIONS`, including browser preflights, with an empty 200. The
/// CORS headers come from the response layers in [`router`].
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[debug_handler]
async fn health_check(State(pool): State<PgPool>) -> impl IntoResponse {
    if is_postgres_reachable(&pool).await {
        return (
            StatusCode::OK,
            Json(json!({"status": "all backend services are working properly"})),
        );
    }
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"status": "database unavailable"})),
    )
}
