use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/healthz", get(healthz))
}

async fn banner() -> &'static str {
    "chainwatch backend"
}

async fn healthz() -> &'static str {
    "ok"
}
