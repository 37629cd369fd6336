use axum::Router;
use axum::http::StatusCode;

use crate::AppState;

mod health;
mod scan;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/scan", scan::routes())
        .nest("/health", health::routes())
        .fallback(|| async { StatusCode::NOT_FOUND })
}
