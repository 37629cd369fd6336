#[macro_use]
extern crate tracing;

use std::sync::Arc;

use axum::{Router, extract::FromRef};
use axum_extra::middleware::option_layer;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};

mod api;
mod config;
mod error;
mod middleware;
mod relay;
mod trace;

pub use crate::config::Config;
pub use crate::error::Error;

use relay::LookupRelay;

#[tokio::main]
async fn main() {
    launch_info();
    dotenv().ok();
    let config = config::init_config();
    trace::init(&config.log);

    let state = match AppState::new(&config) {
        Ok(state) => state,
        Err(err) => {
            error!("failed to build upstream client: {}", err);
            return;
        }
    };
    let app = app(&config, state);

    let listener = match TcpListener::bind(config.addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {}", config.addr(), err);
            return;
        }
    };
    match listener.local_addr() {
        Ok(local_addr) => info!("listening on http://{}", local_addr),
        Err(err) => warn!("listening on unknown address: {}", err),
    }

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {}", err);
        }
        info!("shutting down");
    };
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("server error: {}", err);
    }
}

#[derive(FromRef, Clone)]
pub struct AppState {
    pub relay: Arc<LookupRelay>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            relay: Arc::new(LookupRelay::from_config(config)?),
        })
    }
}

fn app(config: &Config, state: AppState) -> Router {
    let cors = if config.cors {
        Some(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods(Any)
                .allow_origin(Any),
        )
    } else {
        None
    };
    let layer = ServiceBuilder::new()
        .layer(middleware::TraceLayer)
        .layer(option_layer(cors))
        .layer(CatchPanicLayer::custom(middleware::handle_panic));

    Router::new()
        .nest("/api", api::routes())
        .with_state(state)
        .layer(layer)
}

fn launch_info() {
    println!();
    println!(
        "=================== Starting scan-relay {} ===================",
        env!("CARGO_PKG_VERSION")
    );
    println!();
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn test_app(cors: bool) -> Router {
        let config = Config {
            api_key: "test-key".into(),
            cors,
            ..Config::default()
        };
        let state = AppState::new(&config).unwrap();
        app(&config, state)
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = test_app(true)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })
        );
    }

    #[tokio::test]
    async fn unknown_api_path_is_not_found() {
        let response = test_app(true)
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scan_requires_post() {
        let response = test_app(true)
            .oneshot(Request::get("/api/scan").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn cors_header_follows_config() {
        let request = || {
            Request::get("/api/health")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap()
        };

        let response = test_app(true).oneshot(request()).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );

        let response = test_app(false).oneshot(request()).await.unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn handler_panic_becomes_internal_error() {
        async fn boom() -> &'static str {
            panic!("handler exploded")
        }

        let app = Router::new()
            .route("/boom", axum::routing::get(boom))
            .layer(CatchPanicLayer::custom(middleware::handle_panic));

        let response = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({ "error": "internal_server_error", "detail": "handler exploded" })
        );
    }
}
