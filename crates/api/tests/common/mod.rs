#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use rigel_api::config::ServerConfig;
use rigel_api::router::build_app_router;
use rigel_api::state::AppState;
use rigel_core::alert::{Alert, Severity};
use rigel_core::sensors::{Category, Reading};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        tick_interval: Duration::from_millis(2000),
        recent_alerts_on_init: 10,
        location: "hab_A".to_string(),
    }
}

/// Fresh state with no background services running.
pub fn test_state() -> AppState {
    AppState::new(test_config()).expect("default engine config is valid")
}

/// Full application router with the production middleware stack.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// A reading from the primary oxygen sensor.
pub fn o2_reading(value: f64) -> Reading {
    Reading {
        sensor_id: "o2-01".into(),
        category: Category::LifeSupport,
        quantity: "o2_pct".into(),
        value,
        unit: "%".into(),
        timestamp: Utc::now(),
        location: "hab_A".into(),
        severity: Severity::Normal,
    }
}

/// Push a critical oxygen alert straight into the engine.
pub async fn seed_alert(state: &AppState) -> Alert {
    state
        .engine
        .lock()
        .await
        .ingest(&o2_reading(17.8), Utc::now())
        .expect("17.8% O2 is critical")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri).await
}

async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
