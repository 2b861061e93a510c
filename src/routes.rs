//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod cars;

use crate::config::Settings;
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::State,
    http::{header, Method, Uri},
    routing::{get, post},
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    let cors = build_cors_layer(settings);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        .route("/health", get(health_check))
        // Cars
        .route("/cars", get(cars::list_cars))
        .route(
            "/cars/{id}",
            get(cars::get_car).put(cars::update_car).delete(cars::delete_car),
        )
        .route("/car", post(cars::create_car))
        // Registered after the routes it covers
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(middleware)
        .with_state(state)
}

/// CORS restricted to the single configured origin
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(settings.cors.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Health check endpoint
async fn health_check(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "pool": state.store.status(),
    }))
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NoRoute(format!("{} {}", method, uri))
}

async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("{} {}", method, uri))
}
