// Library exports for Huddle
// This allows integration tests and external code to use Huddle modules

pub mod accounts;
pub mod auth;
pub mod community;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod notification;
pub mod post;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router with every surface mounted: HTML
/// pages, the JSON API, uploads and embedded assets.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::home::router())
        .merge(routes::community::router())
        .merge(routes::auth::router())
        .merge(routes::notifications::router())
        .merge(routes::api::router())
        .merge(routes::uploads::router())
        .merge(routes::assets::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
