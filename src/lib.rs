pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod recurrence;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .nest_service("/assets", ServeDir::new("assets"))
        .route("/api/events", get(handlers::get_occurrences))
        .route("/api/service-times", get(handlers::get_service_times))
        .route("/api/contact", post(handlers::submit_contact))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/me", get(handlers::me))
        .route(
            "/api/admin/events",
            get(handlers::admin_list_events).post(handlers::admin_create_event),
        )
        .route(
            "/api/admin/events/{id}",
            put(handlers::admin_update_event).delete(handlers::admin_delete_event),
        )
        .route(
            "/api/admin/service-times",
            post(handlers::admin_upsert_service_time),
        )
        .route(
            "/api/admin/service-times/{id}",
            put(handlers::admin_update_service_time).delete(handlers::admin_delete_service_time),
        )
        .with_state(state)
}
