//! Property records HTTP service.
//!
//! Routes:
//! - `GET /api/properties?searchTerm=` list, optionally text-filtered
//! - `GET /properties/groups` records bucketed by `group`
//! - `GET /properties/{id}` fetch one
//! - `POST /properties` create with a generated id
//! - `PUT /properties/{id}` change `group`
//! - `DELETE /api/properties/{id}` delete
//! - `GET /health` liveness
//!
//! The store is opened by the caller and injected through [`AppState`];
//! nothing here holds global state.

pub mod config;
pub mod create;
pub mod error;
pub mod handlers;
pub mod id;
pub mod store;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::ServerConfig;
pub use create::{create_with_retry, MAX_CREATE_ATTEMPTS};
pub use error::{AppError, CreateError, StoreError};
pub use handlers::AppState;
pub use store::{FieldUpdate, MemoryStore, MongoStore, PropertyFilter, PropertyStore};

/// Builds the router. An empty `cors_origins` allows any origin.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/properties", get(handlers::list_properties))
        .route("/api/properties/{id}", delete(handlers::delete_property))
        .route("/properties", post(handlers::create_property))
        .route("/properties/groups", get(handlers::group_properties))
        .route(
            "/properties/{id}",
            get(handlers::get_property).put(handlers::update_property),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Serves `state` on `listener` with permissive CORS until the task is
/// dropped.
pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state, &[])).await
}
