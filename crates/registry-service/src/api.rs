//! HTTP API handlers using axum.
//!
//! # Rust Learning Note
//!
//! ## Routing rules
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/register/system", post(register_system_handler).fallback(post_only))
//!     .fallback(not_found_handler)
//! ```
//!
//! - A known path with the wrong method hits the per-route `fallback`
//!   (400 instead of axum's default 405).
//! - An unknown path hits the router `fallback` (404).
//!
//! ## Why `Bytes` instead of `Json<T>`?
//!
//! The `Json` extractor answers 415/422 for some bad bodies, and `Bytes`
//! on its own answers 413 past the body limit. Every decode failure here
//! must be a 400, so the body is taken as `Result<Bytes, BytesRejection>`
//! and both the rejection and the JSON are handled by hand.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use registry_common::Error;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    storage::RegistryStore,
    types::{ErrorResponse, RegisterResponse, System, Topic},
};

/// Storage capability shared by every handler.
pub type SharedStore = Arc<dyn RegistryStore>;

/// Body of `GET /`.
pub const GREETING: &str = "Hello from Hari\n";

/// Largest request body accepted by the register routes.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Creates the API router.
pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/", any(index_handler))
        .route(
            "/register/system",
            post(register_system_handler).fallback(post_only),
        )
        .route("/view/system", any(view_systems_handler))
        .route(
            "/register/topic",
            post(register_topic_handler).fallback(post_only),
        )
        .route("/view/topic", any(view_topics_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(store)
}

/// Health / index endpoint.
async fn index_handler() -> &'static str {
    GREETING
}

/// Registers a system.
///
/// The table is ensured on every call; only then is the row inserted.
/// A decode failure returns before the store is touched.
async fn register_system_handler(
    State(store): State<SharedStore>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let system: System = decode_body(body, "register system")?;
    system.validate().map_err(decode_error("register system"))?;
    debug!("Decoded system: {:?}", system);

    store
        .ensure_systems_table()
        .await
        .map_err(internal("Error creating systems table"))?;

    store
        .insert_system(&system)
        .await
        .map_err(internal("Error creating new systems row"))?;

    info!("Registered system: {}", system.name);
    Ok(Json(RegisterResponse::registered()))
}

/// Lists all registered systems.
async fn view_systems_handler(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<System>>, ApiError> {
    let systems = store
        .list_systems()
        .await
        .map_err(internal("Error querying systems table"))?;

    debug!("Listing {} systems", systems.len());
    Ok(Json(systems))
}

/// Registers a topic.
async fn register_topic_handler(
    State(store): State<SharedStore>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let topic: Topic = decode_body(body, "register topic")?;
    topic.validate().map_err(decode_error("register topic"))?;
    debug!("Decoded topic: {:?}", topic);

    store
        .ensure_topics_table()
        .await
        .map_err(internal("Error creating topics table"))?;

    store
        .insert_topic(&topic)
        .await
        .map_err(internal("Error creating new topics row"))?;

    info!("Registered topic: {} (owner: {})", topic.name, topic.owner);
    Ok(Json(RegisterResponse::registered()))
}

/// Lists all registered topics.
async fn view_topics_handler(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<Topic>>, ApiError> {
    let topics = store
        .list_topics()
        .await
        .map_err(internal("Error querying topics table"))?;

    debug!("Listing {} topics", topics.len());
    Ok(Json(topics))
}

async fn post_only() -> ApiError {
    ApiError::BadRequest("Only POST methods are supported".to_string())
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound("404 not found".to_string())
}

/// Reads and decodes a POST body. Unreadable, oversized and malformed
/// bodies are all a 400.
fn decode_body<T: DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
    what: &str,
) -> Result<T, ApiError> {
    let body = body.map_err(|rejection| {
        error!("Error reading {} POST body: {}", what, rejection.body_text());
        ApiError::BadRequest("Error decoding POST body".to_string())
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        error!("Error decoding {} POST: {}", what, e);
        ApiError::BadRequest("Error decoding POST body".to_string())
    })
}

/// Maps a failed entity validation. Only caller-caused errors are a 400.
fn decode_error(what: &'static str) -> impl FnOnce(Error) -> ApiError {
    move |e| {
        if e.is_client_error() {
            error!("Error decoding {} POST: {}", what, e);
            ApiError::BadRequest("Error decoding POST body".to_string())
        } else {
            error!("Error validating {} POST: {}", what, e);
            ApiError::Internal("Error validating POST body".to_string())
        }
    }
}

/// Logs the storage cause and keeps it out of the response.
fn internal(message: &'static str) -> impl FnOnce(Error) -> ApiError {
    move |e| {
        error!("{}: {}", message, e);
        ApiError::Internal(message.to_string())
    }
}

/// API error type.
///
/// Implements `IntoResponse`, so handlers can return
/// `Result<Json<T>, ApiError>` and use `?` on anything mapped into it.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Internal(msg) => {
                msg
            }
        };

        warn!("API error: {} - {}", status, message);

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
