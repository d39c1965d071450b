//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};
use tally_shared::AppError;

pub mod accounts;
pub mod auth;
pub mod health;
pub mod invoices;
pub mod reports;
pub mod transactions;

/// Renders a shared-taxonomy error as a JSON response.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// The generic server-error response used when a datastore call fails.
pub(crate) fn internal_error() -> Response {
    error_response(&AppError::Internal("An error occurred".to_string()))
}

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(accounts::routes())
        .merge(transactions::routes())
        .merge(invoices::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
