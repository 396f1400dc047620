//! HTTP+JSON routes.
//!
//! Callers identify themselves with a `user_id` (or `admin_id`) field;
//! authentication happens in front of this service.

pub mod events;
pub mod rooms;
pub mod wishlists;

use crate::error::AppError;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .merge(rooms::routes())
        .merge(events::routes())
        .merge(wishlists::routes())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    match state.database.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ready" }))),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
        }
    }
}

/// `?user_id=` of GET and DELETE requests
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Body of requests whose only input is the caller
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    #[serde(alias = "admin_id")]
    pub user_id: Uuid,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self {
            AppError::Domain(err) => err.to_string(),
            _ if status.is_server_error() => {
                error!("Request failed: {}", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({ "error": message, "code": self.code() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;

    #[test]
    fn test_domain_errors_keep_their_status() {
        let response = AppError::from(DomainError::RoomAlreadyDrawn).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = AppError::from(DomainError::BeneficiaryAccessDenied).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_internal_errors_are_500() {
        let response = AppError::Message("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
