use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use helpdesk_engine::EngineError;
use helpdesk_shared::TicketId;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ServerError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Validation(v) => ServerError::BadRequest(v.to_string()),
            EngineError::NotFound(id) => ServerError::TicketNotFound(id),
            EngineError::Storage(s) => ServerError::Internal(s.to_string()),
            EngineError::LockPoisoned => {
                ServerError::Internal("engine state lock poisoned".to_string())
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::TicketNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Internal(detail) => {
                // Storage failures stay in the logs; clients get a generic 500.
                tracing::error!(detail = %detail, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
