//! Gateway error types

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Missing or invalid X-Sharer-User-Id header")]
    MissingUserHeader,

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Server unavailable: {0}")]
    Upstream(#[from] reqwest::Error),
}

// Malformed input is reported like any other field error.
impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::Validation(vec![rejection.body_text()])
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        GatewayError::Validation(vec![rejection.body_text()])
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::Validation(vec![rejection.body_text()])
    }
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            GatewayError::Validation(fields) => {
                info!("Rejected request: {}", self);
                json!({ "error": self.to_string(), "fields": fields })
            }
            GatewayError::Upstream(err) => {
                error!("Forwarding failed: {}", err);
                json!({ "error": "Server unavailable" })
            }
            _ => {
                info!("Rejected request: {}", self);
                json!({ "error": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_fields() {
        let err = GatewayError::Validation(vec![
            "email: must not be blank".to_string(),
            "name: must not be blank".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "email: must not be blank; name: must not be blank"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_state_message() {
        let err = GatewayError::UnknownState("SOMETIMES".to_string());
        assert_eq!(err.to_string(), "Unknown state: SOMETIMES");
    }
}
