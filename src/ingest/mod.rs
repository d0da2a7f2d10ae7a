//! Webhook-style intake of customer and order records.
//!
//! Records are validated and acknowledged, nothing is stored. Responses use
//! their own `{message, errors}` shape instead of the coded errors of the
//! rest of the api since external integrations depend on it.

use std::fmt::{self, Display};

use actix_web::error::PayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::validation::Violation;

pub mod customer;
mod endpoints;
pub mod order;
pub use endpoints::*;

pub const DEFAULT_PAYLOAD_LIMIT: usize = 256 * 1024;

#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub payload_limit: usize,
}

impl Default for IngestConfig {
    fn default() -> IngestConfig {
        IngestConfig {
            payload_limit: DEFAULT_PAYLOAD_LIMIT,
        }
    }
}

#[derive(Debug)]
pub enum IngestError {
    InvalidPayload(Vec<Violation>),
    InvalidJson(serde_json::Error),
    PayloadTooLarge { limit: usize },
    BrokenPayload(PayloadError),
}

impl IngestError {
    pub fn message(&self) -> String {
        match self {
            IngestError::InvalidPayload(_) => "Invalid request payload.".to_owned(),
            IngestError::InvalidJson(_) => "Invalid JSON payload.".to_owned(),
            IngestError::PayloadTooLarge { limit } => {
                format!("Payload exceeds the limit of {} bytes.", limit)
            }
            IngestError::BrokenPayload(_) => "Internal server error.".to_owned(),
        }
    }
}

impl Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::InvalidJson(err) => write!(f, "{}: {}", self.message(), err),
            IngestError::BrokenPayload(err) => write!(f, "{}: {}", self.message(), err),
            _ => f.write_str(&self.message()),
        }
    }
}

impl std::error::Error for IngestError {}

impl ResponseError for IngestError {
    fn status_code(&self) -> StatusCode {
        match self {
            IngestError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            IngestError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            IngestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::BrokenPayload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            message: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            errors: Option<&'a [Violation]>,
        }

        if self.status_code().is_server_error() {
            tracing::error!("failed to ingest record: {}", self);
        }

        let errors = match self {
            IngestError::InvalidPayload(violations) => Some(violations.as_slice()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(&Dummy {
            message: self.message(),
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use serde_json::json;

    use super::*;

    #[actix_web::test]
    async fn broken_payloads_hide_their_cause() {
        let error = IngestError::BrokenPayload(PayloadError::Incomplete(None));

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "message": "Internal server error." }));
    }

    #[actix_web::test]
    async fn invalid_payloads_list_their_violations() {
        let error = IngestError::InvalidPayload(vec![Violation::new(
            vec!["id".into()],
            "Required",
        )]);

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({
                "message": "Invalid request payload.",
                "errors": [{ "path": ["id"], "message": "Required" }],
            })
        );
    }
}
