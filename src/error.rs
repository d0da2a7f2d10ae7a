use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::campaign::CampaignId;
use crate::segment::SegmentId;
use crate::validation::Violation;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    ValidationFailed {
        violations: Vec<Violation>,
    },

    // 404
    PathNotFound,
    SegmentNotFound {
        segment_id: SegmentId,
    },
    CampaignNotFound {
        campaign_id: CampaignId,
    },

    // 409
    ConcurrentModificationDetected,

    // 502
    OptimizationFailed {
        message: String,
    },

    // 503
    OptimizerUnavailable,

    // 500
    ExistentialState(String),
    InvalidConfiguration {
        key: String,
        value: String,
    },
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::ValidationFailed { .. } => "E4001002",
            Error::PathNotFound => "E4041000",
            Error::SegmentNotFound { .. } => "E4041001",
            Error::CampaignNotFound { .. } => "E4041002",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::OptimizationFailed { .. } => "E5021000",
            Error::OptimizerUnavailable => "E5031000",
            Error::ExistentialState(_) => "E5001000",
            Error::InvalidConfiguration { .. } => "E5001001",
            Error::FailedDatabaseCall(_) => "E5001002",
            Error::FailedToSerializeToBson(_) => "E5001003",
            Error::IoError(_) => "E5001004",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::ValidationFailed { .. } => "The given data failed validation",
            Error::PathNotFound => "The requested path was not found",
            Error::SegmentNotFound { .. } => "The requested segment was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::OptimizationFailed { .. } => "The campaign optimizer could not complete",
            Error::OptimizerUnavailable => "The campaign optimizer is not configured",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::InvalidConfiguration { .. } => "The server configuration is invalid",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::SegmentNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::OptimizationFailed { .. } => StatusCode::BAD_GATEWAY,
            Error::OptimizerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfiguration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        if self.status_code().is_server_error() {
            tracing::error!(error_code = self.error_code(), "{}", self);
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use serde_json::json;

    use super::*;

    #[actix_web::test]
    async fn validation_errors_render_their_violations() {
        let error = Error::ValidationFailed {
            violations: vec![Violation::new(vec!["name".into()], "Required")],
        };

        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({
                "error_code": "E4001002",
                "error_message": "The given data failed validation",
                "error_meta": { "violations": [{ "path": ["name"], "message": "Required" }] },
            })
        );
    }

    #[test]
    fn optimizer_failures_map_to_gateway_errors() {
        let error = Error::OptimizationFailed {
            message: "flow returned 500".into(),
        };

        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(Error::OptimizerUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
