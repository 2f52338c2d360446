use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    BadRequest { error: String, details: Value },
    NotFound(String),
    InternalServerError { error: String, details: Value },
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: &'a Value,
}

impl AppError {
    pub fn bad_request(error: impl Into<String>, details: impl Into<Value>) -> Self {
        AppError::BadRequest { error: error.into(), details: details.into() }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        AppError::NotFound(error.into())
    }

    /// Wraps a store failure under a human-readable context message.
    /// Constraint violations are the caller's fault; everything else is ours.
    pub fn from_store(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::bad_request(context, msg),
            StoreError::Database(msg) => {
                error!("{}: {}", context, msg);
                AppError::InternalServerError { error: context.to_string(), details: Value::String(msg) }
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest { error, details } => write!(f, "Bad Request: {} ({})", error, details),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError { error, details } => {
                write!(f, "Internal Server Error: {} ({})", error, details)
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest { error, details } => {
                HttpResponse::BadRequest().json(ErrorResponse { error, details })
            }
            AppError::NotFound(msg) => {
                HttpResponse::NotFound().json(ErrorResponse { error: msg, details: &Value::Null })
            }
            AppError::InternalServerError { error, details } => {
                HttpResponse::InternalServerError().json(ErrorResponse { error, details })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use serde_json::json;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn conflict_becomes_bad_request_with_details() {
        let err = AppError::from_store(
            "Failed to create employee",
            StoreError::Conflict("email already exists".into()),
        );
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Failed to create employee", "details": "email already exists" }));
    }

    #[actix_web::test]
    async fn database_failure_becomes_internal_error() {
        let err = AppError::from_store("Failed to fetch departments", StoreError::Database("pool timed out".into()));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["details"], "pool timed out");
    }

    #[actix_web::test]
    async fn not_found_omits_details() {
        let (status, body) = body_of(AppError::not_found("Department not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Department not found" }));
    }
}
