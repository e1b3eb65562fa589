//! # Request Extraction
//!
//! JSON bodies are taken as `Result<Json<T>, JsonRejection>` so that bad
//! input becomes a structured error body instead of axum's plain text:
//!
//! - unparseable JSON or a missing `Content-Type` → 400
//! - well-formed JSON of the wrong shape (unknown action, bad UUID) → 422
//! - a [`Validate`] failure → 422

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business rules a request DTO must satisfy beyond deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match result {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::JsonDataError(e)) => Err(AppError::Validation(e.body_text())),
        Err(other) => Err(AppError::BadRequest(other.body_text())),
    }
}

pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
