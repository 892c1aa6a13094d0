//! Error types.
//!
//! Two families live here. [`Error`] surfaces infrastructure failures from
//! startup and serving (binding a port, reading configuration). [`ApiError`]
//! is what handlers return: every variant maps to one status code and renders
//! as `{"detail": "<message>"}`.

use serde::Serialize;

use crate::response::{IntoResponse, Json, Response};
use crate::schema::SchemaError;
use crate::status::Status;

/// The error type returned by michi's fallible infrastructure operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {key}: {message}")]
    Config { key: &'static str, message: String },

    #[error("telemetry: {0}")]
    Telemetry(String),
}

/// A request-level failure, converted to a response at the dispatch boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 400: a required input is missing or out of range.
    #[error("{0}")]
    Validation(String),

    /// 404: the addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// 422: the input could not be parsed into the declared shape.
    #[error("{0}")]
    Unprocessable(String),

    /// 500
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::Unprocessable(detail.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_)    => Status::BadRequest,
            Self::NotFound(_)      => Status::NotFound,
            Self::Unprocessable(_) => Status::UnprocessableContent,
            Self::Internal(_)      => Status::InternalServerError,
        }
    }
}

/// Error body shape shared by every non-2xx JSON response.
#[derive(Debug, Serialize)]
pub struct Detail<'a> {
    pub detail: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        Json(Detail { detail: &detail }).with_status(status)
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        Self::Unprocessable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_detail_body_with_mapped_status() {
        let res = ApiError::not_found("station not found").into_response();

        assert_eq!(res.status_code(), 404);
        assert_eq!(res.body(), br#"{"detail":"station not found"}"#);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        assert_eq!(ApiError::validation("x").status(), Status::BadRequest);
        assert_eq!(ApiError::unprocessable("x").status(), Status::UnprocessableContent);
    }
}
