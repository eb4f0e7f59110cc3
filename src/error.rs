use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, JsonEnvelope, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(what: &str, id: i32) -> Self {
        AppError::NotFound(format!("No {what} found with id {id}"))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::OrmError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log_if_internal(&self) {
        match self {
            AppError::OrmError(err) => tracing::error!(error = %err, "database failure"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal failure"),
            _ => {}
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log_if_internal();
        let status = self.status();
        let message = self.to_string();

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Error rendering for the `/api/reups` REST endpoints, which answer with the
/// `{status, data: {message}}` envelope and their own status codes.
#[derive(Debug)]
pub struct LegacyError(pub AppError);

impl From<AppError> for LegacyError {
    fn from(err: AppError) -> Self {
        LegacyError(err)
    }
}

impl From<sea_orm::DbErr> for LegacyError {
    fn from(err: sea_orm::DbErr) -> Self {
        LegacyError(AppError::OrmError(err))
    }
}

impl IntoResponse for LegacyError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log_if_internal();
        let (status, envelope) = match &err {
            AppError::Unauthorized => (
                StatusCode::FORBIDDEN,
                JsonEnvelope::unauthorized("You must be logged in to do that."),
            ),
            AppError::NotFound(message)
            | AppError::Validation(message)
            | AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, JsonEnvelope::error(message.clone()))
            }
            AppError::OrmError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                JsonEnvelope::internal(e.to_string()),
            ),
            AppError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                JsonEnvelope::internal(e.to_string()),
            ),
        };

        (status, axum::Json(envelope)).into_response()
    }
}

pub type LegacyResult<T> = Result<T, LegacyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::not_found("ReUp", 4).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("title: too short".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn legacy_unauthorized_is_forbidden() {
        let response = LegacyError(AppError::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = LegacyError(AppError::not_found("ReUp", 1)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(
            AppError::not_found("ReUp", 12).to_string(),
            "No ReUp found with id 12"
        );
    }
}
