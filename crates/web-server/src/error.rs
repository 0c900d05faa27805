use crate::response::ApiResponse;
use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::ErrorKind;
use database::DbError;
use thiserror::Error;
use validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Invalid request body: {0}")]
    MalformedBody(#[from] JsonRejection),
    #[error("Invalid form body: {0}")]
    MalformedForm(#[from] FormRejection),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("route not found")]
    RouteNotFound,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::MalformedBody(_) | AppError::MalformedForm(_) => {
                ErrorKind::Validation
            }
            AppError::Database(db_err) => db_err.kind(),
            AppError::RouteNotFound => ErrorKind::NotFound,
        }
    }
}

/// Maps an error kind to its HTTP status.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Internal error text attached to 500 responses as an extension. The
/// `expose_error_details` middleware copies it into the body outside
/// production.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    pub detail: String,
}

pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        let body = match &self {
            AppError::Validation(errors) => {
                ApiResponse::failure("validation failed").with_error(errors.to_string())
            }
            AppError::MalformedBody(rejection) => {
                ApiResponse::failure("invalid request body").with_error(rejection.body_text())
            }
            AppError::MalformedForm(rejection) => {
                ApiResponse::failure("invalid request body").with_error(rejection.body_text())
            }
            AppError::RouteNotFound => ApiResponse::failure("route not found"),
            AppError::Database(db_err) if kind.is_client_error() => {
                ApiResponse::failure(db_err.to_string())
            }
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                let mut response =
                    (status, Json(ApiResponse::failure(INTERNAL_ERROR_MESSAGE))).into_response();
                response.extensions_mut().insert(ErrorDetail {
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                    detail: db_err.to_string(),
                });
                return response;
            }
        };

        (status, Json(body)).into_response()
    }
}
