use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

use crate::ledger::LedgerError;
use crate::middleware::logging::{to_response, Failure};

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    Validation(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        ApiError::Internal(format!("Database error: {err}"))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(err) => match err {
                err if err.is_validation() => StatusCode::BAD_REQUEST,
                LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
                LedgerError::InsufficientStock { .. }
                | LedgerError::InvalidTransition { .. }
                | LedgerError::SaleClosed { .. }
                | LedgerError::StillReferenced { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, failure) = match self {
            ApiError::Ledger(LedgerError::Consistency(reason)) => (
                "Internal server error".to_owned(),
                Failure::Consistency(reason),
            ),
            ApiError::Ledger(LedgerError::Database(err)) => (
                "Internal server error".to_owned(),
                Failure::Internal(err.to_string()),
            ),
            ApiError::Ledger(err) => (err.to_string(), Failure::Rejected(err.to_string())),
            ApiError::Internal(reason) => {
                ("Internal server error".to_owned(), Failure::Internal(reason))
            }
            ApiError::Validation(reason)
            | ApiError::Unauthorized(reason)
            | ApiError::Conflict(reason) => (reason.clone(), Failure::Rejected(reason)),
        };

        to_response(
            (
                status,
                Json(json!({
                    "error": message
                })),
            ),
            Err(failure),
        )
    }
}

pub type ApiResult = Result<Response, ApiError>;

pub fn respond<T: Serialize>(status: StatusCode, body: T) -> ApiResult {
    Ok(to_response((status, Json(body)), Ok(())))
}
