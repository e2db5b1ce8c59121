use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    AvailabilityConflict(String),
    #[error("{0}")]
    CapacityExceeded(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("operation not permitted for the requesting user")]
    ForbiddenOperation,
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("transaction error")]
    TransactionError(#[source] sqlx::Error),
    #[error("database query error")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::AvailabilityConflict(_) | AppError::CapacityExceeded(_) => {
                StatusCode::CONFLICT
            }
            AppError::ValidationError(_) | AppError::ConversionEntityError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "unexpected error happened"
            );
        } else {
            tracing::warn!(
                error.cause_chain = ?self,
                error.message = %self,
                "request failed"
            );
        }

        status_code.into_response()
    }
}
