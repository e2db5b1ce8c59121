use shared::error::{AppError, AppResult};

pub mod plan;
pub mod reservation;
pub mod service;

/// Status columns are stored as text; an unknown value is a data defect,
/// not a query error.
pub(crate) fn parse_status<T>(value: &str) -> AppResult<T>
where
    T: std::str::FromStr,
{
    value
        .parse()
        .map_err(|_| AppError::ConversionEntityError(format!("unknown status value: {value}")))
}
