use kernel::model::{
    id::{ProviderId, ServiceId, WindowId},
    schedule::{weekday_from_index, ScheduleWindow},
    service::ServiceSummary,
};
use rust_decimal::Decimal;
use shared::error::AppError;
use sqlx::types::chrono::NaiveTime;

#[derive(sqlx::FromRow)]
pub struct ServiceRow {
    pub service_id: ServiceId,
    pub service_name: String,
    pub provider_id: ProviderId,
    pub capacity: i32,
    pub reference_price: Decimal,
    pub is_active: bool,
}

impl From<ServiceRow> for ServiceSummary {
    fn from(value: ServiceRow) -> Self {
        let ServiceRow {
            service_id,
            service_name,
            provider_id,
            capacity,
            reference_price,
            is_active,
        } = value;
        ServiceSummary {
            service_id,
            service_name,
            provider_id,
            capacity,
            reference_price,
            is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct ScheduleWindowRow {
    pub window_id: WindowId,
    pub service_id: ServiceId,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl TryFrom<ScheduleWindowRow> for ScheduleWindow {
    type Error = AppError;

    fn try_from(value: ScheduleWindowRow) -> Result<Self, Self::Error> {
        let ScheduleWindowRow {
            window_id,
            service_id,
            weekday,
            start_time,
            end_time,
            is_active,
        } = value;
        let weekday = weekday_from_index(weekday).ok_or_else(|| {
            AppError::ConversionEntityError(format!("weekday index out of range: {weekday}"))
        })?;
        Ok(ScheduleWindow {
            window_id,
            service_id,
            weekday,
            start_time,
            end_time,
            is_active,
        })
    }
}
