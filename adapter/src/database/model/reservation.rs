use super::parse_status;
use kernel::model::{
    id::{LineId, ProviderId, ReservationId, ServiceId, UserId},
    reservation::{Reservation, ReservedLine},
    slot::Slot,
};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub owner_id: UserId,
    pub code: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReservationRow {
    pub fn into_reservation(self, lines: Vec<ReservedLine>) -> AppResult<Reservation> {
        let ReservationRow {
            reservation_id,
            owner_id,
            code,
            status,
            notes,
            created_at,
            updated_at,
        } = self;
        Ok(Reservation {
            reservation_id,
            owner_id,
            code,
            status: parse_status(&status)?,
            notes,
            created_at,
            updated_at,
            lines,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct LineRow {
    pub line_id: LineId,
    pub reservation_id: ReservationId,
    pub service_id: ServiceId,
    pub provider_id: ProviderId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub status: String,
    pub client_notes: Option<String>,
    pub provider_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LineRow> for ReservedLine {
    type Error = AppError;

    fn try_from(value: LineRow) -> Result<Self, Self::Error> {
        let LineRow {
            line_id,
            reservation_id,
            service_id,
            provider_id,
            start_date,
            end_date,
            start_time,
            end_time,
            duration_minutes,
            quantity,
            unit_price,
            status,
            client_notes,
            provider_notes,
            created_at,
            updated_at,
        } = value;
        Ok(ReservedLine {
            line_id,
            reservation_id,
            service_id,
            provider_id,
            slot: Slot::new(start_date, end_date, start_time, end_time),
            duration_minutes,
            quantity,
            unit_price,
            status: parse_status(&status)?,
            client_notes,
            provider_notes,
            created_at,
            updated_at,
        })
    }
}
