use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{LineId, ProviderId, ReservationId, ServiceId, UserId},
    reservation::{
        event::{CreateReservation, LineUpsert, NewReservedLine, UpdateReservation},
        LineStatus, Reservation, ReservationStatus, ReservedLine,
    },
    slot::Slot,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatusName {
    InCart,
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl From<ReservationStatus> for ReservationStatusName {
    fn from(value: ReservationStatus) -> Self {
        match value {
            ReservationStatus::InCart => Self::InCart,
            ReservationStatus::Pending => Self::Pending,
            ReservationStatus::Confirmed => Self::Confirmed,
            ReservationStatus::Cancelled => Self::Cancelled,
            ReservationStatus::Completed => Self::Completed,
        }
    }
}

impl From<ReservationStatusName> for ReservationStatus {
    fn from(value: ReservationStatusName) -> Self {
        match value {
            ReservationStatusName::InCart => Self::InCart,
            ReservationStatusName::Pending => Self::Pending,
            ReservationStatusName::Confirmed => Self::Confirmed,
            ReservationStatusName::Cancelled => Self::Cancelled,
            ReservationStatusName::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatusName {
    InCart,
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl From<LineStatus> for LineStatusName {
    fn from(value: LineStatus) -> Self {
        match value {
            LineStatus::InCart => Self::InCart,
            LineStatus::Pending => Self::Pending,
            LineStatus::Confirmed => Self::Confirmed,
            LineStatus::Cancelled => Self::Cancelled,
            LineStatus::Completed => Self::Completed,
        }
    }
}

impl From<LineStatusName> for LineStatus {
    fn from(value: LineStatusName) -> Self {
        match value {
            LineStatusName::InCart => Self::InCart,
            LineStatusName::Pending => Self::Pending,
            LineStatusName::Confirmed => Self::Confirmed,
            LineStatusName::Cancelled => Self::Cancelled,
            LineStatusName::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    #[garde(skip)]
    pub service_id: ServiceId,
    #[garde(skip)]
    pub start_date: NaiveDate,
    #[garde(skip)]
    pub end_date: Option<NaiveDate>,
    #[garde(skip)]
    pub start_time: NaiveTime,
    #[garde(skip)]
    pub end_time: NaiveTime,
    #[garde(range(min = 1))]
    pub duration_minutes: i32,
    #[garde(range(min = 1))]
    pub quantity: i32,
    #[garde(skip)]
    pub client_notes: Option<String>,
}

impl From<LineRequest> for NewReservedLine {
    fn from(value: LineRequest) -> Self {
        let LineRequest {
            service_id,
            start_date,
            end_date,
            start_time,
            end_time,
            duration_minutes,
            quantity,
            client_notes,
        } = value;
        NewReservedLine {
            service_id,
            slot: Slot::new(start_date, end_date, start_time, end_time),
            duration_minutes,
            quantity,
            client_notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(skip)]
    pub owner_id: UserId,
    #[garde(inner(length(min = 1)))]
    pub code: Option<String>,
    #[garde(skip)]
    pub notes: Option<String>,
    #[garde(dive)]
    pub lines: Vec<LineRequest>,
}

impl From<CreateReservationRequest> for CreateReservation {
    fn from(value: CreateReservationRequest) -> Self {
        let CreateReservationRequest {
            owner_id,
            code,
            notes,
            lines,
        } = value;
        CreateReservation {
            owner_id,
            code,
            notes,
            pre_validated: false,
            lines: lines.into_iter().map(NewReservedLine::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineUpsertRequest {
    #[garde(skip)]
    pub line_id: Option<LineId>,
    #[garde(skip)]
    pub service_id: ServiceId,
    #[garde(skip)]
    pub start_date: NaiveDate,
    #[garde(skip)]
    pub end_date: Option<NaiveDate>,
    #[garde(skip)]
    pub start_time: NaiveTime,
    #[garde(skip)]
    pub end_time: NaiveTime,
    #[garde(range(min = 1))]
    pub duration_minutes: i32,
    #[garde(range(min = 1))]
    pub quantity: i32,
    #[garde(skip)]
    pub status: Option<LineStatusName>,
    #[garde(skip)]
    pub client_notes: Option<String>,
    #[garde(skip)]
    pub provider_notes: Option<String>,
}

impl From<LineUpsertRequest> for LineUpsert {
    fn from(value: LineUpsertRequest) -> Self {
        let LineUpsertRequest {
            line_id,
            service_id,
            start_date,
            end_date,
            start_time,
            end_time,
            duration_minutes,
            quantity,
            status,
            client_notes,
            provider_notes,
        } = value;
        LineUpsert {
            line_id,
            service_id,
            slot: Slot::new(start_date, end_date, start_time, end_time),
            duration_minutes,
            quantity,
            status: status.map(LineStatus::from),
            client_notes,
            provider_notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    #[garde(skip)]
    pub requested_user: UserId,
    #[garde(skip)]
    pub notes: Option<String>,
    #[garde(dive)]
    pub lines: Vec<LineUpsertRequest>,
}

#[derive(new)]
pub struct UpdateReservationRequestWithId(ReservationId, UpdateReservationRequest);

impl From<UpdateReservationRequestWithId> for UpdateReservation {
    fn from(value: UpdateReservationRequestWithId) -> Self {
        let UpdateReservationRequestWithId(
            reservation_id,
            UpdateReservationRequest {
                requested_user,
                notes,
                lines,
            },
        ) = value;
        UpdateReservation {
            reservation_id,
            requested_user,
            notes,
            lines: lines.into_iter().map(LineUpsert::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationStatusRequest {
    pub status: ReservationStatusName,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLineStatusRequest {
    pub status: LineStatusName,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListQuery {
    #[garde(skip)]
    pub owner_id: Option<UserId>,
    #[garde(skip)]
    pub provider_id: Option<ProviderId>,
    #[garde(skip)]
    pub service_id: Option<ServiceId>,
    #[garde(skip)]
    pub from: Option<NaiveDate>,
    #[garde(skip)]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}

impl From<Vec<Reservation>> for ReservationsResponse {
    fn from(value: Vec<Reservation>) -> Self {
        Self {
            items: value.into_iter().map(ReservationResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub owner_id: UserId,
    pub code: String,
    pub status: ReservationStatusName,
    pub notes: Option<String>,
    pub total_price: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<LineResponse>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let total_price = value.total_price();
        let start_date = value.first_start_date();
        let end_date = value.last_end_date();
        let Reservation {
            reservation_id,
            owner_id,
            code,
            status,
            notes,
            created_at,
            updated_at,
            lines,
        } = value;
        Self {
            reservation_id,
            owner_id,
            code,
            status: status.into(),
            notes,
            total_price,
            start_date,
            end_date,
            created_at,
            updated_at,
            lines: lines.into_iter().map(LineResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
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
    pub status: LineStatusName,
    pub client_notes: Option<String>,
    pub provider_notes: Option<String>,
}

impl From<ReservedLine> for LineResponse {
    fn from(value: ReservedLine) -> Self {
        let ReservedLine {
            line_id,
            reservation_id,
            service_id,
            provider_id,
            slot,
            duration_minutes,
            quantity,
            unit_price,
            status,
            client_notes,
            provider_notes,
            created_at: _,
            updated_at: _,
        } = value;
        Self {
            line_id,
            reservation_id,
            service_id,
            provider_id,
            start_date: slot.start_date,
            end_date: slot.end_date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            duration_minutes,
            quantity,
            unit_price,
            status: status.into(),
            client_notes,
            provider_notes,
        }
    }
}
