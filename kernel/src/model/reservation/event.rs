use crate::model::{
    id::{LineId, ReservationId, ServiceId, UserId},
    reservation::{LineStatus, ReservationStatus},
    slot::Slot,
};
use derive_new::new;

/// Input for one line to be booked. Provider and unit price are resolved
/// from the service catalog at insert time, never taken from the caller.
#[derive(Debug, Clone, new)]
pub struct NewReservedLine {
    pub service_id: ServiceId,
    pub slot: Slot,
    pub duration_minutes: i32,
    pub quantity: i32,
    pub client_notes: Option<String>,
}

#[derive(Debug, new)]
pub struct AddCartLine {
    pub user_id: UserId,
    pub line: NewReservedLine,
}

#[derive(Debug, new)]
pub struct RemoveCartLine {
    pub line_id: LineId,
    pub requested_user: UserId,
}

#[derive(Debug, new)]
pub struct ConfirmCart {
    pub user_id: UserId,
    pub notes: Option<String>,
}

#[derive(Debug, new)]
pub struct CreateReservation {
    pub owner_id: UserId,
    pub code: Option<String>,
    pub notes: Option<String>,
    /// The plan materializer sets this: enrollment validation already
    /// happened, so per-line availability checks are skipped.
    pub pre_validated: bool,
    pub lines: Vec<NewReservedLine>,
}

#[derive(Debug, new)]
pub struct UpdateReservation {
    pub reservation_id: ReservationId,
    pub requested_user: UserId,
    pub notes: Option<String>,
    pub lines: Vec<LineUpsert>,
}

/// One entry of the replacement line set submitted to `update`. A present
/// `line_id` updates that line in place; an absent one inserts a new line.
/// Lines missing from the submitted set are deleted.
#[derive(Debug, Clone, new)]
pub struct LineUpsert {
    pub line_id: Option<LineId>,
    pub service_id: ServiceId,
    pub slot: Slot,
    pub duration_minutes: i32,
    pub quantity: i32,
    pub status: Option<LineStatus>,
    pub client_notes: Option<String>,
    pub provider_notes: Option<String>,
}

#[derive(Debug, new)]
pub struct ChangeReservationStatus {
    pub reservation_id: ReservationId,
    pub new_status: ReservationStatus,
}

#[derive(Debug, new)]
pub struct ChangeLineStatus {
    pub line_id: LineId,
    pub new_status: LineStatus,
}
