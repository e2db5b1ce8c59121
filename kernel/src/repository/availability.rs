use crate::model::{
    id::{LineId, ServiceId},
    slot::Slot,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::error::AppResult;

/// Read-side availability checks. Only committed (pending/confirmed) lines
/// participate; in-cart lines never block a slot.
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// True when a committed line of the service intersects the slot.
    /// `exclude_line` ignores one specific line, used when re-checking an
    /// existing line being edited.
    async fn has_overlap(
        &self,
        service_id: ServiceId,
        slot: Slot,
        exclude_line: Option<LineId>,
    ) -> AppResult<bool>;
    /// True when some active schedule window of the service on that
    /// weekday fully contains the time range.
    async fn within_schedule(
        &self,
        service_id: ServiceId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<bool>;
    /// True while committed lines on the exact (date, start time) slot stay
    /// below the service capacity.
    async fn has_capacity(
        &self,
        service_id: ServiceId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> AppResult<bool>;
    /// within_schedule AND NOT has_overlap AND has_capacity.
    async fn is_available(
        &self,
        service_id: ServiceId,
        slot: Slot,
        exclude_line: Option<LineId>,
    ) -> AppResult<bool>;
}
