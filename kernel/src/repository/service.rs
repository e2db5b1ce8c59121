use crate::model::{id::ServiceId, schedule::ScheduleWindow, service::ServiceSummary};
use async_trait::async_trait;
use chrono::Weekday;
use shared::error::AppResult;

/// Read interface over the (externally owned) service catalog.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, service_id: ServiceId) -> AppResult<Option<ServiceSummary>>;
    /// Active windows for one weekday, ordered by start time.
    async fn windows_for(
        &self,
        service_id: ServiceId,
        weekday: Weekday,
    ) -> AppResult<Vec<ScheduleWindow>>;
}
