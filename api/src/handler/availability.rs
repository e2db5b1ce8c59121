use crate::model::availability::{AvailabilityQuery, AvailabilityResponse};
use axum::{
    extract::{Query, State},
    Json,
};
use garde::Validate;
use kernel::model::slot::Slot;
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn check_availability(
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AvailabilityResponse>> {
    query.validate(&())?;
    let slot = Slot::new(query.date, query.end_date, query.start, query.end);
    slot.validate()?;

    let repository = registry.availability_repository();
    let within_schedule = repository
        .within_schedule(query.service_id, query.date, query.start, query.end)
        .await?;
    let overlapping = repository
        .has_overlap(query.service_id, slot, query.exclude_line_id)
        .await?;
    let capacity_left = repository
        .has_capacity(query.service_id, query.date, query.start)
        .await?;

    Ok(Json(AvailabilityResponse {
        available: within_schedule && !overlapping && capacity_left,
        within_schedule,
        overlapping,
        capacity_left,
    }))
}
