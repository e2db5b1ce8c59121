use crate::model::{
    plan::{EnrollRequest, EnrollmentResponse, UpdateEnrollmentStatusRequest},
    reservation::ReservationResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{EnrollmentId, PlanId},
    plan::{
        event::{ChangeEnrollmentStatus, EnrollInPlan},
        EnrollmentStatus,
    },
    reservation::event::CreateReservation,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn enroll_in_plan(
    Path(plan_id): Path<PlanId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<EnrollRequest>,
) -> AppResult<(StatusCode, Json<EnrollmentResponse>)> {
    req.validate(&())?;

    let repository = registry.plan_repository();
    let enrollment_id = repository
        .enroll(EnrollInPlan::new(plan_id, req.user_id))
        .await?;
    let enrollment = repository
        .find_enrollment_by_id(enrollment_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("enrollment ({enrollment_id}) was not found"))
        })?;
    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

pub async fn update_enrollment_status(
    Path(enrollment_id): Path<EnrollmentId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateEnrollmentStatusRequest>,
) -> AppResult<StatusCode> {
    registry
        .plan_repository()
        .set_enrollment_status(ChangeEnrollmentStatus::new(enrollment_id, req.status.into()))
        .await
        .map(|_| StatusCode::OK)
}

/// Expands a confirmed enrollment into a concrete reservation, one pending
/// line per template entry. Calling this twice creates a second
/// reservation; guarding against re-invocation is the caller's job.
pub async fn materialize_enrollment(
    Path(enrollment_id): Path<EnrollmentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    let plan_repository = registry.plan_repository();

    let enrollment = plan_repository
        .find_enrollment_by_id(enrollment_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("enrollment ({enrollment_id}) was not found"))
        })?;
    if enrollment.status != EnrollmentStatus::Confirmed {
        return Err(AppError::UnprocessableEntity(
            "only a confirmed enrollment can be materialized".into(),
        ));
    }

    let plan = plan_repository
        .find_plan_by_id(enrollment.plan_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("plan ({}) was not found", enrollment.plan_id))
        })?;

    // The enrollment check stands in for per-line availability validation.
    let reservation_repository = registry.reservation_repository();
    let reservation_id = reservation_repository
        .create(CreateReservation::new(
            enrollment.user_id,
            None,
            None,
            true,
            plan.materialize_lines(),
        ))
        .await?;
    let reservation = reservation_repository.find_by_id(reservation_id).await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}
