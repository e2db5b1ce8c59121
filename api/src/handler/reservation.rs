use crate::model::reservation::{
    CreateReservationRequest, LineResponse, ReservationListQuery, ReservationResponse,
    ReservationsResponse, UpdateLineStatusRequest, UpdateReservationRequest,
    UpdateReservationRequestWithId, UpdateReservationStatusRequest,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{LineId, ReservationId},
    reservation::event::{ChangeLineStatus, ChangeReservationStatus},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn create_reservation(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    req.validate(&())?;

    let repository = registry.reservation_repository();
    let reservation_id = repository.create(req.into()).await?;
    let reservation = repository.find_by_id(reservation_id).await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}

pub async fn show_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn show_reservation_list(
    Query(query): Query<ReservationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    query.validate(&())?;

    let repository = registry.reservation_repository();
    let items = if let Some(owner_id) = query.owner_id {
        repository.find_by_owner(owner_id).await?
    } else if let Some(provider_id) = query.provider_id {
        repository.find_by_provider(provider_id).await?
    } else if let Some(service_id) = query.service_id {
        repository.find_by_service(service_id).await?
    } else if let (Some(from), Some(to)) = (query.from, query.to) {
        repository.find_in_range(from, to).await?
    } else {
        return Err(AppError::UnprocessableEntity(
            "one of ownerId, providerId, serviceId or from/to is required".into(),
        ));
    };
    Ok(Json(items.into()))
}

pub async fn update_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReservationRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let update = UpdateReservationRequestWithId::new(reservation_id, req);
    registry
        .reservation_repository()
        .update(update.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn update_reservation_status(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReservationStatusRequest>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .set_status(ChangeReservationStatus::new(
            reservation_id,
            req.status.into(),
        ))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_reservation(
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .delete(reservation_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn show_line(
    Path(line_id): Path<LineId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<LineResponse>> {
    registry
        .reservation_repository()
        .find_line_by_id(line_id)
        .await
        .map(LineResponse::from)
        .map(Json)
}

pub async fn update_line_status(
    Path(line_id): Path<LineId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateLineStatusRequest>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .set_line_status(ChangeLineStatus::new(line_id, req.status.into()))
        .await
        .map(|_| StatusCode::OK)
}
