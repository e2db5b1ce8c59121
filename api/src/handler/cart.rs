use crate::model::{
    cart::ConfirmCartRequest,
    reservation::{LineRequest, ReservationResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{LineId, UserId},
    reservation::event::{AddCartLine, ConfirmCart, RemoveCartLine},
};
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn show_cart(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .get_or_create_cart(user_id)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn add_cart_line(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<LineRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    req.validate(&())?;

    registry
        .reservation_repository()
        .add_cart_line(AddCartLine::new(user_id, req.into()))
        .await
        .map(|cart| (StatusCode::CREATED, Json(cart.into())))
}

pub async fn remove_cart_line(
    Path((user_id, line_id)): Path<(UserId, LineId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .remove_cart_line(RemoveCartLine::new(line_id, user_id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn confirm_cart(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<ConfirmCartRequest>,
) -> AppResult<Json<ReservationResponse>> {
    req.validate(&())?;

    registry
        .reservation_repository()
        .confirm_cart(ConfirmCart::new(user_id, req.notes))
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn empty_cart(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .reservation_repository()
        .empty_cart(user_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
