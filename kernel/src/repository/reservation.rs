use crate::model::{
    id::{LineId, ProviderId, ReservationId, ServiceId, UserId},
    reservation::{
        event::{
            AddCartLine, ChangeLineStatus, ChangeReservationStatus, ConfirmCart,
            CreateReservation, RemoveCartLine, UpdateReservation,
        },
        Reservation, ReservedLine,
    },
};
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

/// The cart/reservation aggregate. Every mutation below is one atomic unit
/// against the store; partial writes never survive a failure.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Returns the caller's cart, creating it when absent. Safe under
    /// concurrent first calls for the same user.
    async fn get_or_create_cart(&self, user_id: UserId) -> AppResult<Reservation>;
    /// Validates availability against committed lines, then appends an
    /// in-cart line priced from the service's reference price.
    async fn add_cart_line(&self, event: AddCartLine) -> AppResult<Reservation>;
    async fn remove_cart_line(&self, event: RemoveCartLine) -> AppResult<()>;
    /// Re-validates every line, then moves the cart and all its lines to
    /// pending in one transaction.
    async fn confirm_cart(&self, event: ConfirmCart) -> AppResult<Reservation>;
    /// Deletes all lines; the cart itself stays, empty and in-cart.
    async fn empty_cart(&self, user_id: UserId) -> AppResult<()>;

    /// Direct booking and plan materialization. Inserts the reservation and
    /// all lines as pending.
    async fn create(&self, event: CreateReservation) -> AppResult<ReservationId>;
    /// Replaces the line set: present ids update in place, absent lines are
    /// deleted, entries without an id are inserted.
    async fn update(&self, event: UpdateReservation) -> AppResult<()>;
    async fn set_status(&self, event: ChangeReservationStatus) -> AppResult<()>;
    async fn set_line_status(&self, event: ChangeLineStatus) -> AppResult<()>;
    /// Explicit cascade: child lines first, then the reservation.
    async fn delete(&self, reservation_id: ReservationId) -> AppResult<()>;

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation>;
    async fn find_line_by_id(&self, line_id: LineId) -> AppResult<ReservedLine>;
    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Reservation>>;
    async fn find_by_provider(&self, provider_id: ProviderId) -> AppResult<Vec<Reservation>>;
    async fn find_by_service(&self, service_id: ServiceId) -> AppResult<Vec<Reservation>>;
    async fn find_in_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Reservation>>;
}
