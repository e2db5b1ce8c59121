use crate::database::{
    model::{
        parse_status,
        reservation::{LineRow, ReservationRow},
    },
    ConnectionPool,
};
use crate::repository::availability::ensure_available;
use crate::repository::service::fetch_service;
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    id::{LineId, ProviderId, ReservationId, ServiceId, UserId},
    reservation::{
        event::{
            AddCartLine, ChangeLineStatus, ChangeReservationStatus, ConfirmCart,
            CreateReservation, NewReservedLine, RemoveCartLine, UpdateReservation,
        },
        LineStatus, Reservation, ReservationStatus, ReservedLine,
    },
    slot::Slot,
};
use kernel::repository::reservation::ReservationRepository;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};
use std::collections::HashMap;
use uuid::Uuid;

const CODE_GENERATION_ATTEMPTS: u32 = 3;

const RESERVATION_COLUMNS: &str =
    "reservation_id, owner_id, code, status, notes, created_at, updated_at";
const LINE_COLUMNS: &str = "line_id, reservation_id, service_id, provider_id, \
     start_date, end_date, start_time, end_time, duration_minutes, quantity, \
     unit_price, status, client_notes, provider_notes, created_at, updated_at";

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn get_or_create_cart(&self, user_id: UserId) -> AppResult<Reservation> {
        // Insert-then-reselect: the partial unique index on
        // (owner_id) WHERE status = 'in_cart' resolves concurrent first
        // calls, a unique violation only means somebody else won the race
        // (or the generated code collided) and looping re-reads the winner.
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            if let Some(row) = self.fetch_cart_row(user_id).await? {
                return self.assemble(row).await;
            }

            let res = sqlx::query(
                r#"
                INSERT INTO reservations (reservation_id, owner_id, code, status)
                VALUES ($1, $2, $3, 'in_cart')
                "#,
            )
            .bind(ReservationId::new())
            .bind(user_id)
            .bind(Reservation::generate_code())
            .execute(self.db.inner_ref())
            .await;

            match res {
                Ok(_) => {
                    if let Some(row) = self.fetch_cart_row(user_id).await? {
                        return self.assemble(row).await;
                    }
                }
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(AppError::SpecificOperationError(e)),
            }
        }
        Err(AppError::NoRowsAffectedError(
            "no cart record has been created".into(),
        ))
    }

    async fn add_cart_line(&self, event: AddCartLine) -> AppResult<Reservation> {
        let AddCartLine { user_id, line } = event;
        line.slot.validate()?;
        ensure_quantity(line.quantity)?;

        let cart = self.get_or_create_cart(user_id).await?;

        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let service = fetch_service(&mut *tx, line.service_id)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!("service ({}) was not found", line.service_id))
            })?;
        if !service.is_active {
            return Err(AppError::UnprocessableEntity(format!(
                "service ({}) is not currently bookable",
                line.service_id
            )));
        }

        ensure_available(&mut *tx, line.service_id, line.slot, None).await?;
        insert_line(
            &mut tx,
            cart.reservation_id,
            &line,
            service.provider_id,
            service.reference_price,
            LineStatus::InCart,
        )
        .await?;
        touch_reservation(&mut tx, cart.reservation_id).await?;

        tx.commit().await.map_err(commit_error)?;

        self.find_by_id(cart.reservation_id).await
    }

    async fn remove_cart_line(&self, event: RemoveCartLine) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let row: Option<(ReservationId, UserId, String)> = sqlx::query_as(
            r#"
            SELECT l.reservation_id, r.owner_id, r.status
            FROM reserved_lines AS l
            INNER JOIN reservations AS r ON l.reservation_id = r.reservation_id
            WHERE l.line_id = $1
            "#,
        )
        .bind(event.line_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some((reservation_id, owner_id, status)) = row else {
            return Err(AppError::EntityNotFound(format!(
                "reservation line ({}) was not found",
                event.line_id
            )));
        };
        if owner_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }
        let status: ReservationStatus = parse_status(&status)?;
        if status != ReservationStatus::InCart {
            return Err(AppError::UnprocessableEntity(
                "lines can only be removed while the reservation is still a cart".into(),
            ));
        }

        let res = sqlx::query("DELETE FROM reserved_lines WHERE line_id = $1")
            .bind(event.line_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no reservation line record has been deleted".into(),
            ));
        }
        touch_reservation(&mut tx, reservation_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)
    }

    async fn confirm_cart(&self, event: ConfirmCart) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let cart: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE owner_id = $1 AND status = 'in_cart'"
        ))
        .bind(event.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(cart) = cart else {
            return Err(AppError::EntityNotFound(format!(
                "user ({}) has no cart",
                event.user_id
            )));
        };

        let line_rows: Vec<LineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM reserved_lines \
             WHERE reservation_id = $1 ORDER BY created_at ASC"
        ))
        .bind(cart.reservation_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if line_rows.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "an empty cart cannot be confirmed".into(),
            ));
        }

        // Each line is re-checked against committed lines; lines confirmed
        // earlier in this loop are already visible to later checks, so a
        // cart conflicting with itself also fails here.
        for row in &line_rows {
            let slot = Slot::new(row.start_date, row.end_date, row.start_time, row.end_time);
            ensure_available(&mut *tx, row.service_id, slot, Some(row.line_id)).await?;

            let res = sqlx::query(
                r#"
                UPDATE reserved_lines
                SET status = 'pending', updated_at = CURRENT_TIMESTAMP(3)
                WHERE line_id = $1
                "#,
            )
            .bind(row.line_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
            if res.rows_affected() < 1 {
                return Err(AppError::NoRowsAffectedError(
                    "no reservation line record has been updated".into(),
                ));
            }
        }

        let res = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'pending',
                notes = COALESCE($2, notes),
                updated_at = CURRENT_TIMESTAMP(3)
            WHERE reservation_id = $1
            "#,
        )
        .bind(cart.reservation_id)
        .bind(event.notes.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no reservation record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(commit_error)?;

        self.find_by_id(cart.reservation_id).await
    }

    async fn empty_cart(&self, user_id: UserId) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let cart: Option<(ReservationId,)> = sqlx::query_as(
            "SELECT reservation_id FROM reservations WHERE owner_id = $1 AND status = 'in_cart'",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some((reservation_id,)) = cart else {
            return Err(AppError::EntityNotFound(format!(
                "user ({user_id}) has no cart"
            )));
        };

        sqlx::query("DELETE FROM reserved_lines WHERE reservation_id = $1")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        touch_reservation(&mut tx, reservation_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)
    }

    async fn create(&self, event: CreateReservation) -> AppResult<ReservationId> {
        for line in &event.lines {
            line.slot.validate()?;
            ensure_quantity(line.quantity)?;
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let reservation_id = ReservationId::new();
            let code = event
                .code
                .clone()
                .unwrap_or_else(Reservation::generate_code);
            match self.try_create(reservation_id, &code, &event).await {
                Ok(()) => return Ok(reservation_id),
                Err(AppError::SpecificOperationError(e))
                    if is_code_collision(&e)
                        && event.code.is_none()
                        && attempt < CODE_GENERATION_ATTEMPTS =>
                {
                    continue
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn update(&self, event: UpdateReservation) -> AppResult<()> {
        for upsert in &event.lines {
            upsert.slot.validate()?;
            ensure_quantity(upsert.quantity)?;
        }

        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let current: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = $1"
        ))
        .bind(event.reservation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(current) = current else {
            return Err(AppError::EntityNotFound(format!(
                "reservation ({}) was not found",
                event.reservation_id
            )));
        };
        if current.owner_id != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }
        let current_status: ReservationStatus = parse_status(&current.status)?;

        let existing_ids: Vec<LineId> =
            sqlx::query_scalar("SELECT line_id FROM reserved_lines WHERE reservation_id = $1")
                .bind(event.reservation_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;

        for upsert in &event.lines {
            if let Some(line_id) = upsert.line_id {
                if !existing_ids.contains(&line_id) {
                    return Err(AppError::EntityNotFound(format!(
                        "reservation line ({line_id}) was not found"
                    )));
                }
            }
        }

        // Absent lines go first so their slots are free again when the
        // remaining lines are re-checked.
        let submitted: Vec<LineId> = event.lines.iter().filter_map(|u| u.line_id).collect();
        for line_id in existing_ids.iter().filter(|id| !submitted.contains(id)) {
            sqlx::query("DELETE FROM reserved_lines WHERE line_id = $1")
                .bind(*line_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        }

        for upsert in &event.lines {
            let service = fetch_service(&mut *tx, upsert.service_id)
                .await?
                .ok_or_else(|| {
                    AppError::EntityNotFound(format!(
                        "service ({}) was not found",
                        upsert.service_id
                    ))
                })?;
            let status = upsert
                .status
                .unwrap_or_else(|| current_status.cascade());

            match upsert.line_id {
                Some(line_id) => {
                    if status.is_committed() {
                        ensure_available(&mut *tx, upsert.service_id, upsert.slot, Some(line_id))
                            .await?;
                    }
                    let res = sqlx::query(
                        r#"
                        UPDATE reserved_lines
                        SET service_id = $2,
                            provider_id = $3,
                            start_date = $4,
                            end_date = $5,
                            start_time = $6,
                            end_time = $7,
                            duration_minutes = $8,
                            quantity = $9,
                            unit_price = $10,
                            status = $11,
                            client_notes = $12,
                            provider_notes = $13,
                            updated_at = CURRENT_TIMESTAMP(3)
                        WHERE line_id = $1 AND reservation_id = $14
                        "#,
                    )
                    .bind(line_id)
                    .bind(upsert.service_id)
                    .bind(service.provider_id)
                    .bind(upsert.slot.start_date)
                    .bind(upsert.slot.end_date)
                    .bind(upsert.slot.start_time)
                    .bind(upsert.slot.end_time)
                    .bind(upsert.duration_minutes)
                    .bind(upsert.quantity)
                    .bind(service.reference_price)
                    .bind(status.to_string())
                    .bind(upsert.client_notes.as_deref())
                    .bind(upsert.provider_notes.as_deref())
                    .bind(event.reservation_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
                    if res.rows_affected() < 1 {
                        return Err(AppError::NoRowsAffectedError(
                            "no reservation line record has been updated".into(),
                        ));
                    }
                }
                None => {
                    if status.is_committed() {
                        ensure_available(&mut *tx, upsert.service_id, upsert.slot, None).await?;
                    }
                    let res = sqlx::query(
                        r#"
                        INSERT INTO reserved_lines
                        (line_id, reservation_id, service_id, provider_id,
                         start_date, end_date, start_time, end_time,
                         duration_minutes, quantity, unit_price, status,
                         client_notes, provider_notes)
                        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                        "#,
                    )
                    .bind(LineId::new())
                    .bind(event.reservation_id)
                    .bind(upsert.service_id)
                    .bind(service.provider_id)
                    .bind(upsert.slot.start_date)
                    .bind(upsert.slot.end_date)
                    .bind(upsert.slot.start_time)
                    .bind(upsert.slot.end_time)
                    .bind(upsert.duration_minutes)
                    .bind(upsert.quantity)
                    .bind(service.reference_price)
                    .bind(status.to_string())
                    .bind(upsert.client_notes.as_deref())
                    .bind(upsert.provider_notes.as_deref())
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;
                    if res.rows_affected() < 1 {
                        return Err(AppError::NoRowsAffectedError(
                            "no reservation line record has been created".into(),
                        ));
                    }
                }
            }
        }

        let res = sqlx::query(
            r#"
            UPDATE reservations
            SET notes = COALESCE($2, notes), updated_at = CURRENT_TIMESTAMP(3)
            WHERE reservation_id = $1
            "#,
        )
        .bind(event.reservation_id)
        .bind(event.notes.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no reservation record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(commit_error)
    }

    async fn set_status(&self, event: ChangeReservationStatus) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let status_text: Option<String> =
            sqlx::query_scalar("SELECT status FROM reservations WHERE reservation_id = $1")
                .bind(event.reservation_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        let Some(status_text) = status_text else {
            return Err(AppError::EntityNotFound(format!(
                "reservation ({}) was not found",
                event.reservation_id
            )));
        };
        let current: ReservationStatus = parse_status(&status_text)?;
        if !current.can_transition_to(event.new_status) {
            return Err(AppError::UnprocessableEntity(format!(
                "a {current} reservation cannot move to {}",
                event.new_status
            )));
        }

        let res = sqlx::query(
            r#"
            UPDATE reservations
            SET status = $2, updated_at = CURRENT_TIMESTAMP(3)
            WHERE reservation_id = $1
            "#,
        )
        .bind(event.reservation_id)
        .bind(event.new_status.to_string())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no reservation record has been updated".into(),
            ));
        }

        // Cascade onto every child line, whatever their individual status.
        sqlx::query(
            r#"
            UPDATE reserved_lines
            SET status = $2, updated_at = CURRENT_TIMESTAMP(3)
            WHERE reservation_id = $1
            "#,
        )
        .bind(event.reservation_id)
        .bind(event.new_status.cascade().to_string())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)
    }

    async fn set_line_status(&self, event: ChangeLineStatus) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE reserved_lines
            SET status = $2, updated_at = CURRENT_TIMESTAMP(3)
            WHERE line_id = $1
            "#,
        )
        .bind(event.line_id)
        .bind(event.new_status.to_string())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "reservation line ({}) was not found",
                event.line_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, reservation_id: ReservationId) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        // Children first; the reservation owns its lines.
        sqlx::query("DELETE FROM reserved_lines WHERE reservation_id = $1")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        let res = sqlx::query("DELETE FROM reservations WHERE reservation_id = $1")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "reservation ({reservation_id}) was not found"
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE reservation_id = $1"
        ))
        .bind(reservation_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(row) = row else {
            return Err(AppError::EntityNotFound(format!(
                "reservation ({reservation_id}) was not found"
            )));
        };
        self.assemble(row).await
    }

    async fn find_line_by_id(&self, line_id: LineId) -> AppResult<ReservedLine> {
        let row: Option<LineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM reserved_lines WHERE line_id = $1"
        ))
        .bind(line_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(row) = row else {
            return Err(AppError::EntityNotFound(format!(
                "reservation line ({line_id}) was not found"
            )));
        };
        ReservedLine::try_from(row)
    }

    async fn find_by_owner(&self, owner_id: UserId) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        self.load_aggregates(rows).await
    }

    async fn find_by_provider(&self, provider_id: ProviderId) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT r.reservation_id, r.owner_id, r.code, r.status,
                   r.notes, r.created_at, r.updated_at
            FROM reservations AS r
            INNER JOIN reserved_lines AS l ON r.reservation_id = l.reservation_id
            WHERE l.provider_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(provider_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        self.load_aggregates(rows).await
    }

    async fn find_by_service(&self, service_id: ServiceId) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT r.reservation_id, r.owner_id, r.code, r.status,
                   r.notes, r.created_at, r.updated_at
            FROM reservations AS r
            INNER JOIN reserved_lines AS l ON r.reservation_id = l.reservation_id
            WHERE l.service_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(service_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        self.load_aggregates(rows).await
    }

    async fn find_in_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            r#"
            SELECT DISTINCT r.reservation_id, r.owner_id, r.code, r.status,
                   r.notes, r.created_at, r.updated_at
            FROM reservations AS r
            INNER JOIN reserved_lines AS l ON r.reservation_id = l.reservation_id
            WHERE l.start_date <= $2
              AND COALESCE(l.end_date, l.start_date) >= $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        self.load_aggregates(rows).await
    }
}

impl ReservationRepositoryImpl {
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    async fn fetch_cart_row(&self, user_id: UserId) -> AppResult<Option<ReservationRow>> {
        sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE owner_id = $1 AND status = 'in_cart'"
        ))
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }

    async fn try_create(
        &self,
        reservation_id: ReservationId,
        code: &str,
        event: &CreateReservation,
    ) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let res = sqlx::query(
            r#"
            INSERT INTO reservations (reservation_id, owner_id, code, status, notes)
            VALUES ($1, $2, $3, 'pending', $4)
            "#,
        )
        .bind(reservation_id)
        .bind(event.owner_id)
        .bind(code)
        .bind(event.notes.as_deref())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no reservation record has been created".into(),
            ));
        }

        for line in &event.lines {
            let service = fetch_service(&mut *tx, line.service_id)
                .await?
                .ok_or_else(|| {
                    AppError::EntityNotFound(format!(
                        "service ({}) was not found",
                        line.service_id
                    ))
                })?;
            if !event.pre_validated {
                if !service.is_active {
                    return Err(AppError::UnprocessableEntity(format!(
                        "service ({}) is not currently bookable",
                        line.service_id
                    )));
                }
                ensure_available(&mut *tx, line.service_id, line.slot, None).await?;
            }
            insert_line(
                &mut tx,
                reservation_id,
                line,
                service.provider_id,
                service.reference_price,
                LineStatus::Pending,
            )
            .await?;
        }

        tx.commit().await.map_err(commit_error)
    }

    async fn assemble(&self, row: ReservationRow) -> AppResult<Reservation> {
        let lines = self.load_lines(row.reservation_id).await?;
        row.into_reservation(lines)
    }

    async fn load_lines(&self, reservation_id: ReservationId) -> AppResult<Vec<ReservedLine>> {
        let rows: Vec<LineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM reserved_lines \
             WHERE reservation_id = $1 ORDER BY created_at ASC"
        ))
        .bind(reservation_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        rows.into_iter().map(ReservedLine::try_from).collect()
    }

    async fn load_aggregates(&self, rows: Vec<ReservationRow>) -> AppResult<Vec<Reservation>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.reservation_id.raw()).collect();
        let line_rows: Vec<LineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM reserved_lines \
             WHERE reservation_id = ANY($1) ORDER BY created_at ASC"
        ))
        .bind(&ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut grouped: HashMap<ReservationId, Vec<ReservedLine>> = HashMap::new();
        for row in line_rows {
            let key = row.reservation_id;
            grouped
                .entry(key)
                .or_default()
                .push(ReservedLine::try_from(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let lines = grouped.remove(&row.reservation_id).unwrap_or_default();
                row.into_reservation(lines)
            })
            .collect()
    }
}

async fn insert_line(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    reservation_id: ReservationId,
    line: &NewReservedLine,
    provider_id: ProviderId,
    unit_price: Decimal,
    status: LineStatus,
) -> AppResult<LineId> {
    let line_id = LineId::new();
    let res = sqlx::query(
        r#"
        INSERT INTO reserved_lines
        (line_id, reservation_id, service_id, provider_id,
         start_date, end_date, start_time, end_time,
         duration_minutes, quantity, unit_price, status, client_notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(line_id)
    .bind(reservation_id)
    .bind(line.service_id)
    .bind(provider_id)
    .bind(line.slot.start_date)
    .bind(line.slot.end_date)
    .bind(line.slot.start_time)
    .bind(line.slot.end_time)
    .bind(line.duration_minutes)
    .bind(line.quantity)
    .bind(unit_price)
    .bind(status.to_string())
    .bind(line.client_notes.as_deref())
    .execute(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;
    if res.rows_affected() < 1 {
        return Err(AppError::NoRowsAffectedError(
            "no reservation line record has been created".into(),
        ));
    }
    Ok(line_id)
}

async fn touch_reservation(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    reservation_id: ReservationId,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE reservations SET updated_at = CURRENT_TIMESTAMP(3) WHERE reservation_id = $1",
    )
    .bind(reservation_id)
    .execute(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;
    Ok(())
}

fn ensure_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::UnprocessableEntity(
            "line quantity must be at least 1".into(),
        ));
    }
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

fn is_code_collision(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.constraint())
        .map(|constraint| constraint == "reservations_code_key")
        .unwrap_or(false)
}

fn is_serialization_failure(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "40001")
        .unwrap_or(false)
}

/// Under SERIALIZABLE, the loser of two conflicting bookings surfaces at
/// commit time as SQLSTATE 40001.
fn commit_error(e: sqlx::Error) -> AppError {
    if is_serialization_failure(&e) {
        AppError::AvailabilityConflict("a concurrent booking took the requested slot".into())
    } else {
        AppError::TransactionError(e)
    }
}
