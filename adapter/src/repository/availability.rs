use crate::database::{model::service::ScheduleWindowRow, ConnectionPool};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use derive_new::new;
use kernel::model::{
    id::{LineId, ServiceId},
    schedule::{weekday_index, ScheduleWindow},
    slot::Slot,
};
use kernel::repository::availability::AvailabilityRepository;
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

#[derive(new)]
pub struct AvailabilityRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl AvailabilityRepository for AvailabilityRepositoryImpl {
    async fn has_overlap(
        &self,
        service_id: ServiceId,
        slot: Slot,
        exclude_line: Option<LineId>,
    ) -> AppResult<bool> {
        let mut conn = self.acquire().await?;
        overlap_exists(&mut *conn, service_id, slot, exclude_line).await
    }

    async fn within_schedule(
        &self,
        service_id: ServiceId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<bool> {
        let mut conn = self.acquire().await?;
        within_schedule(&mut *conn, service_id, date, start_time, end_time).await
    }

    async fn has_capacity(
        &self,
        service_id: ServiceId,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> AppResult<bool> {
        let mut conn = self.acquire().await?;
        capacity_remaining(&mut *conn, service_id, date, start_time).await
    }

    async fn is_available(
        &self,
        service_id: ServiceId,
        slot: Slot,
        exclude_line: Option<LineId>,
    ) -> AppResult<bool> {
        let mut conn = self.acquire().await?;
        Ok(within_schedule(
            &mut *conn,
            service_id,
            slot.start_date,
            slot.start_time,
            slot.end_time,
        )
        .await?
            && !overlap_exists(&mut *conn, service_id, slot, exclude_line).await?
            && capacity_remaining(&mut *conn, service_id, slot.start_date, slot.start_time).await?)
    }
}

impl AvailabilityRepositoryImpl {
    async fn acquire(&self) -> AppResult<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.db
            .inner_ref()
            .acquire()
            .await
            .map_err(AppError::TransactionError)
    }
}

/// True when a committed (pending/confirmed) line of the service intersects
/// the slot. Date intervals are inclusive, time intervals half-open.
pub(crate) async fn overlap_exists(
    conn: &mut PgConnection,
    service_id: ServiceId,
    slot: Slot,
    exclude_line: Option<LineId>,
) -> AppResult<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM reserved_lines
        WHERE service_id = $1
          AND status IN ('pending', 'confirmed')
          AND start_date <= $3
          AND $2 <= COALESCE(end_date, start_date)
          AND start_time < $5
          AND $4 < end_time
          AND ($6::UUID IS NULL OR line_id <> $6)
        "#,
    )
    .bind(service_id)
    .bind(slot.start_date)
    .bind(slot.last_date())
    .bind(slot.start_time)
    .bind(slot.end_time)
    .bind(exclude_line.map(LineId::raw))
    .fetch_one(conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    Ok(count > 0)
}

pub(crate) async fn active_windows(
    conn: &mut PgConnection,
    service_id: ServiceId,
    weekday: Weekday,
) -> AppResult<Vec<ScheduleWindow>> {
    let rows: Vec<ScheduleWindowRow> = sqlx::query_as(
        r#"
        SELECT window_id, service_id, weekday, start_time, end_time, is_active
        FROM schedule_windows
        WHERE service_id = $1 AND weekday = $2 AND is_active
        ORDER BY start_time ASC
        "#,
    )
    .bind(service_id)
    .bind(weekday_index(weekday))
    .fetch_all(conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    rows.into_iter().map(ScheduleWindow::try_from).collect()
}

pub(crate) async fn within_schedule(
    conn: &mut PgConnection,
    service_id: ServiceId,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> AppResult<bool> {
    let windows = active_windows(conn, service_id, date.weekday()).await?;
    Ok(windows
        .iter()
        .any(|window| window.contains(start_time, end_time)))
}

pub(crate) async fn capacity_remaining(
    conn: &mut PgConnection,
    service_id: ServiceId,
    date: NaiveDate,
    start_time: NaiveTime,
) -> AppResult<bool> {
    let capacity: Option<i32> =
        sqlx::query_scalar("SELECT capacity FROM services WHERE service_id = $1")
            .bind(service_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(AppError::SpecificOperationError)?;
    let Some(capacity) = capacity else {
        return Err(AppError::EntityNotFound(format!(
            "service ({service_id}) was not found"
        )));
    };

    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM reserved_lines
        WHERE service_id = $1
          AND start_date = $2
          AND start_time = $3
          AND status IN ('pending', 'confirmed')
        "#,
    )
    .bind(service_id)
    .bind(date)
    .bind(start_time)
    .fetch_one(conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    Ok(count < i64::from(capacity))
}

/// Gate run before any insert/update that commits a slot. The caller's
/// transaction makes the check-then-write pair atomic.
pub(crate) async fn ensure_available(
    conn: &mut PgConnection,
    service_id: ServiceId,
    slot: Slot,
    exclude_line: Option<LineId>,
) -> AppResult<()> {
    if !within_schedule(
        &mut *conn,
        service_id,
        slot.start_date,
        slot.start_time,
        slot.end_time,
    )
    .await?
    {
        return Err(AppError::AvailabilityConflict(format!(
            "service ({service_id}) has no schedule window covering the requested time"
        )));
    }
    if overlap_exists(&mut *conn, service_id, slot, exclude_line).await? {
        return Err(AppError::AvailabilityConflict(format!(
            "service ({service_id}) already has a booking in the requested range"
        )));
    }
    if !capacity_remaining(&mut *conn, service_id, slot.start_date, slot.start_time).await? {
        return Err(AppError::CapacityExceeded(format!(
            "service ({service_id}) is fully booked for the requested slot"
        )));
    }
    Ok(())
}
