use crate::database::{model::service::ServiceRow, ConnectionPool};
use crate::repository::availability::active_windows;
use async_trait::async_trait;
use chrono::Weekday;
use derive_new::new;
use kernel::model::{id::ServiceId, schedule::ScheduleWindow, service::ServiceSummary};
use kernel::repository::service::ServiceRepository;
use shared::error::{AppError, AppResult};
use sqlx::PgConnection;

#[derive(new)]
pub struct ServiceRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ServiceRepository for ServiceRepositoryImpl {
    async fn find_by_id(&self, service_id: ServiceId) -> AppResult<Option<ServiceSummary>> {
        let mut conn = self
            .db
            .inner_ref()
            .acquire()
            .await
            .map_err(AppError::TransactionError)?;
        fetch_service(&mut *conn, service_id).await
    }

    async fn windows_for(
        &self,
        service_id: ServiceId,
        weekday: Weekday,
    ) -> AppResult<Vec<ScheduleWindow>> {
        let mut conn = self
            .db
            .inner_ref()
            .acquire()
            .await
            .map_err(AppError::TransactionError)?;
        active_windows(&mut *conn, service_id, weekday).await
    }
}

/// Shared with the reservation repository so that pricing and provider
/// resolution read the same snapshot inside its transactions.
pub(crate) async fn fetch_service(
    conn: &mut PgConnection,
    service_id: ServiceId,
) -> AppResult<Option<ServiceSummary>> {
    let row: Option<ServiceRow> = sqlx::query_as(
        r#"
        SELECT service_id, service_name, provider_id, capacity, reference_price, is_active
        FROM services
        WHERE service_id = $1
        "#,
    )
    .bind(service_id)
    .fetch_optional(conn)
    .await
    .map_err(AppError::SpecificOperationError)?;

    Ok(row.map(ServiceSummary::from))
}
