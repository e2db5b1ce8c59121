use crate::database::{
    model::{
        parse_status,
        plan::{EnrollmentRow, PlanEntryRow, PlanRow},
    },
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{EnrollmentId, PlanId},
    plan::{
        event::{ChangeEnrollmentStatus, EnrollInPlan},
        EnrollmentStatus, Plan, PlanEnrollment, PlanEntry,
    },
};
use kernel::repository::plan::PlanRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct PlanRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl PlanRepository for PlanRepositoryImpl {
    async fn find_plan_by_id(&self, plan_id: PlanId) -> AppResult<Option<Plan>> {
        let row: Option<PlanRow> = sqlx::query_as(
            "SELECT plan_id, plan_name, capacity, is_active FROM plans WHERE plan_id = $1",
        )
        .bind(plan_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let entries: Vec<PlanEntryRow> = sqlx::query_as(
            r#"
            SELECT entry_id, plan_id, service_id, start_date, end_date,
                   start_time, end_time, duration_minutes
            FROM plan_entries
            WHERE plan_id = $1
            ORDER BY start_date ASC, start_time ASC
            "#,
        )
        .bind(plan_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(Some(
            row.into_plan(entries.into_iter().map(PlanEntry::from).collect()),
        ))
    }

    async fn find_enrollment_by_id(
        &self,
        enrollment_id: EnrollmentId,
    ) -> AppResult<Option<PlanEnrollment>> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT enrollment_id, plan_id, user_id, status, created_at
            FROM plan_enrollments
            WHERE enrollment_id = $1
            "#,
        )
        .bind(enrollment_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        row.map(PlanEnrollment::try_from).transpose()
    }

    async fn enroll(&self, event: EnrollInPlan) -> AppResult<EnrollmentId> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let plan: Option<(i32, bool)> =
            sqlx::query_as("SELECT capacity, is_active FROM plans WHERE plan_id = $1")
                .bind(event.plan_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        let Some((capacity, is_active)) = plan else {
            return Err(AppError::EntityNotFound(format!(
                "plan ({}) was not found",
                event.plan_id
            )));
        };
        if !is_active {
            return Err(AppError::UnprocessableEntity(format!(
                "plan ({}) is not open for enrollment",
                event.plan_id
            )));
        }

        if !self
            .confirmed_below_capacity(&mut tx, event.plan_id, capacity)
            .await?
        {
            return Err(AppError::CapacityExceeded(format!(
                "plan ({}) has no seats left",
                event.plan_id
            )));
        }

        let enrollment_id = EnrollmentId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO plan_enrollments (enrollment_id, plan_id, user_id, status)
            VALUES ($1, $2, $3, 'pending')
            "#,
        )
        .bind(enrollment_id)
        .bind(event.plan_id)
        .bind(event.user_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no enrollment record has been created".into(),
            ));
        }

        tx.commit().await.map_err(plan_commit_error)?;
        Ok(enrollment_id)
    }

    async fn set_enrollment_status(&self, event: ChangeEnrollmentStatus) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        self.set_transaction_serializable(&mut tx).await?;

        let row: Option<(PlanId, String)> = sqlx::query_as(
            "SELECT plan_id, status FROM plan_enrollments WHERE enrollment_id = $1",
        )
        .bind(event.enrollment_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some((plan_id, status)) = row else {
            return Err(AppError::EntityNotFound(format!(
                "enrollment ({}) was not found",
                event.enrollment_id
            )));
        };
        let current: EnrollmentStatus = parse_status(&status)?;
        if !current.can_transition_to(event.new_status) {
            return Err(AppError::UnprocessableEntity(format!(
                "a {current} enrollment cannot move to {}",
                event.new_status
            )));
        }

        // Confirming a seat is what actually consumes plan capacity.
        if event.new_status == EnrollmentStatus::Confirmed {
            let capacity: i32 = sqlx::query_scalar("SELECT capacity FROM plans WHERE plan_id = $1")
                .bind(plan_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
            if !self
                .confirmed_below_capacity(&mut tx, plan_id, capacity)
                .await?
            {
                return Err(AppError::CapacityExceeded(format!(
                    "plan ({plan_id}) has no seats left"
                )));
            }
        }

        let res = sqlx::query(
            "UPDATE plan_enrollments SET status = $2 WHERE enrollment_id = $1",
        )
        .bind(event.enrollment_id)
        .bind(event.new_status.to_string())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no enrollment record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(plan_commit_error)
    }
}

impl PlanRepositoryImpl {
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

    async fn confirmed_below_capacity(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        plan_id: PlanId,
        capacity: i32,
    ) -> AppResult<bool> {
        let confirmed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM plan_enrollments WHERE plan_id = $1 AND status = 'confirmed'",
        )
        .bind(plan_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        Ok(confirmed < i64::from(capacity))
    }
}

fn plan_commit_error(e: sqlx::Error) -> AppError {
    let serialization_failure = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "40001")
        .unwrap_or(false);
    if serialization_failure {
        AppError::CapacityExceeded("a concurrent enrollment took the last seat".into())
    } else {
        AppError::TransactionError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reservation::ReservationRepositoryImpl;
    use crate::repository::support::{seed_service, slot};
    use kernel::model::{
        id::{ServiceId, UserId},
        reservation::{event::CreateReservation, LineStatus, ReservationStatus},
        slot::Slot,
    };
    use kernel::repository::reservation::ReservationRepository;
    use rust_decimal_macros::dec;

    async fn seed_plan(
        pool: &sqlx::PgPool,
        capacity: i32,
        entries: &[(ServiceId, Slot)],
    ) -> anyhow::Result<PlanId> {
        let plan_id = PlanId::new();
        sqlx::query(
            "INSERT INTO plans (plan_id, plan_name, capacity, is_active) VALUES ($1, $2, $3, TRUE)",
        )
        .bind(plan_id)
        .bind("Test Plan")
        .bind(capacity)
        .execute(pool)
        .await?;
        for (service_id, slot) in entries {
            sqlx::query(
                r#"
                INSERT INTO plan_entries
                (plan_id, service_id, start_date, end_date, start_time, end_time, duration_minutes)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(plan_id)
            .bind(service_id)
            .bind(slot.start_date)
            .bind(slot.end_date)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(60)
            .execute(pool)
            .await?;
        }
        Ok(plan_id)
    }

    #[sqlx::test]
    async fn enrollment_counts_confirmed_seats_only(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let service_id = seed_service(&pool, 5, dec!(20.00)).await?;
        let plan_id = seed_plan(
            &pool,
            1,
            &[(service_id, slot("2025-07-01", "10:00", "11:00"))],
        )
        .await?;
        let repo = PlanRepositoryImpl::new(ConnectionPool::new(pool));

        // Capacity 1, zero confirmed: both enrollments are accepted.
        let first = repo.enroll(EnrollInPlan::new(plan_id, UserId::new())).await?;
        let second = repo.enroll(EnrollInPlan::new(plan_id, UserId::new())).await?;

        repo.set_enrollment_status(ChangeEnrollmentStatus::new(
            first,
            EnrollmentStatus::Confirmed,
        ))
        .await?;

        // The seat is taken now, both for confirming and for re-enrolling.
        let err = repo
            .set_enrollment_status(ChangeEnrollmentStatus::new(
                second,
                EnrollmentStatus::Confirmed,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));

        let err = repo
            .enroll(EnrollInPlan::new(plan_id, UserId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
        Ok(())
    }

    #[sqlx::test]
    async fn cancelled_enrollments_cannot_be_revived(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let service_id = seed_service(&pool, 5, dec!(20.00)).await?;
        let plan_id = seed_plan(
            &pool,
            3,
            &[(service_id, slot("2025-07-01", "10:00", "11:00"))],
        )
        .await?;
        let repo = PlanRepositoryImpl::new(ConnectionPool::new(pool));

        let enrollment_id = repo.enroll(EnrollInPlan::new(plan_id, UserId::new())).await?;
        repo.set_enrollment_status(ChangeEnrollmentStatus::new(
            enrollment_id,
            EnrollmentStatus::Cancelled,
        ))
        .await?;

        let err = repo
            .set_enrollment_status(ChangeEnrollmentStatus::new(
                enrollment_id,
                EnrollmentStatus::Confirmed,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
        Ok(())
    }

    #[sqlx::test]
    async fn confirmed_enrollment_materializes_into_one_reservation(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let service_a = seed_service(&pool, 5, dec!(30.00)).await?;
        let service_b = seed_service(&pool, 5, dec!(45.50)).await?;
        let plan_id = seed_plan(
            &pool,
            3,
            &[
                (service_a, slot("2025-07-01", "10:00", "11:00")),
                (service_b, slot("2025-07-02", "10:00", "11:00")),
                (service_a, slot("2025-07-03", "10:00", "11:00")),
            ],
        )
        .await?;
        let plan_repo = PlanRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let reservation_repo = ReservationRepositoryImpl::new(ConnectionPool::new(pool));
        let user = UserId::new();

        let enrollment_id = plan_repo.enroll(EnrollInPlan::new(plan_id, user)).await?;
        plan_repo
            .set_enrollment_status(ChangeEnrollmentStatus::new(
                enrollment_id,
                EnrollmentStatus::Confirmed,
            ))
            .await?;

        // The materializer path: expand the template, then create with the
        // enrollment check standing in for per-line validation.
        let enrollment = plan_repo
            .find_enrollment_by_id(enrollment_id)
            .await?
            .expect("enrollment exists");
        assert_eq!(enrollment.status, EnrollmentStatus::Confirmed);
        let plan = plan_repo
            .find_plan_by_id(enrollment.plan_id)
            .await?
            .expect("plan exists");

        let reservation_id = reservation_repo
            .create(CreateReservation::new(
                enrollment.user_id,
                None,
                None,
                true,
                plan.materialize_lines(),
            ))
            .await?;

        let reservation = reservation_repo.find_by_id(reservation_id).await?;
        assert_eq!(reservation.owner_id, user);
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.lines.len(), 3);
        assert!(reservation
            .lines
            .iter()
            .all(|line| line.status == LineStatus::Pending && line.quantity == 1));

        let mut prices: Vec<_> = reservation
            .lines
            .iter()
            .map(|line| line.unit_price)
            .collect();
        prices.sort();
        assert_eq!(prices, vec![dec!(30.00), dec!(30.00), dec!(45.50)]);
        Ok(())
    }
}
