use super::parse_status;
use kernel::model::{
    id::{EnrollmentId, PlanEntryId, PlanId, ServiceId, UserId},
    plan::{Plan, PlanEnrollment, PlanEntry},
    slot::Slot,
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[derive(sqlx::FromRow)]
pub struct PlanRow {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub capacity: i32,
    pub is_active: bool,
}

impl PlanRow {
    pub fn into_plan(self, entries: Vec<PlanEntry>) -> Plan {
        let PlanRow {
            plan_id,
            plan_name,
            capacity,
            is_active,
        } = self;
        Plan {
            plan_id,
            plan_name,
            capacity,
            is_active,
            entries,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct PlanEntryRow {
    pub entry_id: PlanEntryId,
    pub plan_id: PlanId,
    pub service_id: ServiceId,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i32,
}

impl From<PlanEntryRow> for PlanEntry {
    fn from(value: PlanEntryRow) -> Self {
        let PlanEntryRow {
            entry_id,
            plan_id,
            service_id,
            start_date,
            end_date,
            start_time,
            end_time,
            duration_minutes,
        } = value;
        PlanEntry {
            entry_id,
            plan_id,
            service_id,
            slot: Slot::new(start_date, end_date, start_time, end_time),
            duration_minutes,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct EnrollmentRow {
    pub enrollment_id: EnrollmentId,
    pub plan_id: PlanId,
    pub user_id: UserId,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for PlanEnrollment {
    type Error = AppError;

    fn try_from(value: EnrollmentRow) -> AppResult<Self> {
        let EnrollmentRow {
            enrollment_id,
            plan_id,
            user_id,
            status,
            created_at,
        } = value;
        Ok(PlanEnrollment {
            enrollment_id,
            plan_id,
            user_id,
            status: parse_status(&status)?,
            created_at,
        })
    }
}
