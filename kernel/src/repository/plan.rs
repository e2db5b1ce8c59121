use crate::model::{
    id::{EnrollmentId, PlanId},
    plan::{
        event::{ChangeEnrollmentStatus, EnrollInPlan},
        Plan, PlanEnrollment,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Loads the plan together with its template entries.
    async fn find_plan_by_id(&self, plan_id: PlanId) -> AppResult<Option<Plan>>;
    async fn find_enrollment_by_id(
        &self,
        enrollment_id: EnrollmentId,
    ) -> AppResult<Option<PlanEnrollment>>;
    /// Creates a pending enrollment; fails while confirmed enrollments fill
    /// the plan capacity.
    async fn enroll(&self, event: EnrollInPlan) -> AppResult<EnrollmentId>;
    async fn set_enrollment_status(&self, event: ChangeEnrollmentStatus) -> AppResult<()>;
}
