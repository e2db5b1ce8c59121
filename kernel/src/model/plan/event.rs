use crate::model::{
    id::{EnrollmentId, PlanId, UserId},
    plan::EnrollmentStatus,
};
use derive_new::new;

#[derive(Debug, new)]
pub struct EnrollInPlan {
    pub plan_id: PlanId,
    pub user_id: UserId,
}

#[derive(Debug, new)]
pub struct ChangeEnrollmentStatus {
    pub enrollment_id: EnrollmentId,
    pub new_status: EnrollmentStatus,
}
