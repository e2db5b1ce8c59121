use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{EnrollmentId, PlanId, UserId},
    plan::{EnrollmentStatus, PlanEnrollment},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatusName {
    Pending,
    Confirmed,
    Cancelled,
}

impl From<EnrollmentStatus> for EnrollmentStatusName {
    fn from(value: EnrollmentStatus) -> Self {
        match value {
            EnrollmentStatus::Pending => Self::Pending,
            EnrollmentStatus::Confirmed => Self::Confirmed,
            EnrollmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<EnrollmentStatusName> for EnrollmentStatus {
    fn from(value: EnrollmentStatusName) -> Self {
        match value {
            EnrollmentStatusName::Pending => Self::Pending,
            EnrollmentStatusName::Confirmed => Self::Confirmed,
            EnrollmentStatusName::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    #[garde(skip)]
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnrollmentStatusRequest {
    pub status: EnrollmentStatusName,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub enrollment_id: EnrollmentId,
    pub plan_id: PlanId,
    pub user_id: UserId,
    pub status: EnrollmentStatusName,
    pub created_at: DateTime<Utc>,
}

impl From<PlanEnrollment> for EnrollmentResponse {
    fn from(value: PlanEnrollment) -> Self {
        let PlanEnrollment {
            enrollment_id,
            plan_id,
            user_id,
            status,
            created_at,
        } = value;
        Self {
            enrollment_id,
            plan_id,
            user_id,
            status: status.into(),
            created_at,
        }
    }
}
