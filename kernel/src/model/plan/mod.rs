use crate::model::{
    id::{EnrollmentId, PlanEntryId, PlanId, ServiceId, UserId},
    reservation::event::NewReservedLine,
    slot::Slot,
};
use chrono::{DateTime, Utc};
use strum::{Display, EnumString};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn can_transition_to(self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

/// A reusable booking template users subscribe to. Confirmed enrollments
/// count against `capacity`.
#[derive(Debug)]
pub struct Plan {
    pub plan_id: PlanId,
    pub plan_name: String,
    pub capacity: i32,
    pub is_active: bool,
    pub entries: Vec<PlanEntry>,
}

#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub entry_id: PlanEntryId,
    pub plan_id: PlanId,
    pub service_id: ServiceId,
    pub slot: Slot,
    pub duration_minutes: i32,
}

#[derive(Debug)]
pub struct PlanEnrollment {
    pub enrollment_id: EnrollmentId,
    pub plan_id: PlanId,
    pub user_id: UserId,
    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Expands the template into concrete line inputs: one line per entry,
    /// quantity fixed at 1. Prices are resolved from each service's
    /// reference price when the reservation is created.
    pub fn materialize_lines(&self) -> Vec<NewReservedLine> {
        self.entries
            .iter()
            .map(|entry| {
                NewReservedLine::new(entry.service_id, entry.slot, entry.duration_minutes, 1, None)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(plan_id: PlanId, start_date: &str) -> PlanEntry {
        PlanEntry {
            entry_id: PlanEntryId::new(),
            plan_id,
            service_id: ServiceId::new(),
            slot: Slot::new(
                start_date.parse().unwrap(),
                None,
                chrono::NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
                chrono::NaiveTime::parse_from_str("12:00", "%H:%M").unwrap(),
            ),
            duration_minutes: 120,
        }
    }

    #[test]
    fn materialize_produces_one_line_per_entry_with_quantity_one() {
        let plan_id = PlanId::new();
        let plan = Plan {
            plan_id,
            plan_name: "city week".into(),
            capacity: 10,
            is_active: true,
            entries: vec![
                entry(plan_id, "2025-07-01"),
                entry(plan_id, "2025-07-02"),
                entry(plan_id, "2025-07-03"),
            ],
        };

        let lines = plan.materialize_lines();
        assert_eq!(lines.len(), 3);
        for (line, entry) in lines.iter().zip(&plan.entries) {
            assert_eq!(line.service_id, entry.service_id);
            assert_eq!(line.slot, entry.slot);
            assert_eq!(line.duration_minutes, entry.duration_minutes);
            assert_eq!(line.quantity, 1);
            assert!(line.client_notes.is_none());
        }
    }

    #[test]
    fn cancelled_enrollments_stay_cancelled() {
        use EnrollmentStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn enrollment_status_text_round_trip() {
        assert_eq!(EnrollmentStatus::Confirmed.to_string(), "confirmed");
        assert_eq!(
            "cancelled".parse::<EnrollmentStatus>().unwrap(),
            EnrollmentStatus::Cancelled
        );
    }
}
