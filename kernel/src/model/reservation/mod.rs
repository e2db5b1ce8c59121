use crate::model::{
    id::{LineId, ProviderId, ReservationId, ServiceId, UserId},
    slot::Slot,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use strum::{Display, EnumString};
use uuid::Uuid;

pub mod event;

/// Aggregate-level lifecycle. `InCart` is the pre-checkout draft state; the
/// cart itself is just a reservation stuck in that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ReservationStatus {
    InCart,
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Cancellation is reachable from every status; everything else follows
    /// the forward path InCart -> Pending -> Confirmed -> Completed.
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (_, Cancelled) | (InCart, Pending) | (Pending, Confirmed) | (Confirmed, Completed)
        )
    }

    /// Line status that a reservation-level transition pushes down onto
    /// every child line.
    pub fn cascade(self) -> LineStatus {
        match self {
            ReservationStatus::Confirmed => LineStatus::Confirmed,
            ReservationStatus::Cancelled => LineStatus::Cancelled,
            ReservationStatus::Completed => LineStatus::Completed,
            _ => LineStatus::Pending,
        }
    }
}

/// Per-line lifecycle. Same vocabulary as the parent but tracked
/// independently, so a provider can act on just their line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum LineStatus {
    InCart,
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl LineStatus {
    /// Committed lines are the only ones that block a slot.
    pub fn is_committed(self) -> bool {
        matches!(self, LineStatus::Pending | LineStatus::Confirmed)
    }
}

#[derive(Debug)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub owner_id: UserId,
    pub code: String,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<ReservedLine>,
}

impl Reservation {
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum()
    }

    pub fn first_start_date(&self) -> Option<NaiveDate> {
        self.lines.iter().map(|line| line.slot.start_date).min()
    }

    pub fn last_end_date(&self) -> Option<NaiveDate> {
        self.lines.iter().map(|line| line.slot.last_date()).max()
    }

    /// Human-readable reservation code. Uniqueness is enforced by the
    /// store; callers retry with a fresh code on collision.
    pub fn generate_code() -> String {
        let raw = Uuid::new_v4().simple().to_string();
        format!("RES-{}", raw[..8].to_uppercase())
    }
}

#[derive(Debug, Clone)]
pub struct ReservedLine {
    pub line_id: LineId,
    pub reservation_id: ReservationId,
    pub service_id: ServiceId,
    pub provider_id: ProviderId,
    pub slot: Slot,
    pub duration_minutes: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub status: LineStatus,
    pub client_notes: Option<String>,
    pub provider_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cancellation_is_allowed_from_every_status() {
        use ReservationStatus::*;
        for status in [InCart, Pending, Confirmed, Cancelled, Completed] {
            assert!(status.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn forward_path_transitions() {
        use ReservationStatus::*;
        assert!(InCart.can_transition_to(Pending));
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        use ReservationStatus::*;
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!InCart.can_transition_to(Confirmed));
    }

    #[test]
    fn cascade_maps_terminal_statuses_one_to_one() {
        assert_eq!(ReservationStatus::Confirmed.cascade(), LineStatus::Confirmed);
        assert_eq!(ReservationStatus::Cancelled.cascade(), LineStatus::Cancelled);
        assert_eq!(ReservationStatus::Completed.cascade(), LineStatus::Completed);
        assert_eq!(ReservationStatus::Pending.cascade(), LineStatus::Pending);
        assert_eq!(ReservationStatus::InCart.cascade(), LineStatus::Pending);
    }

    #[test]
    fn only_pending_and_confirmed_lines_are_committed() {
        assert!(LineStatus::Pending.is_committed());
        assert!(LineStatus::Confirmed.is_committed());
        assert!(!LineStatus::InCart.is_committed());
        assert!(!LineStatus::Cancelled.is_committed());
        assert!(!LineStatus::Completed.is_committed());
    }

    #[test]
    fn status_text_round_trip() {
        assert_eq!(ReservationStatus::InCart.to_string(), "in_cart");
        assert_eq!(
            "in_cart".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::InCart
        );
        assert_eq!(LineStatus::Confirmed.to_string(), "confirmed");
        assert!("confirmada".parse::<LineStatus>().is_err());
    }

    fn line(quantity: i32, unit_price: Decimal, start: &str, end: Option<&str>) -> ReservedLine {
        ReservedLine {
            line_id: LineId::new(),
            reservation_id: ReservationId::new(),
            service_id: ServiceId::new(),
            provider_id: ProviderId::new(),
            slot: Slot::new(
                start.parse().unwrap(),
                end.map(|d| d.parse().unwrap()),
                chrono::NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
                chrono::NaiveTime::parse_from_str("11:00", "%H:%M").unwrap(),
            ),
            duration_minutes: 60,
            quantity,
            unit_price,
            status: LineStatus::Pending,
            client_notes: None,
            provider_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn derived_totals_and_date_span() {
        let reservation = Reservation {
            reservation_id: ReservationId::new(),
            owner_id: UserId::new(),
            code: Reservation::generate_code(),
            status: ReservationStatus::Pending,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            lines: vec![
                line(2, dec!(10.50), "2025-06-03", None),
                line(1, dec!(5.00), "2025-06-01", Some("2025-06-07")),
            ],
        };
        assert_eq!(reservation.total_price(), dec!(26.00));
        assert_eq!(
            reservation.first_start_date(),
            Some("2025-06-01".parse().unwrap())
        );
        assert_eq!(
            reservation.last_end_date(),
            Some("2025-06-07".parse().unwrap())
        );
    }

    #[test]
    fn generated_codes_are_prefixed_and_short() {
        let code = Reservation::generate_code();
        assert!(code.starts_with("RES-"));
        assert_eq!(code.len(), 12);
    }
}
