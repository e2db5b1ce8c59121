use chrono::{NaiveDate, NaiveTime};
use shared::error::{AppError, AppResult};

/// A requested booking slot: an inclusive date interval plus a wall-clock
/// time range. An absent end date means a single-day slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Slot {
    pub fn new(
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            start_date,
            end_date,
            start_time,
            end_time,
        }
    }

    pub fn last_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.start_time >= self.end_time {
            return Err(AppError::UnprocessableEntity(
                "slot start time must come before its end time".into(),
            ));
        }
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(AppError::UnprocessableEntity(
                    "slot end date must not come before its start date".into(),
                ));
            }
        }
        Ok(())
    }

    /// Date intervals are inclusive; time intervals are half-open, so slots
    /// that merely share an endpoint (10:00-11:00 vs 11:00-12:00) do not
    /// overlap.
    pub fn overlaps(&self, other: &Slot) -> bool {
        let dates_intersect =
            self.start_date <= other.last_date() && other.start_date <= self.last_date();
        let times_intersect =
            self.start_time < other.end_time && other.start_time < self.end_time;
        dates_intersect && times_intersect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn slot(start_date: &str, end_date: Option<&str>, start: &str, end: &str) -> Slot {
        Slot::new(
            date(start_date),
            end_date.map(date),
            time(start),
            time(end),
        )
    }

    #[test]
    fn same_day_same_hours_overlap() {
        let a = slot("2025-06-01", None, "10:00", "11:00");
        let b = slot("2025-06-01", None, "10:00", "11:00");
        assert!(a.overlaps(&b));
    }

    #[test]
    fn shared_endpoint_is_not_an_overlap() {
        let a = slot("2025-06-01", None, "10:00", "11:00");
        let b = slot("2025-06-01", None, "11:00", "12:00");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn partial_time_intersection_overlaps() {
        let a = slot("2025-06-01", None, "10:00", "11:00");
        let b = slot("2025-06-01", None, "10:30", "11:30");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn different_days_never_overlap() {
        let a = slot("2025-06-01", None, "10:00", "11:00");
        let b = slot("2025-06-02", None, "10:00", "11:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn multi_day_slot_covers_inner_day() {
        let a = slot("2025-06-01", Some("2025-06-05"), "09:00", "17:00");
        let b = slot("2025-06-03", None, "10:00", "11:00");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_date_ranges_with_intersecting_times_overlap() {
        // Inclusive dates: a multi-day slot ending on the day another starts
        // still shares that calendar day.
        let a = slot("2025-06-01", Some("2025-06-03"), "10:00", "11:00");
        let b = slot("2025-06-03", None, "10:30", "11:30");
        assert!(a.overlaps(&b));
    }

    #[test]
    fn validate_rejects_inverted_times() {
        let s = slot("2025-06-01", None, "11:00", "10:00");
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_end_date_before_start_date() {
        let s = slot("2025-06-02", Some("2025-06-01"), "10:00", "11:00");
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_accepts_single_day_slot() {
        let s = slot("2025-06-01", None, "10:00", "11:00");
        assert!(s.validate().is_ok());
    }
}
