use crate::model::id::{ServiceId, WindowId};
use chrono::{NaiveTime, Weekday};

/// One weekly availability window of a service. Several windows per weekday
/// are allowed; keeping them non-overlapping is the catalog's concern.
#[derive(Debug, Clone)]
pub struct ScheduleWindow {
    pub window_id: WindowId,
    pub service_id: ServiceId,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl ScheduleWindow {
    pub fn contains(&self, start_time: NaiveTime, end_time: NaiveTime) -> bool {
        self.start_time <= start_time && end_time <= self.end_time
    }
}

/// Weekdays are persisted as 0..=6 with Monday = 0.
pub fn weekday_index(weekday: Weekday) -> i16 {
    weekday.num_days_from_monday() as i16
}

pub fn weekday_from_index(index: i16) -> Option<Weekday> {
    u8::try_from(index).ok().and_then(|i| Weekday::try_from(i).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::{ServiceId, WindowId};

    fn window(start: &str, end: &str) -> ScheduleWindow {
        ScheduleWindow {
            window_id: WindowId::new(),
            service_id: ServiceId::new(),
            weekday: Weekday::Mon,
            start_time: time(start),
            end_time: time(end),
            is_active: true,
        }
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn window_contains_inner_range() {
        let w = window("09:00", "17:00");
        assert!(w.contains(time("10:00"), time("11:00")));
        assert!(w.contains(time("09:00"), time("17:00")));
    }

    #[test]
    fn window_rejects_range_spilling_out() {
        let w = window("09:00", "17:00");
        assert!(!w.contains(time("08:00"), time("10:00")));
        assert!(!w.contains(time("16:00"), time("18:00")));
    }

    #[test]
    fn weekday_round_trip_is_monday_based() {
        assert_eq!(weekday_index(Weekday::Mon), 0);
        assert_eq!(weekday_index(Weekday::Sun), 6);
        assert_eq!(weekday_from_index(0), Some(Weekday::Mon));
        assert_eq!(weekday_from_index(6), Some(Weekday::Sun));
        assert_eq!(weekday_from_index(7), None);
    }
}
