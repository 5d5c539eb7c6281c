use chrono::{DateTime, Days, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Number of calendar days covered by the rolling completion window.
pub const DAYS_IN_WEEK: i64 = 7;

/// Local calendar day of a stored timestamp. Completions are compared by this key, so a habit can
/// only be marked once per local day.
pub fn local_day_key(moment: DateTime<Utc>) -> NaiveDate {
    moment.with_timezone(&Local).date_naive()
}

/// Start of the rolling 7-day window ending at `now`: midnight (local) of the day six calendar
/// days back. Stepping by calendar days keeps the start at midnight even when a DST transition
/// falls inside the window. A completion exactly at this boundary still counts.
pub fn week_window_start(now: DateTime<Local>) -> DateTime<Local> {
    let start_day = now.date_naive() - Days::new(DAYS_IN_WEEK as u64 - 1);
    local_midnight(start_day)
}

/// Midnight can be ambiguous or skipped entirely on a DST transition day; resolve to the earliest
/// instant the day actually has.
fn local_midnight(day: NaiveDate) -> DateTime<Local> {
    let midnight = day.and_time(NaiveTime::MIN);
    match midnight.and_local_timezone(Local) {
        LocalResult::Single(v) => v,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => (midnight + Duration::hours(1))
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&midnight)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_starts_at_local_midnight_six_days_back() {
        let now = Local.with_ymd_and_hms(2024, 5, 10, 15, 30, 0).unwrap();
        let start = week_window_start(now);
        assert_eq!(start, Local.with_ymd_and_hms(2024, 5, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn window_start_is_calendar_based_not_a_fixed_144_hours() {
        // Mid-March and late-October windows span DST transitions in most zones; the start must
        // still be the midnight of the day six calendar days back, never 23:00 or 01:00.
        for (y, m, d) in [(2024, 3, 14), (2024, 10, 30), (2024, 5, 10)] {
            let now = Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
            let start = week_window_start(now);
            assert_eq!(start.date_naive(), now.date_naive() - Days::new(6));
            assert_eq!(start.time(), NaiveTime::MIN);
        }
    }

    #[test]
    fn day_key_uses_local_date() {
        let moment = Local.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
        assert_eq!(
            local_day_key(moment.with_timezone(&Utc)),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
    }
}
