//! Pure calendar arithmetic for the scheduling core: matching requested
//! windows against declared availability and deriving the concrete date a
//! recurring weekday slot lands on. Everything takes an explicit `now` so
//! tests can pin the clock.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

use mentormatch_common::{AppError, AvailabilitySlot, DayOfWeek};

/// Parses a zero-padded 24-hour "HH:MM" time of day. The zero padding is
/// load-bearing: slot containment compares these strings lexicographically.
pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[..2].iter().all(|b| b.is_ascii_digit())
        && bytes[3..].iter().all(|b| b.is_ascii_digit());

    if !shape_ok {
        return Err(AppError::Validation(format!(
            "Invalid time of day '{}', expected HH:MM",
            value
        )));
    }

    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time of day '{}'", value)))
}

pub fn validate_slot(slot: &AvailabilitySlot) -> Result<(), AppError> {
    parse_time(&slot.start_time)?;
    parse_time(&slot.end_time)?;

    if slot.start_time >= slot.end_time {
        return Err(AppError::Validation(format!(
            "Slot on {} must start before it ends ({} - {})",
            slot.day_of_week, slot.start_time, slot.end_time
        )));
    }

    Ok(())
}

/// A requested window matches a declared entry iff the weekday is equal and
/// the window is fully contained in the entry. Overlap without containment
/// is not a match.
pub fn find_matching_slot<'a>(
    declared: &'a [AvailabilitySlot],
    requested: &AvailabilitySlot,
) -> Option<&'a AvailabilitySlot> {
    declared.iter().find(|entry| {
        entry.day_of_week == requested.day_of_week
            && entry.start_time <= requested.start_time
            && entry.end_time >= requested.end_time
    })
}

/// Next calendar occurrence of `day` strictly after today. When today is
/// already that weekday the slot rolls a full week out, even if the start
/// time has not passed yet.
pub fn next_date_for_day(now: DateTime<Utc>, day: DayOfWeek) -> NaiveDate {
    let today = now.date_naive();
    let today_dow = today.weekday().num_days_from_sunday();

    let mut days_until = (day.num_days_from_sunday() + 7 - today_dow) % 7;
    if days_until == 0 {
        days_until = 7;
    }

    today + Days::new(u64::from(days_until))
}

/// Absolute start timestamp of the next occurrence of a slot, at minute
/// precision in UTC.
pub fn slot_start_datetime(
    now: DateTime<Utc>,
    day: DayOfWeek,
    start_time: &str,
) -> Result<DateTime<Utc>, AppError> {
    let time = parse_time(start_time)?;
    Ok(next_date_for_day(now, day).and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(day: DayOfWeek, start: &str, end: &str) -> AvailabilitySlot {
        AvailabilitySlot {
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    // Wednesday.
    fn wednesday_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn accepts_well_formed_times_only() {
        assert!(parse_time("09:00").is_ok());
        assert!(parse_time("23:59").is_ok());
        assert!(parse_time("9:00").is_err());
        assert!(parse_time("09:60").is_err());
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("0900").is_err());
        assert!(parse_time("09:00:00").is_err());
    }

    #[test]
    fn slot_must_start_before_it_ends() {
        assert!(validate_slot(&slot(DayOfWeek::Monday, "09:00", "10:00")).is_ok());
        assert!(validate_slot(&slot(DayOfWeek::Monday, "10:00", "09:00")).is_err());
        assert!(validate_slot(&slot(DayOfWeek::Monday, "09:00", "09:00")).is_err());
    }

    #[test]
    fn contained_window_matches() {
        let declared = vec![slot(DayOfWeek::Monday, "09:00", "12:00")];

        let matched = find_matching_slot(&declared, &slot(DayOfWeek::Monday, "09:30", "10:30"));
        assert!(matched.is_some());

        // Exact bounds count as contained.
        let matched = find_matching_slot(&declared, &slot(DayOfWeek::Monday, "09:00", "12:00"));
        assert!(matched.is_some());
    }

    #[test]
    fn overlapping_but_not_contained_window_does_not_match() {
        let declared = vec![slot(DayOfWeek::Monday, "09:00", "12:00")];

        // Starts before the declared window opens.
        assert!(find_matching_slot(&declared, &slot(DayOfWeek::Monday, "08:00", "10:00")).is_none());
        // Runs past the declared window.
        assert!(find_matching_slot(&declared, &slot(DayOfWeek::Monday, "11:00", "13:00")).is_none());
        // Wrong weekday entirely.
        assert!(find_matching_slot(&declared, &slot(DayOfWeek::Tuesday, "09:30", "10:30")).is_none());
    }

    #[test]
    fn next_date_skips_today_for_the_same_weekday() {
        let date = next_date_for_day(wednesday_noon(), DayOfWeek::Wednesday);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 22).unwrap());
    }

    #[test]
    fn next_date_lands_within_the_next_six_days_otherwise() {
        let now = wednesday_noon();
        let today = now.date_naive();

        for day in [
            DayOfWeek::Sunday,
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
            DayOfWeek::Saturday,
        ] {
            let date = next_date_for_day(now, day);
            let delta = (date - today).num_days();
            assert!(delta >= 1 && delta <= 6, "{} landed {} days out", day, delta);
            assert_eq!(date.weekday().num_days_from_sunday(), day.num_days_from_sunday());
        }
    }

    #[test]
    fn slot_start_combines_date_and_time_at_minute_precision() {
        let start = slot_start_datetime(wednesday_noon(), DayOfWeek::Monday, "09:00").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap());
    }
}
