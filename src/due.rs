//! Due-date entry: parsing what the user typed and pinning a calendar day to
//! an instant for storage.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DueDateError {
    #[error("unrecognised due date `{0}`; expected YYYY-MM-DD, today, tomorrow or +N")]
    Unparseable(String),
    #[error("due date {0} is in the past")]
    InPast(NaiveDate),
}

/// Parses `YYYY-MM-DD`, `today`, `tomorrow` or `+N` relative to `today`.
/// Days before `today` are rejected.
pub fn parse_due(input: &str, today: NaiveDate) -> Result<NaiveDate, DueDateError> {
    let s = input.trim().to_ascii_lowercase();
    let date = match s.as_str() {
        "today"    => today,
        "tomorrow" => today + Duration::days(1),
        _ => {
            if let Some(n) = s.strip_prefix('+') {
                let days: i64 = n.parse()
                    .map_err(|_| DueDateError::Unparseable(input.to_owned()))?;
                Duration::try_days(days)
                    .and_then(|d| today.checked_add_signed(d))
                    .ok_or_else(|| DueDateError::Unparseable(input.to_owned()))?
            } else {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .map_err(|_| DueDateError::Unparseable(input.to_owned()))?
            }
        }
    };
    if date < today {
        return Err(DueDateError::InPast(date));
    }
    Ok(date)
}

/// First instant of `date` in `tz`, as UTC.
///
/// When midnight does not exist locally (a DST jump at 00:00) the next
/// representable hour is used.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    (0..3)
        .map(|h| midnight + Duration::hours(h))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use rstest::rstest;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case("today", "2024-06-10")]
    #[case("Tomorrow", "2024-06-11")]
    #[case("+0", "2024-06-10")]
    #[case("+7", "2024-06-17")]
    #[case(" 2024-12-25 ", "2024-12-25")]
    fn accepts_supported_forms(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_due(input, d("2024-06-10")), Ok(d(expected)));
    }

    #[rstest]
    #[case("next week")]
    #[case("+x")]
    #[case("2024-13-01")]
    #[case("")]
    #[case("+999999999999999")]
    #[case("+99999999999")]
    fn rejects_garbage(#[case] input: &str) {
        assert!(matches!(parse_due(input, d("2024-06-10")), Err(DueDateError::Unparseable(_))));
    }

    #[test]
    fn rejects_past_days() {
        assert_eq!(parse_due("2024-06-09", d("2024-06-10")), Err(DueDateError::InPast(d("2024-06-09"))));
        assert_eq!(parse_due("+-1", d("2024-06-10")), Err(DueDateError::InPast(d("2024-06-09"))));
    }

    #[test]
    fn start_of_day_uses_local_midnight() {
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let start = start_of_day(d("2024-06-10"), &east);
        assert_eq!(start.to_rfc3339(), "2024-06-09T22:00:00+00:00");
        assert_eq!(start.with_timezone(&east).date_naive(), d("2024-06-10"));
        assert_eq!(start_of_day(d("2024-06-10"), &Utc).to_rfc3339(), "2024-06-10T00:00:00+00:00");
    }
}
