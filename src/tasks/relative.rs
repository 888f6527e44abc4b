use chrono::{DateTime, Datelike, Duration, TimeZone};

use super::priority::day_in;

/// Human label for a due date relative to `now`.
///
/// Uses the same day boundaries as [`classify`](super::classify) but ignores
/// completion, so a finished task that was due yesterday still reads "Overdue".
pub fn format_relative<Tz: TimeZone, Other: TimeZone>(
    date: &DateTime<Other>,
    now: &DateTime<Tz>,
) -> String {
    let today    = now.date_naive();
    let tomorrow = today + Duration::days(1);
    let day      = day_in(date, now);

    if day == today {
        return "Today".to_owned();
    }
    if day == tomorrow {
        return "Tomorrow".to_owned();
    }
    if day < today {
        return "Overdue".to_owned();
    }

    let diff_days = (day - today).num_days();
    if diff_days <= 7 {
        let unit = if diff_days == 1 { "day" } else { "days" };
        return format!("In {diff_days} {unit}");
    }

    if day.year() == today.year() {
        day.format("%b %-d").to_string()
    } else {
        day.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_support::{at, now};
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case(at(2024, 6, 5, 12, 0), "Overdue")]
    #[case(at(2023, 12, 31, 0, 0), "Overdue")]
    #[case(at(2024, 6, 10, 0, 0), "Today")]
    #[case(at(2024, 6, 10, 23, 59), "Today")]
    #[case(at(2024, 6, 11, 8, 0), "Tomorrow")]
    #[case(at(2024, 6, 12, 0, 0), "In 2 days")]
    #[case(at(2024, 6, 15, 0, 0), "In 5 days")]
    #[case(at(2024, 6, 17, 18, 0), "In 7 days")]
    #[case(at(2024, 6, 18, 0, 0), "Jun 18")]
    #[case(at(2024, 6, 20, 0, 0), "Jun 20")]
    #[case(at(2024, 12, 31, 0, 0), "Dec 31")]
    #[case(at(2025, 1, 3, 0, 0), "Jan 3, 2025")]
    fn labels(#[case] due: DateTime<Utc>, #[case] expected: &str) {
        assert_eq!(format_relative(&due, &now()), expected);
    }

    #[test]
    fn agrees_with_classifier_on_boundaries() {
        use crate::tasks::{classify, test_support::task_due, PriorityBucket};

        let now = now();
        for offset in -3..12 {
            let due = at(2024, 6, 10, 15, 0) + Duration::days(offset);
            let mut task = task_due("2024-06-10", false);
            task.due_date = due;
            let label = format_relative(&due, &now);
            match classify(&task, &now) {
                PriorityBucket::Overdue  => assert_eq!(label, "Overdue"),
                PriorityBucket::Today    => assert_eq!(label, "Today"),
                PriorityBucket::Tomorrow => assert_eq!(label, "Tomorrow"),
                PriorityBucket::ThisWeek => assert!(label.starts_with("In "), "{label}"),
                PriorityBucket::Future   => assert!(!label.starts_with("In "), "{label}"),
            }
        }
    }
}
