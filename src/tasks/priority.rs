use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::Task;

/// Urgency of a task relative to "today". Variants are declared in sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityBucket {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    Future,
}

impl PriorityBucket {
    pub const ALL: [PriorityBucket; 5] = [
        PriorityBucket::Overdue,
        PriorityBucket::Today,
        PriorityBucket::Tomorrow,
        PriorityBucket::ThisWeek,
        PriorityBucket::Future,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PriorityBucket::Overdue  => "overdue",
            PriorityBucket::Today    => "today",
            PriorityBucket::Tomorrow => "tomorrow",
            PriorityBucket::ThisWeek => "this-week",
            PriorityBucket::Future   => "future",
        }
    }
}

impl fmt::Display for PriorityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar day of `instant` as seen from the timezone of `now`.
pub(crate) fn day_in<Tz: TimeZone, Other: TimeZone>(
    instant: &DateTime<Other>,
    now: &DateTime<Tz>,
) -> NaiveDate {
    instant.with_timezone(&now.timezone()).date_naive()
}

/// Buckets a task by due day. Completed tasks are always `Future`.
///
/// Both the due date and `now` are reduced to calendar days in `now`'s
/// timezone, so a task due at 23:59 today is still `Today`.
pub fn classify<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> PriorityBucket {
    if task.completed {
        return PriorityBucket::Future;
    }

    let today    = now.date_naive();
    let tomorrow = today + Duration::days(1);
    let week_end = today + Duration::days(7);
    let due      = day_in(&task.due_date, now);

    if due < today {
        PriorityBucket::Overdue
    } else if due == today {
        PriorityBucket::Today
    } else if due == tomorrow {
        PriorityBucket::Tomorrow
    } else if due <= week_end {
        PriorityBucket::ThisWeek
    } else {
        PriorityBucket::Future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::test_support::{at, now, task_due};
    use chrono::{FixedOffset, Utc};
    use rstest::rstest;

    #[rstest]
    #[case("2024-06-05", PriorityBucket::Overdue)]
    #[case("2024-06-09", PriorityBucket::Overdue)]
    #[case("2024-06-10", PriorityBucket::Today)]
    #[case("2024-06-11", PriorityBucket::Tomorrow)]
    #[case("2024-06-12", PriorityBucket::ThisWeek)]
    #[case("2024-06-15", PriorityBucket::ThisWeek)]
    #[case("2024-06-17", PriorityBucket::ThisWeek)]
    #[case("2024-06-18", PriorityBucket::Future)]
    #[case("2024-06-20", PriorityBucket::Future)]
    fn buckets_follow_day_boundaries(#[case] due: &str, #[case] expected: PriorityBucket) {
        assert_eq!(classify(&task_due(due, false), &now()), expected);
    }

    #[rstest]
    #[case("2024-06-01")]
    #[case("2024-06-10")]
    #[case("2024-06-13")]
    #[case("2030-01-01")]
    fn completed_tasks_are_always_future(#[case] due: &str) {
        assert_eq!(classify(&task_due(due, true), &now()), PriorityBucket::Future);
    }

    #[test]
    fn time_of_day_is_ignored() {
        let mut task = task_due("2024-06-10", false);
        task.due_date = at(2024, 6, 10, 23, 59);
        let early = Utc.with_ymd_and_hms(2024, 6, 10, 0, 1, 0).unwrap();
        assert_eq!(classify(&task, &early), PriorityBucket::Today);

        task.due_date = at(2024, 6, 10, 0, 0);
        let late = Utc.with_ymd_and_hms(2024, 6, 10, 23, 58, 0).unwrap();
        assert_eq!(classify(&task, &late), PriorityBucket::Today);
    }

    #[test]
    fn days_are_taken_in_the_timezone_of_now() {
        // 2024-06-11 02:00 UTC is still the 10th in UTC-05:00.
        let mut task = task_due("2024-06-10", false);
        task.due_date = at(2024, 6, 11, 2, 0);
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let now_west = offset.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(classify(&task, &now_west), PriorityBucket::Today);
        assert_eq!(classify(&task, &now()), PriorityBucket::Tomorrow);
    }

    #[test]
    fn bucket_order_matches_urgency() {
        let mut sorted = PriorityBucket::ALL;
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, PriorityBucket::ALL);
        assert_eq!(PriorityBucket::ThisWeek.to_string(), "this-week");
    }
}
