//! Priority engine: bucket classification, relative due labels and ordering.
//!
//! Everything here is pure. Callers pass `now` explicitly, normally
//! `chrono::Local::now()`, and get the same answer for the same inputs.

mod priority;
mod relative;
mod stats;

use chrono::{DateTime, TimeZone};

use crate::db::Task;

pub use priority::{classify, PriorityBucket};
pub use relative::format_relative;
pub use stats::TaskStats;

/// Returns a new list ordered for display; `tasks` is left untouched.
///
/// Incomplete tasks come first, then by bucket, then by due instant. The sort
/// is stable, so tasks with equal keys keep their relative input order.
pub fn sort_tasks<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<Task> {
    let mut keyed: Vec<(PriorityBucket, &Task)> =
        tasks.iter().map(|t| (classify(t, now), t)).collect();

    keyed.sort_by(|(a_bucket, a), (b_bucket, b)| {
        a.completed.cmp(&b.completed)
            .then(a_bucket.cmp(b_bucket))
            .then(a.due_date.cmp(&b.due_date))
    });

    keyed.into_iter().map(|(_, t)| t.clone()).collect()
}
