use chrono::{DateTime, TimeZone};

use super::priority::{classify, PriorityBucket};
use crate::db::Task;

/// Counters shown in the stats bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub active:    usize,
    pub completed: usize,
    pub overdue:   usize,
    pub due_today: usize,
    /// Incomplete tasks due tomorrow or later.
    pub upcoming:  usize,
}

impl TaskStats {
    pub fn compute<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Self {
        let mut stats = TaskStats::default();
        for task in tasks {
            if task.completed {
                stats.completed += 1;
                continue;
            }
            stats.active += 1;
            match classify(task, now) {
                PriorityBucket::Overdue => stats.overdue += 1,
                PriorityBucket::Today   => stats.due_today += 1,
                PriorityBucket::Tomorrow
                | PriorityBucket::ThisWeek
                | PriorityBucket::Future => stats.upcoming += 1,
            }
        }
        stats
    }
}
