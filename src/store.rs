//! In-memory task collection with write-through persistence.
//!
//! The store is the only writer of the collection. Everything that orders or
//! classifies tasks works on a borrowed snapshot via [`crate::tasks`].

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::db::{Database, NewTask, Task, TaskValidationError};
use crate::tasks::{sort_tasks, TaskStats};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] TaskValidationError),
    #[error("no task matches `{0}`")]
    NotFound(String),
    #[error("`{prefix}` matches {count} tasks; use more characters")]
    Ambiguous { prefix: String, count: usize },
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct TaskStore {
    db:    Database,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub async fn load(db: Database) -> Result<Self, StoreError> {
        let tasks = db.all_tasks().await?;
        tracing::debug!(count = tasks.len(), "loaded tasks");
        Ok(Self { db, tasks })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub async fn add(&mut self, new: NewTask, created_at: DateTime<Utc>) -> Result<Task, StoreError> {
        let task = Task::create(new, created_at)?;
        self.db.upsert_task(&task).await?;
        tracing::info!(id = %task.id, due = %task.due_date, "task added");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Flips completion and returns the new state.
    pub async fn toggle(&mut self, id: &str) -> Result<bool, StoreError> {
        let idx = self.tasks.iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        let completed = !self.tasks[idx].completed;
        if !self.db.set_completed(id, completed).await? {
            return Err(self.forget(id));
        }
        self.tasks[idx].completed = completed;
        tracing::info!(%id, completed, "task toggled");
        Ok(completed)
    }

    pub async fn delete(&mut self, id: &str) -> Result<Task, StoreError> {
        let idx = self.tasks.iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        if !self.db.delete_task(id).await? {
            return Err(self.forget(id));
        }
        tracing::info!(%id, "task deleted");
        Ok(self.tasks.remove(idx))
    }

    /// Drops a task whose row has gone from storage (another process removed
    /// it) and reports it as missing.
    fn forget(&mut self, id: &str) -> StoreError {
        tracing::warn!(%id, "task vanished from storage; dropping it");
        self.tasks.retain(|t| t.id != id);
        StoreError::NotFound(id.to_owned())
    }

    /// Adds tasks whose ids are not already present, trimmed the same way as
    /// new ones. Invalid titles are skipped. Returns how many were added.
    pub async fn import(&mut self, tasks: Vec<Task>) -> Result<usize, StoreError> {
        let mut added = 0;
        for task in tasks {
            let id = task.id.clone();
            let Ok(task) = task.normalized() else {
                tracing::warn!(%id, "skipping imported task with empty title");
                continue;
            };
            if self.get(&task.id).is_some() {
                continue;
            }
            if self.db.insert_if_absent(&task).await? {
                self.tasks.push(task);
                added += 1;
            }
        }
        tracing::info!(added, "import finished");
        Ok(added)
    }

    /// Resolves a full id or an unambiguous id prefix.
    pub fn resolve(&self, prefix: &str) -> Result<&Task, StoreError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(StoreError::NotFound(prefix.to_owned()));
        }
        if let Some(exact) = self.get(prefix) {
            return Ok(exact);
        }
        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.count()) {
            (Some(task), 0) => Ok(task),
            (Some(_), more) => Err(StoreError::Ambiguous { prefix: prefix.to_owned(), count: more + 1 }),
            (None, _)       => Err(StoreError::NotFound(prefix.to_owned())),
        }
    }

    pub fn sorted<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<Task> {
        sort_tasks(&self.tasks, now)
    }

    pub fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TaskStats {
        TaskStats::compute(&self.tasks, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    async fn store() -> TaskStore {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        TaskStore::load(db).await.unwrap()
    }

    #[tokio::test]
    async fn add_toggle_delete_write_through() {
        let mut store = store().await;
        let task = store.add(NewTask::new("Buy milk", None, due(12)), due(1)).await.unwrap();

        assert!(store.toggle(&task.id).await.unwrap());
        assert!(!store.toggle(&task.id).await.unwrap());
        assert!(store.toggle(&task.id).await.unwrap());

        let reloaded = TaskStore::load(store.db.clone()).await.unwrap();
        assert_eq!(reloaded.tasks(), store.tasks());
        assert!(reloaded.tasks()[0].completed);

        let removed = store.delete(&task.id).await.unwrap();
        assert_eq!(removed.id, task.id);
        assert!(store.tasks().is_empty());
        assert!(TaskStore::load(store.db.clone()).await.unwrap().tasks().is_empty());
    }

    #[tokio::test]
    async fn rejects_blank_titles_without_writing() {
        let mut store = store().await;
        let err = store.add(NewTask::new("   ", None, due(12)), due(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(TaskValidationError::EmptyTitle)));
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let mut store = store().await;
        assert!(matches!(store.toggle("ghost").await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("ghost").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn rows_removed_elsewhere_are_not_found() {
        let mut store = store().await;
        let a = store.add(NewTask::new("a", None, due(12)), due(1)).await.unwrap();
        let b = store.add(NewTask::new("b", None, due(13)), due(1)).await.unwrap();
        store.db.delete_task(&a.id).await.unwrap();
        store.db.delete_task(&b.id).await.unwrap();

        assert!(matches!(store.toggle(&a.id).await, Err(StoreError::NotFound(_))));
        assert!(store.get(&a.id).is_none());
        assert!(matches!(store.delete(&b.id).await, Err(StoreError::NotFound(_))));
        assert!(store.tasks().is_empty());
    }

    #[tokio::test]
    async fn import_trims_title_and_description() {
        let mut store = store().await;
        let mut task = Task::create(NewTask::new("x", None, due(12)), due(1)).unwrap();
        task.title = "  Dentist  ".into();
        task.description = Some("   ".into());

        assert_eq!(store.import(vec![task.clone()]).await.unwrap(), 1);
        assert_eq!(store.get(&task.id).unwrap().title, "Dentist");
        assert_eq!(store.get(&task.id).unwrap().description, None);

        let reloaded = TaskStore::load(store.db.clone()).await.unwrap();
        assert_eq!(reloaded.tasks()[0].title, "Dentist");
        assert_eq!(reloaded.tasks()[0].description, None);
    }

    #[tokio::test]
    async fn resolve_by_prefix() {
        let mut store = store().await;
        let mut a = Task::create(NewTask::new("a", None, due(12)), due(1)).unwrap();
        let mut b = a.clone();
        a.id = "abc111".into();
        b.id = "abc222".into();
        b.title = "b".into();
        store.import(vec![a, b]).await.unwrap();

        assert_eq!(store.resolve("abc1").unwrap().title, "a");
        assert_eq!(store.resolve("abc222").unwrap().title, "b");
        assert!(matches!(store.resolve("abc"), Err(StoreError::Ambiguous { count: 2, .. })));
        assert!(matches!(store.resolve("zzz"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.resolve(""), Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn import_skips_duplicates_and_blank_titles() {
        let mut store = store().await;
        let existing = store.add(NewTask::new("Keep", None, due(12)), due(1)).await.unwrap();
        let mut blank = existing.clone();
        blank.id = "blank".into();
        blank.title = "  ".into();
        let fresh = Task::create(NewTask::new("Fresh", None, due(14)), due(1)).unwrap();

        let added = store.import(vec![existing.clone(), blank, fresh.clone()]).await.unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.tasks(), [existing, fresh]);
    }

    #[tokio::test]
    async fn sorted_and_stats_use_snapshot() {
        let mut store = store().await;
        store.add(NewTask::new("later", None, due(30)), due(1)).await.unwrap();
        store.add(NewTask::new("late", None, due(5)), due(1)).await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();

        let order: Vec<String> = store.sorted(&now).into_iter().map(|t| t.title).collect();
        assert_eq!(order, ["late", "later"]);
        assert_eq!(store.tasks()[0].title, "later");

        let stats = store.stats(&now);
        assert_eq!((stats.overdue, stats.upcoming, stats.completed), (1, 1, 0));
    }
}
