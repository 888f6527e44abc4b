use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

// ─── Domain model ─────────────────────────────────────────────────────────────

/// A to-do item. Serialized with camelCase keys so exports stay readable by
/// other task-list tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id:          String,
    pub title:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date:    DateTime<Utc>,
    pub completed:   bool,
    pub created_at:  DateTime<Utc>,
}

/// User input for a task that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title:       String,
    pub description: Option<String>,
    pub due_date:    DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    #[error("task title cannot be empty")]
    EmptyTitle,
}

impl NewTask {
    pub fn new(title: &str, description: Option<&str>, due_date: DateTime<Utc>) -> Self {
        Self {
            title:       title.to_owned(),
            description: description.map(str::to_owned),
            due_date,
        }
    }
}

impl Task {
    /// Builds a task with a fresh id. Title and description are trimmed; a
    /// blank description becomes `None`.
    pub fn create(new: NewTask, created_at: DateTime<Utc>) -> Result<Self, TaskValidationError> {
        Self {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            due_date: new.due_date,
            completed: false,
            created_at,
        }
        .normalized()
    }

    /// Trims title and description, dropping a blank description. Fails when
    /// nothing is left of the title.
    pub fn normalized(mut self) -> Result<Self, TaskValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        self.title = title.to_owned();
        self.description = self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        Ok(self)
    }

    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

// ─── Database ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        tracing::debug!(path = %db_path.display(), "opening task database");
        Ok(Self { pool: SqlitePool::connect(&url).await? })
    }

    /// A private database that lives as long as the returned handle.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY, title TEXT NOT NULL, description TEXT,
                due_date TEXT NOT NULL, completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )"
        ).execute(&self.pool).await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_due ON tasks(due_date)")
            .execute(&self.pool).await?;

        tracing::info!("DB migrations complete");
        Ok(())
    }

    // ── Tasks ─────────────────────────────────────────────────────────────────

    pub async fn upsert_task(&self, t: &Task) -> Result<()> {
        sqlx::query(
            "INSERT INTO tasks (id,title,description,due_date,completed,created_at)
             VALUES (?,?,?,?,?,?)
             ON CONFLICT(id) DO UPDATE SET
                title=excluded.title, description=excluded.description,
                due_date=excluded.due_date, completed=excluded.completed"
        )
        .bind(&t.id).bind(&t.title).bind(&t.description)
        .bind(t.due_date.to_rfc3339()).bind(t.completed as i32)
        .bind(t.created_at.to_rfc3339())
        .execute(&self.pool).await?;
        Ok(())
    }

    /// Inserts `t` unless a task with the same id exists. Returns whether a
    /// row was written.
    pub async fn insert_if_absent(&self, t: &Task) -> Result<bool> {
        let done = sqlx::query(
            "INSERT OR IGNORE INTO tasks (id,title,description,due_date,completed,created_at)
             VALUES (?,?,?,?,?,?)"
        )
        .bind(&t.id).bind(&t.title).bind(&t.description)
        .bind(t.due_date.to_rfc3339()).bind(t.completed as i32)
        .bind(t.created_at.to_rfc3339())
        .execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn set_completed(&self, id: &str, completed: bool) -> Result<bool> {
        let done = sqlx::query("UPDATE tasks SET completed=? WHERE id=?")
            .bind(completed as i32).bind(id)
            .execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn delete_task(&self, id: &str) -> Result<bool> {
        let done = sqlx::query("DELETE FROM tasks WHERE id=?")
            .bind(id)
            .execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    /// All tasks in insertion order; display ordering is the caller's job.
    pub async fn all_tasks(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks ORDER BY rowid")
            .fetch_all(&self.pool).await?;
        rows.iter().map(row_to_task).collect()
    }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Result<Task> {
    Ok(Task {
        id:          row.get("id"),
        title:       row.get("title"),
        description: row.get("description"),
        due_date:    parse_dt(row.get("due_date"))?,
        completed:   row.get::<i32, _>("completed") != 0,
        created_at:  parse_dt(row.get("created_at"))?,
    })
}

fn parse_dt(s: String) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc))
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasktracker")
        .join("tasktracker.db")
}
