//! JSON export / import of the task list (ISO-8601 timestamps, camelCase keys).

use anyhow::{Context, Result};
use std::path::Path;

use crate::db::Task;

pub fn to_json(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

pub fn from_json(s: &str) -> Result<Vec<Task>> {
    serde_json::from_str(s).context("task list is not a valid JSON array of tasks")
}

pub fn write_file(path: &Path, tasks: &[Task]) -> Result<()> {
    std::fs::write(path, to_json(tasks)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_file(path: &Path) -> Result<Vec<Task>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    from_json(&raw)
}
