mod app;
mod config;
mod db;
mod due;
mod export;
mod store;
mod tasks;
mod theme;
mod ui;

use anyhow::{anyhow, bail, Result};
use app::App;
use chrono::{DateTime, Local, Utc};
use config::AppConfig;
use db::{Database, NewTask, Task};
use std::path::PathBuf;
use store::TaskStore;
use tasks::{classify, format_relative};
use theme::ThemeConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "\
usage: tt                                   open the task list
       tt add <title> [--due DATE] [--desc TEXT]
       tt list [--active]                   print tasks in priority order
       tt done <id>                         toggle completion
       tt rm <id>                           delete a task
       tt export [FILE]                     write tasks as JSON (stdout by default)
       tt import <FILE>                     add tasks from a JSON export

DATE is YYYY-MM-DD, today, tomorrow or +N (days). <id> may be a unique prefix.";

#[derive(Debug, PartialEq)]
enum Command {
    Tui,
    Help,
    Add { title: String, due: Option<String>, description: Option<String> },
    List { all: bool },
    Done(String),
    Remove(String),
    Export(Option<PathBuf>),
    Import(PathBuf),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = parse_command(&args)?;
    if cmd == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let cfg = AppConfig::load()?;
    match cmd {
        Command::Tui => run_tui(cfg).await,
        other => {
            init_stderr_logging(cfg.log_level());
            run_command(other, &cfg).await
        }
    }
}

// ─── Argument parsing ─────────────────────────────────────────────────────────

fn parse_command(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else { return Ok(Command::Tui) };
    let rest = &args[1..];
    let one = |what: &str| -> Result<String> {
        match rest {
            [value] => Ok(value.clone()),
            _       => Err(anyhow!("expected exactly one {what}\n\n{USAGE}")),
        }
    };

    match first.as_str() {
        "help" | "-h" | "--help" => Ok(Command::Help),
        "add"    => parse_add(rest),
        "list" | "ls" => match rest {
            []                       => Ok(Command::List { all: true }),
            [flag] if flag == "--all" => Ok(Command::List { all: true }),
            [flag] if flag == "--active" => Ok(Command::List { all: false }),
            _ => bail!("unexpected arguments to list\n\n{USAGE}"),
        },
        "done" | "toggle" => Ok(Command::Done(one("task id")?)),
        "rm" | "delete"   => Ok(Command::Remove(one("task id")?)),
        "export" => match rest {
            []     => Ok(Command::Export(None)),
            [path] => Ok(Command::Export(Some(PathBuf::from(path)))),
            _      => bail!("export takes at most one file\n\n{USAGE}"),
        },
        "import" => Ok(Command::Import(PathBuf::from(one("file")?))),
        other    => bail!("unknown command `{other}`\n\n{USAGE}"),
    }
}

fn parse_add(rest: &[String]) -> Result<Command> {
    let mut title: Vec<&str> = Vec::new();
    let mut due = None;
    let mut description = None;

    let mut it = rest.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--due" | "-d" => {
                due = Some(it.next().ok_or_else(|| anyhow!("--due needs a value"))?.clone());
            }
            "--desc" | "-m" => {
                description = Some(it.next().ok_or_else(|| anyhow!("--desc needs a value"))?.clone());
            }
            word => title.push(word),
        }
    }
    if title.is_empty() {
        bail!("add needs a title\n\n{USAGE}");
    }
    Ok(Command::Add { title: title.join(" "), due, description })
}

// ─── One-shot commands ────────────────────────────────────────────────────────

async fn open_store(cfg: &AppConfig) -> Result<TaskStore> {
    let db = Database::connect(&cfg.db_path()).await?;
    db.migrate().await?;
    Ok(TaskStore::load(db).await?)
}

async fn run_command(cmd: Command, cfg: &AppConfig) -> Result<()> {
    let mut store = open_store(cfg).await?;
    let now = Local::now();

    match cmd {
        Command::Add { title, due: due_arg, description } => {
            let day  = due::parse_due(due_arg.as_deref().unwrap_or("tomorrow"), now.date_naive())?;
            let new  = NewTask::new(&title, description.as_deref(), due::start_of_day(day, &Local));
            let task = store.add(new, Utc::now()).await?;
            println!("Added {}  {}  ({})", task.short_id(), task.title, format_relative(&task.due_date, &now));
        }
        Command::List { all } => {
            let sorted = store.sorted(&now);
            let shown: Vec<&Task> = sorted.iter().filter(|t| all || !t.completed).collect();
            if shown.is_empty() {
                println!("No tasks yet. Add one with: tt add <title>");
            }
            for task in shown {
                println!("{}", list_line(task, &now));
            }
            let stats = store.stats(&now);
            println!(
                "\n{} active · {} overdue · {} due today · {} upcoming · {} completed",
                stats.active, stats.overdue, stats.due_today, stats.upcoming, stats.completed,
            );
        }
        Command::Done(prefix) => {
            let id = store.resolve(&prefix)?.id.clone();
            let completed = store.toggle(&id).await?;
            let title = store.get(&id).map(|t| t.title.as_str()).unwrap_or_default();
            if completed {
                println!("Task completed! 🎉  {title}");
            } else {
                println!("Reopened  {title}");
            }
        }
        Command::Remove(prefix) => {
            let id = store.resolve(&prefix)?.id.clone();
            let task = store.delete(&id).await?;
            println!("Deleted  {}", task.title);
        }
        Command::Export(None) => println!("{}", export::to_json(store.tasks())?),
        Command::Export(Some(path)) => {
            export::write_file(&path, store.tasks())?;
            println!("Exported {} tasks to {}", store.tasks().len(), path.display());
        }
        Command::Import(path) => {
            let tasks = export::read_file(&path)?;
            let total = tasks.len();
            let added = store.import(tasks).await?;
            println!("Imported {added} of {total} tasks from {}", path.display());
        }
        Command::Tui | Command::Help => bail!("not a one-shot command"),
    }
    Ok(())
}

fn list_line(task: &Task, now: &DateTime<Local>) -> String {
    let check = if task.completed { "✔" } else { "○" };
    let bucket = if task.completed { "done".to_owned() } else { classify(task, now).to_string() };
    format!(
        "{}  {check} {:<40} {:>12}  [{bucket}]",
        task.short_id(),
        task.title,
        format_relative(&task.due_date, now),
    )
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

async fn run_tui(cfg: AppConfig) -> Result<()> {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasktracker");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tasktracker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(env_filter(cfg.log_level()))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Starting Task Tracker");

    let theme = ThemeConfig::load().unwrap_or_else(|e| {
        tracing::warn!("falling back to default theme: {e:#}");
        ThemeConfig::default()
    });
    let store = open_store(&cfg).await?;

    let mut app = App::new(store, theme, cfg.hide_completed());
    app.run().await?;
    tracing::info!("Task Tracker closed");
    Ok(())
}

// ─── Logging ─────────────────────────────────────────────────────────────────

/// `RUST_LOG` wins over the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_stderr_logging(level: &str) {
    // Logging to stderr so it doesn't interfere with command output
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn no_arguments_opens_tui() {
        assert_eq!(parse_command(&[]).unwrap(), Command::Tui);
    }

    #[test]
    fn add_collects_title_words_and_flags() {
        let cmd = parse_command(&args(&["add", "Buy", "--due", "+3", "oat", "milk", "--desc", "2 litres"])).unwrap();
        assert_eq!(cmd, Command::Add {
            title: "Buy oat milk".into(),
            due: Some("+3".into()),
            description: Some("2 litres".into()),
        });
    }

    #[test]
    fn add_without_title_or_flag_value_fails() {
        assert!(parse_command(&args(&["add", "--due", "today"])).is_err());
        assert!(parse_command(&args(&["add", "x", "--due"])).is_err());
    }

    #[test]
    fn id_commands_need_exactly_one_id() {
        assert_eq!(parse_command(&args(&["done", "ab12"])).unwrap(), Command::Done("ab12".into()));
        assert_eq!(parse_command(&args(&["rm", "ab12"])).unwrap(), Command::Remove("ab12".into()));
        assert!(parse_command(&args(&["rm"])).is_err());
        assert!(parse_command(&args(&["done", "a", "b"])).is_err());
    }

    #[test]
    fn list_export_import_and_unknown() {
        assert_eq!(parse_command(&args(&["list", "--active"])).unwrap(), Command::List { all: false });
        assert_eq!(parse_command(&args(&["export"])).unwrap(), Command::Export(None));
        assert_eq!(
            parse_command(&args(&["import", "tasks.json"])).unwrap(),
            Command::Import(PathBuf::from("tasks.json")),
        );
        let err = parse_command(&args(&["frobnicate"])).unwrap_err();
        assert!(err.to_string().contains("unknown command"));
    }

    #[test]
    fn list_line_shows_bucket_and_label() {
        let now = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let due = due::start_of_day(now.date_naive() - chrono::Duration::days(2), &Local);
        let mut task = Task::create(NewTask::new("Renew passport", None, due), Utc::now()).unwrap();

        let line = list_line(&task, &now);
        assert!(line.starts_with(task.short_id()));
        assert!(line.contains("Overdue"));
        assert!(line.ends_with("[overdue]"));

        task.completed = true;
        assert!(list_line(&task, &now).ends_with("[done]"));
    }
}
