use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    db::{NewTask, Task},
    due::start_of_day,
    store::{StoreError, TaskStore},
    theme::ThemeConfig,
    ui::{draw, InputMode, TaskFormStep, UiState},
};

// ─── Panel focus model ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    TaskList,
    NewTask,
    Help,
}

// ─── Display snapshot ─────────────────────────────────────────────────────────

/// Sorted tasks split into the two on-screen sections. The cursor indexes
/// `active` followed by `completed`.
#[derive(Debug, Default)]
pub struct TaskView {
    pub active:    Vec<Task>,
    pub completed: Vec<Task>,
}

impl TaskView {
    pub fn build(store: &TaskStore, now: &DateTime<Local>, hide_completed: bool) -> Self {
        let (completed, active): (Vec<Task>, Vec<Task>) =
            store.sorted(now).into_iter().partition(|t| t.completed);
        Self {
            active,
            completed: if hide_completed { Vec::new() } else { completed },
        }
    }

    pub fn len(&self) -> usize { self.active.len() + self.completed.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn get(&self, idx: usize) -> Option<&Task> {
        self.active.get(idx)
            .or_else(|| idx.checked_sub(self.active.len()).and_then(|i| self.completed.get(i)))
    }
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub store:          TaskStore,
    pub theme:          ThemeConfig,
    pub theme_idx:      usize,
    pub hide_completed: bool,
    pub active_panel:   Panel,
    pub cursor:         usize,
    pub ui:             UiState,
    pub status:         String,
    pub running:        bool,
    clock:              fn() -> DateTime<Local>,
}

impl App {
    pub fn new(store: TaskStore, theme: ThemeConfig, hide_completed: bool) -> Self {
        let idx = ThemeConfig::all_themes().iter().position(|t| t.name == theme.name).unwrap_or(0);
        Self {
            store, theme, theme_idx: idx, hide_completed,
            active_panel: Panel::TaskList,
            cursor: 0,
            ui: UiState::default(),
            status: String::new(),
            running: true,
            clock: Local::now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Local> { (self.clock)() }

    pub fn today(&self) -> NaiveDate { self.now().date_naive() }

    pub fn view(&self) -> TaskView {
        TaskView::build(&self.store, &self.now(), self.hide_completed)
    }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term).await;

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen)?;
        term.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        // Redraw at least once a second so labels roll over at midnight.
        let tick = std::time::Duration::from_millis(1000);
        while self.running {
            term.draw(|f| draw(f, self))?;
            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(key).await?;
                }
            }
        }
        Ok(())
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.close_form();
            self.active_panel = Panel::TaskList;
            return Ok(());
        }

        match self.active_panel.clone() {
            Panel::TaskList => self.key_tasks(key).await?,
            Panel::NewTask  => self.key_form(key).await?,
            Panel::Help     => self.active_panel = Panel::TaskList,
        }
        Ok(())
    }

    async fn key_tasks(&mut self, key: KeyEvent) -> Result<()> {
        let len = self.view().len();
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.running = false;
            }
            (KeyCode::Char('?'), _) => self.active_panel = Panel::Help,
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                if self.cursor + 1 < len { self.cursor += 1; }
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            (KeyCode::Char('g'), _) | (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => self.cursor = len.saturating_sub(1),
            (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => self.toggle_selected().await?,
            (KeyCode::Char('d'), _) | (KeyCode::Delete, _) => self.delete_selected().await?,
            (KeyCode::Char('n'), _) | (KeyCode::Char('N'), _) => self.open_form(),
            (KeyCode::Char('c'), _) => {
                self.hide_completed = !self.hide_completed;
                self.clamp_cursor();
            }
            // T (Shift+T) — cycle through themes
            (KeyCode::Char('T'), _) => {
                let themes = ThemeConfig::all_themes();
                self.theme_idx = (self.theme_idx + 1) % themes.len();
                self.theme     = themes[self.theme_idx].clone();
                if let Err(e) = self.theme.save() {
                    tracing::warn!("failed to save theme: {e:#}");
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn toggle_selected(&mut self) -> Result<()> {
        let Some(id) = self.view().get(self.cursor).map(|t| t.id.clone()) else { return Ok(()) };
        match self.store.toggle(&id).await {
            Ok(true)  => self.status = "Task completed! 🎉 Great job staying productive!".into(),
            Ok(false) => self.status = "Task reopened".into(),
            Err(e)    => self.report(e)?,
        }
        self.clamp_cursor();
        Ok(())
    }

    async fn delete_selected(&mut self) -> Result<()> {
        let Some(id) = self.view().get(self.cursor).map(|t| t.id.clone()) else { return Ok(()) };
        match self.store.delete(&id).await {
            Ok(_)  => self.status = "Task deleted".into(),
            Err(e) => self.report(e)?,
        }
        self.clamp_cursor();
        Ok(())
    }

    /// Shows recoverable store errors in the status bar; storage failures
    /// bubble up and end the session.
    fn report(&mut self, err: StoreError) -> Result<()> {
        match err {
            StoreError::Storage(e) => Err(e),
            other => {
                tracing::warn!("{other}");
                self.status = format!("✗ {other}");
                Ok(())
            }
        }
    }

    fn clamp_cursor(&mut self) {
        let len = self.view().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    // ── Multi-step task form ──────────────────────────────────────────────────

    fn open_form(&mut self) {
        self.ui.new_title.clear();
        self.ui.new_description.clear();
        self.ui.new_due    = self.today() + Duration::days(1);
        self.ui.form_step  = TaskFormStep::Title;
        self.ui.form_error = None;
        self.ui.input_mode = InputMode::Insert;
        self.active_panel  = Panel::NewTask;
    }

    fn close_form(&mut self) {
        self.ui.input_mode = InputMode::Normal;
        self.ui.form_step  = TaskFormStep::Title;
        self.ui.form_error = None;
    }

    async fn key_form(&mut self, key: KeyEvent) -> Result<()> {
        match self.ui.form_step {
            TaskFormStep::Title => match key.code {
                KeyCode::Char(c)   => { self.ui.new_title.push(c); self.ui.form_error = None; }
                KeyCode::Backspace => { self.ui.new_title.pop(); }
                KeyCode::Enter | KeyCode::Tab => {
                    if self.ui.new_title.trim().is_empty() {
                        self.ui.form_error = Some("A title is required".into());
                    } else {
                        self.ui.form_step = TaskFormStep::Description;
                    }
                }
                _ => {}
            },
            TaskFormStep::Description => match key.code {
                KeyCode::Char(c)   => self.ui.new_description.push(c),
                KeyCode::Backspace => { self.ui.new_description.pop(); }
                KeyCode::Enter | KeyCode::Tab => self.ui.form_step = TaskFormStep::DueDate,
                KeyCode::BackTab   => self.ui.form_step = TaskFormStep::Title,
                _ => {}
            },
            TaskFormStep::DueDate => match key.code {
                KeyCode::Up   | KeyCode::Char('k') | KeyCode::Char('l') | KeyCode::Right => self.shift_due(1),
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('h') | KeyCode::Left  => self.shift_due(-1),
                KeyCode::PageUp   => self.shift_due(7),
                KeyCode::PageDown => self.shift_due(-7),
                KeyCode::Char('t') => self.ui.new_due = self.today(),
                KeyCode::BackTab   => self.ui.form_step = TaskFormStep::Description,
                KeyCode::Enter     => self.commit_form().await?,
                _ => {}
            },
        }
        Ok(())
    }

    /// Moves the pending due date, never before today.
    fn shift_due(&mut self, days: i64) {
        let today = self.today();
        let moved = self.ui.new_due.checked_add_signed(Duration::days(days)).unwrap_or(self.ui.new_due);
        self.ui.new_due = moved.max(today);
    }

    async fn commit_form(&mut self) -> Result<()> {
        let description = Some(self.ui.new_description.as_str());
        let new = NewTask::new(
            &self.ui.new_title,
            description,
            start_of_day(self.ui.new_due, &Local),
        );
        match self.store.add(new, Utc::now()).await {
            Ok(task) => {
                self.status = "Task added! Your new task has been created.".into();
                if let Some(pos) = self.view().active.iter().position(|t| t.id == task.id) {
                    self.cursor = pos;
                }
            }
            Err(e) => self.report(e)?,
        }
        self.close_form();
        self.active_panel = Panel::TaskList;
        Ok(())
    }
}
