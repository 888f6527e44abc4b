use chrono::{DateTime, Local, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Panel, TaskView};
use crate::db::Task;
use crate::tasks::{classify, format_relative, PriorityBucket};
use crate::theme::ThemeConfig;

// ─── UI enums / state ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
pub enum InputMode { #[default] Normal, Insert }

/// Which step of the multi-step task creation form we're on.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum TaskFormStep {
    #[default]
    Title,
    Description,
    DueDate,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub input_mode:      InputMode,
    pub form_step:       TaskFormStep,
    pub new_title:       String,
    pub new_description: String,
    pub new_due:         NaiveDate,
    pub form_error:      Option<String>,
}

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let now  = app.now();
    let view = app.view();

    // Fill background
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg()).fg(app.theme.fg())),
        area,
    );

    // Layout: [ stats(3) | tasks | status_bar(1) ]
    let root = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    draw_stats(f, app, &now, root[0]);
    draw_tasks(f, app, &view, &now, root[1]);
    draw_statusbar(f, app, root[2]);

    // Overlays
    match app.active_panel {
        Panel::NewTask => draw_task_form(f, area, app),
        Panel::Help    => draw_help(f, area, app),
        Panel::TaskList => {}
    }
}

// ─── Stats bar ────────────────────────────────────────────────────────────────

fn draw_stats(f: &mut Frame, app: &App, now: &DateTime<Local>, area: Rect) {
    let t     = &app.theme;
    let stats = app.store.stats(now);
    let block = panel_block(t, " Task Tracker · Smart Priority ", false);

    let stat = |icon: &'static str, label: &'static str, value: usize, color: Color| {
        vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(format!("{value} "), Style::default().fg(t.fg()).add_modifier(Modifier::BOLD)),
            Span::styled(format!("{label}   "), Style::default().fg(t.fg_dim())),
        ]
    };
    let mut spans = Vec::new();
    spans.extend(stat("✔", "Completed", stats.completed, t.done_color()));
    spans.extend(stat("⚠", "Overdue", stats.overdue, t.bucket_color(PriorityBucket::Overdue)));
    spans.extend(stat("◷", "Due Today", stats.due_today, t.bucket_color(PriorityBucket::Today)));
    spans.extend(stat("▦", "Upcoming", stats.upcoming, t.bucket_color(PriorityBucket::ThisWeek)));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ─── Tasks panel ──────────────────────────────────────────────────────────────

fn draw_tasks(f: &mut Frame, app: &App, view: &TaskView, now: &DateTime<Local>, area: Rect) {
    let t       = &app.theme;
    let focused = app.active_panel == Panel::TaskList;
    let block   = panel_block(t, " ○ Tasks ", focused);

    if view.is_empty() {
        let hint = if app.store.tasks().is_empty() {
            "  No tasks yet. Press N to create your first task and start staying organized!"
        } else {
            "  Nothing to show. Press c to show completed tasks."
        };
        f.render_widget(
            Paragraph::new(hint).block(block).style(Style::default().fg(t.fg_dim()))
                .wrap(Wrap { trim: false }),
            area,
        );
        return;
    }

    let width = block.inner(area).width as usize;
    let mut items: Vec<ListItem> = Vec::new();
    let mut selected_row = None;

    let sections = [
        ("Active Tasks", &view.active, t.accent()),
        ("Completed",    &view.completed, t.done_color()),
    ];
    let mut idx = 0;
    for (label, tasks, color) in sections {
        if tasks.is_empty() { continue; }
        items.push(ListItem::new(Line::from(Span::styled(
            format!(" ▍{label} ({})", tasks.len()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))));
        for task in tasks.iter() {
            let selected = idx == app.cursor && focused;
            if selected { selected_row = Some(items.len()); }
            items.push(task_item(t, task, now, selected, width));
            idx += 1;
        }
    }

    let mut state = ListState::default();
    state.select(selected_row);
    f.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn task_item<'a>(
    t: &ThemeConfig,
    task: &'a Task,
    now: &DateTime<Local>,
    selected: bool,
    width: usize,
) -> ListItem<'a> {
    let bucket = classify(task, now);
    let label  = format_relative(&task.due_date, now);

    let (check, check_style) = if task.completed {
        (" ✔ ", Style::default().fg(t.done_color()))
    } else {
        (" ● ", Style::default().fg(t.bucket_color(bucket)))
    };
    let (bg, fg) = t.selected_highlight();
    let title_style = if selected {
        Style::default().bg(bg).fg(fg)
    } else if task.completed {
        Style::default().fg(t.fg_dim()).add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(t.fg())
    };
    let label_style = if task.completed {
        Style::default().fg(t.fg_dim())
    } else {
        Style::default().fg(t.bucket_color(bucket)).add_modifier(Modifier::BOLD)
    };

    // Right-align the due label when there is room for it.
    let used = 3 + task.title.chars().count() + label.chars().count() + 2;
    let pad  = width.saturating_sub(used).max(2);

    let mut lines = vec![Line::from(vec![
        Span::styled(check, check_style),
        Span::styled(task.title.as_str(), title_style),
        Span::raw(" ".repeat(pad)),
        Span::styled(format!("{label} "), label_style),
    ])];
    if let Some(desc) = &task.description {
        lines.push(Line::from(Span::styled(
            format!("    {desc}"),
            Style::default().fg(t.fg_dim()).add_modifier(Modifier::ITALIC),
        )));
    }
    ListItem::new(lines)
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let (mode_str, mode_style) = match app.ui.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(t.accent()).fg(t.bg()).add_modifier(Modifier::BOLD)),
        InputMode::Insert => (" INSERT ", Style::default().bg(t.done_color()).fg(t.bg()).add_modifier(Modifier::BOLD)),
    };
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode_str, mode_style),
        Span::styled(
            "  j/k:move  N:new  Space:done  d:del  c:completed  T:theme  ?:help  q:quit",
            Style::default().fg(t.fg_dim()),
        ),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(t.accent()).add_modifier(Modifier::ITALIC),
        ),
    ])).style(Style::default().bg(t.bg2()));
    f.render_widget(bar, area);
}

// ─── Task creation form (multi-step) ─────────────────────────────────────────

fn draw_task_form(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(60, 50, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " New Task ",
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let step = &app.ui.form_step;
    let acc  = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim  = Style::default().fg(t.fg_dim());
    let fg   = Style::default().fg(t.fg());
    let (sel_bg, sel_fg) = t.selected_highlight();
    let sel  = Style::default().bg(sel_bg).fg(sel_fg).add_modifier(Modifier::BOLD);

    let field = |active: bool, label: &'static str, value: String| {
        let prefix = if active { format!("▶ {label}") } else { format!("  {label}") };
        let cursor = if active { "█" } else { "" };
        Line::from(vec![
            Span::styled(prefix, if active { acc } else { dim }),
            Span::styled(format!("{value}{cursor}"), if active { fg } else { dim }),
        ])
    };

    let title_line = field(*step == TaskFormStep::Title, "Title *      ", app.ui.new_title.clone());
    let desc_line  = field(
        *step == TaskFormStep::Description,
        "Description  ",
        app.ui.new_description.clone(),
    );

    // ── Due date row ─────────────────────────────────────────────────────────
    let due_active = *step == TaskFormStep::DueDate;
    let now        = app.now();
    let due_instant = crate::due::start_of_day(app.ui.new_due, &Local);
    let due_label  = format!(
        "{}  ({})",
        app.ui.new_due.format("%a %b %-d, %Y"),
        format_relative(&due_instant, &now),
    );
    let due_line = Line::from(vec![
        Span::styled(if due_active { "▶ Due date     " } else { "  Due date     " }, if due_active { acc } else { dim }),
        Span::styled(due_label, if due_active { sel } else { dim }),
    ]);

    let hint = match step {
        TaskFormStep::Title       => "  Enter: next   Esc: cancel",
        TaskFormStep::Description => "  Enter: next (optional)   Shift+Tab: back",
        TaskFormStep::DueDate     => "  ↑↓ ±1 day   PgUp/PgDn ±1 week   t: today   Enter: save",
    };
    let step_num = match step {
        TaskFormStep::Title       => "Step 1 / 3 — Title",
        TaskFormStep::Description => "Step 2 / 3 — Description",
        TaskFormStep::DueDate     => "Step 3 / 3 — Due date",
    };

    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {step_num}"), dim)),
        Line::from(""),
        title_line,
        Line::from(""),
        desc_line,
        Line::from(""),
        due_line,
        Line::from(""),
        Line::from(Span::styled("─".repeat(inner.width.saturating_sub(2) as usize), dim)),
        Line::from(Span::styled(hint, dim)),
    ];
    if let Some(err) = &app.ui.form_error {
        lines.push(Line::from(Span::styled(
            format!("  ✗ {err}"),
            Style::default().fg(t.bucket_color(PriorityBucket::Overdue)),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(t.popup_bg())),
        inner,
    );
}

// ─── Help overlay ────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(68, 70, area);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .title(Title::from(Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()));

    let accent = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim    = Style::default().fg(t.fg_dim());
    let lines  = vec![
        Line::from(""),
        Line::from(Span::styled("  Navigation", accent)),
        Line::from(Span::styled("  j/k  ↓↑            Move selection", dim)),
        Line::from(Span::styled("  g / G              First / last task", dim)),
        Line::from(""),
        Line::from(Span::styled("  Tasks", accent)),
        Line::from(Span::styled("  N                  New task (title → description → due date)", dim)),
        Line::from(Span::styled("  Space / Enter      Toggle complete", dim)),
        Line::from(Span::styled("  d / Del            Delete task", dim)),
        Line::from(Span::styled("  c                  Show / hide completed", dim)),
        Line::from(""),
        Line::from(Span::styled("  Priority", accent)),
        Line::from(Span::styled("  Overdue → Today → Tomorrow → This week → Later", dim)),
        Line::from(Span::styled("  Completed tasks always sink to the bottom", dim)),
        Line::from(""),
        Line::from(Span::styled("  General", accent)),
        Line::from(Span::styled("  T                  Cycle theme", dim)),
        Line::from(Span::styled("  ?                  Toggle help", dim)),
        Line::from(Span::styled("  Esc                Cancel / back", dim)),
        Line::from(Span::styled("  q                  Quit", dim)),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(t.fg()))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn panel_block<'a>(t: &ThemeConfig, title: &'a str, focused: bool) -> Block<'a> {
    Block::default()
        .title(Title::from(Line::from(Span::styled(title, Style::default().fg(t.accent())))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(if focused { t.border_active() } else { t.border() }))
        .style(Style::default().bg(t.bg()))
}

fn centered(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ]).split(vert[1])[1]
}
