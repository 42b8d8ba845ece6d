use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::error;

use crate::{
    form::{Field, FormAction, TaskForm},
    kanban_board::KanbanBoard,
    storage::BoardStore,
    task::{Priority, Status, Task},
};

const HELP: &str =
    "a add  e edit  d delete  Enter/] forward  [ back  ←→↑↓/hjkl select  q quit";

#[derive(Debug)]
pub enum Mode {
    Normal,
    Form(TaskForm),
    ConfirmDelete { id: String, title: String },
}

pub struct App {
    pub board: KanbanBoard,
    pub store: BoardStore,
    pub mode: Mode,
    pub status: Option<String>,
    pub exit: bool,
}

impl App {
    pub fn new(board: KanbanBoard, store: BoardStore) -> Self {
        Self {
            board,
            store,
            mode: Mode::Normal,
            status: None,
            exit: false,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Form(form) => self.handle_form_key(form, key),
            Mode::ConfirmDelete { id, title } => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    if self.board.delete_task(&id) {
                        self.status = Some(format!("Deleted \"{title}\""));
                        self.persist();
                    }
                } else {
                    self.status = Some("Delete cancelled".to_string());
                }
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.exit = true,
            KeyCode::Char('a') => self.mode = Mode::Form(TaskForm::add()),
            KeyCode::Char('e') => {
                if let Some(task) = self.board.selected() {
                    self.mode = Mode::Form(TaskForm::edit(task));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(task) = self.board.selected() {
                    self.mode = Mode::ConfirmDelete {
                        id: task.id.clone(),
                        title: task.title.clone(),
                    };
                }
            }
            KeyCode::Enter | KeyCode::Char(']') => self.move_selected(1),
            KeyCode::Char('[') | KeyCode::Backspace => self.move_selected(-1),
            KeyCode::Left | KeyCode::Char('h') => self.board.select_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.board.select_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.board.select_task(-1),
            KeyCode::Down | KeyCode::Char('j') => self.board.select_task(1),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, mut form: TaskForm, key: KeyEvent) {
        match form.handle_key(key) {
            FormAction::None => self.mode = Mode::Form(form),
            FormAction::Cancel => {}
            FormAction::Submit => {
                if let Err(err) = self.submit(&form) {
                    form.error = Some(err.to_string());
                    self.mode = Mode::Form(form);
                }
            }
        }
    }

    fn submit(&mut self, form: &TaskForm) -> crate::error::Result<()> {
        let draft = form.to_draft()?;
        match &form.editing {
            Some(id) => {
                if self.board.update_task(id, draft)? {
                    self.status = Some("Task updated".to_string());
                    self.persist();
                }
            }
            None => {
                let id = self.board.add_task(draft)?.id.clone();
                self.board.select_id(&id);
                self.status = Some("Task added".to_string());
                self.persist();
            }
        }
        Ok(())
    }

    fn move_selected(&mut self, direction: isize) {
        if self.board.move_task(direction) {
            if let Some(task) = self.board.selected() {
                self.status = Some(format!(
                    "Moved \"{}\" to {}",
                    task.title,
                    task.status.label()
                ));
            }
            self.persist();
        }
    }

    /// Writes the whole board after every change; a failure keeps the in-memory board.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.board.tasks) {
            error!(error = %err, "failed to save board");
            self.status = Some(format!("Save failed: {err}"));
        }
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while !app.exit {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key_event(key);
            }
        }
    }
    Ok(())
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_columns(f, chunks[1], &app.board);
    render_stats(f, chunks[2], &app.board);
    render_status_line(f, chunks[3], app);

    match &app.mode {
        Mode::Normal => {}
        Mode::Form(form) => render_form(f, form),
        Mode::ConfirmDelete { title, .. } => render_confirm(f, title),
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Task Board", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(HELP, Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_columns(f: &mut Frame, area: Rect, board: &KanbanBoard) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let today = Local::now().date_naive();
    let stats = board.stats();
    for (i, status) in Status::ALL.iter().enumerate() {
        let tasks = board.get_tasks_by_status(*status);
        let focused = board.selected_status == i;
        let block = Block::default()
            .title(format!(
                " {} {} ({}) ",
                status.icon(),
                status.label(),
                stats.count(*status)
            ))
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });

        if tasks.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(status.icon()),
                Line::from(format!("No {} tasks", status.as_str())),
            ])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
            f.render_widget(empty, chunks[i]);
            continue;
        }

        let items: Vec<ListItem> = tasks.iter().map(|t| task_card(t, today)).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if focused {
            state.select(Some(board.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn task_card(task: &Task, today: NaiveDate) -> ListItem<'static> {
    let mut lines = vec![Line::from(Span::styled(
        task.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            task.description.clone(),
            Style::default().fg(Color::Gray),
        )));
    }

    let mut meta = vec![Span::styled(
        format!("{} priority", task.priority),
        priority_style(task.priority),
    )];
    if let Some(due) = task.due_date {
        let style = if task.is_overdue(today) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        meta.push(Span::raw("  "));
        meta.push(Span::styled(format!("due {}", due.format("%Y-%m-%d")), style));
    }
    lines.push(Line::from(meta));
    lines.push(Line::from(""));
    ListItem::new(Text::from(lines))
}

fn priority_style(priority: Priority) -> Style {
    let color = match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    };
    Style::default().fg(color)
}

fn render_stats(f: &mut Frame, area: Rect, board: &KanbanBoard) {
    let stats = board.stats();
    let block = Block::default().title(" Statistics ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cells = [
        (stats.total.to_string(), "Total Tasks", Color::Blue),
        (stats.done.to_string(), "Completed", Color::Green),
        (stats.in_progress.to_string(), "In Progress", Color::Yellow),
        (format!("{}%", stats.completion_rate), "Completion Rate", Color::Gray),
    ];
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, 4); 4])
        .split(inner);
    for (i, (value, label, color)) in cells.into_iter().enumerate() {
        let cell = Paragraph::new(vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(label),
        ])
        .alignment(Alignment::Center);
        f.render_widget(cell, chunks[i]);
    }
}

fn render_status_line(f: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = &app.status {
        f.render_widget(
            Paragraph::new(status.as_str()).style(Style::default().fg(Color::Cyan)),
            area,
        );
    }
}

fn render_form(f: &mut Frame, form: &TaskForm) {
    let area = centered_rect(60, 12, f.area());
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    for field in TaskForm::fields() {
        let focused = form.focus == field;
        let marker = if focused { "> " } else { "  " };
        let value = form.value(field);
        let value = if focused && field != Field::Priority {
            format!("{value}_")
        } else {
            value
        };
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{:<12}", field.label()), label_style),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    let submit_style = if form.can_submit() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(vec![
        Span::styled("Enter save", submit_style),
        Span::raw("  Esc cancel  Tab next field  ←→ priority"),
    ]));

    let form_widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!(" {} ", form.heading()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(form_widget, area);
}

fn render_confirm(f: &mut Frame, title: &str) {
    let area = centered_rect(50, 5, f.area());
    f.render_widget(Clear, area);
    let prompt = Paragraph::new(vec![
        Line::from(format!("Delete \"{title}\"?")),
        Line::from(Span::styled(
            "y confirm  any other key cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(" Delete Task ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(prompt, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
