use std::{io::Write, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::{
    error::Error,
    kanban_board::KanbanBoard,
    storage::{BoardStore, DEFAULT_FILE},
    task::{parse_due_date, Priority, Status, Task, TaskDraft},
};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Terminal task board: todo, in progress, done")]
pub struct Cli {
    /// Board file
    #[arg(long, env = "TASKBOARD_FILE", default_value = DEFAULT_FILE, global = true)]
    pub file: PathBuf,

    /// Log file (the terminal belongs to the board)
    #[arg(long, env = "TASKBOARD_LOG", default_value = "taskboard.log", global = true)]
    pub log_file: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Without a subcommand the interactive board starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a task to the todo column
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "medium", value_parser = Priority::from_str)]
        priority: Priority,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks, optionally only one status
    List {
        #[arg(short, long)]
        status: Option<Status>,
    },
    /// Move a task to another status
    Move { id: String, status: Status },
    /// Delete a task
    Delete { id: String },
    /// Show board statistics
    Stats,
}

/// Runs one non-interactive command: load, apply, save.
pub fn execute(command: Command, store: &BoardStore, out: &mut impl Write) -> Result<()> {
    let tasks = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;
    let mut board = KanbanBoard::with_tasks(tasks);

    match command {
        Command::Add {
            title,
            description,
            priority,
            due,
        } => {
            let draft = TaskDraft {
                description,
                priority,
                due_date: parse_due_date(due.as_deref().unwrap_or(""))?,
                ..TaskDraft::new(title)
            };
            let id = board.add_task(draft)?.id.clone();
            store.save(&board.tasks)?;
            writeln!(out, "added {id}")?;
        }
        Command::List { status } => {
            for status in Status::ALL
                .into_iter()
                .filter(|s| status.map_or(true, |wanted| wanted == *s))
            {
                let tasks = board.get_tasks_by_status(status);
                writeln!(out, "{} {} ({})", status.icon(), status.label(), tasks.len())?;
                for task in tasks {
                    writeln!(out, "  {}", list_line(task))?;
                }
            }
        }
        Command::Move { id, status } => {
            board.require(&id)?;
            if board.update_task_status(&id, status) {
                store.save(&board.tasks)?;
            }
            writeln!(out, "{id} -> {status}")?;
        }
        Command::Delete { id } => {
            if !board.delete_task(&id) {
                return Err(Error::TaskNotFound(id).into());
            }
            store.save(&board.tasks)?;
            writeln!(out, "deleted {id}")?;
        }
        Command::Stats => {
            let stats = board.stats();
            writeln!(out, "Total Tasks:     {}", stats.total)?;
            writeln!(out, "Todo:            {}", stats.todo)?;
            writeln!(out, "In Progress:     {}", stats.in_progress)?;
            writeln!(out, "Completed:       {}", stats.done)?;
            writeln!(out, "Completion Rate: {}%", stats.completion_rate)?;
        }
    }
    Ok(())
}

fn list_line(task: &Task) -> String {
    let mut line = format!("[{}] {} ({} priority)", task.id, task.title, task.priority);
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", due.format("%Y-%m-%d")));
    }
    if !task.description.is_empty() {
        line.push_str(&format!(" - {}", task.description));
    }
    line
}
