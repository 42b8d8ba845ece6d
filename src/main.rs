mod cli;
mod error;
mod form;
mod kanban_board;
mod stats;
mod storage;
mod task;
mod ui;

use std::{io, path::Path};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::EnvFilter;

use crate::{cli::Cli, kanban_board::KanbanBoard, storage::BoardStore, ui::App};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli)?;

    let store = BoardStore::new(&cli.file);
    if let Some(command) = cli.command {
        return cli::execute(command, &store, &mut io::stdout().lock());
    }

    // Load before taking over the terminal so a bad board file is reported plainly.
    let tasks = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;
    info!(path = %store.path().display(), count = tasks.len(), "starting board");
    let mut app = App::new(KanbanBoard::with_tasks(tasks), store);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("board closed");
    result
}

fn init_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let default_filter = if cli.verbose {
        "taskboard=debug,info"
    } else {
        "taskboard=info,warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid RUST_LOG filter")?;

    let dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = cli
        .log_file
        .file_name()
        .context("log file path has no file name")?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("opening log file {}", cli.log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install logger: {err}"))?;
    Ok(guard)
}
