mod alarm;
mod app;
mod error;
mod timer;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    app::{AppState, POLL_RATE},
    timer::{SessionConfig, Timer},
};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(author, version, about = "🍅 pomodoro - A terminal Pomodoro timer")]
struct Args {
    /// Work session length in minutes
    #[arg(short, long, allow_negative_numbers = true)]
    work: Option<i64>,
    /// Short break length in minutes
    #[arg(short, long, allow_negative_numbers = true)]
    short_break: Option<i64>,
    /// Long break length in minutes
    #[arg(short, long, allow_negative_numbers = true)]
    long_break: Option<i64>,
    /// Work sessions before a long break
    #[arg(short, long, allow_negative_numbers = true)]
    cycles: Option<i64>,
    /// Do not play a sound when an interval ends
    #[arg(long)]
    no_sound: bool,
    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn build_timer(args: &Args) -> Result<Timer> {
    let mut timer = Timer::new(SessionConfig::default(), alarm::from_flag(args.no_sound));
    let defaults = *timer.config();
    if args.work.is_some() || args.short_break.is_some() || args.long_break.is_some() || args.cycles.is_some() {
        timer.update_config(
            args.work.unwrap_or(i64::from(defaults.work_minutes())),
            args.short_break.unwrap_or(i64::from(defaults.short_break_minutes())),
            args.long_break.unwrap_or(i64::from(defaults.long_break_minutes())),
            args.cycles.unwrap_or(i64::from(defaults.cycles_before_long())),
        )?;
    }
    Ok(timer)
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    if let Err(e) = try_main() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let timer = build_timer(&args)?;
    let mut app = AppState::new(timer, Instant::now());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    log::info!("timer started");
    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render_ui(f, app))?;

        let timeout = POLL_RATE.min(app.ticker.until_next(Instant::now()));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app::handle_input(key, app, Instant::now()) {
                    log::info!("quit with {} completed sessions", app.timer.completed_sessions());
                    return Ok(());
                }
            }
        }

        app.update(Instant::now());
    }
}
