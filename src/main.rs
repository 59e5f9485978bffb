// algovis: array-algorithm visualizer with loop instrumentation

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eyre::{Context, Result};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use algovis::config::Config;
use algovis::logging::{self, LogTarget};
use algovis::samples::Example;
use algovis::ui::App;
use algovis::visual::{ConsolePacer, RunOutcome, RunSettings, Session};

/// Array-algorithm visualizer
#[derive(Parser, Debug)]
#[command(name = "algovis")]
#[command(about = "Step through array algorithms written in a JavaScript-like script")]
#[command(version)]
struct Args {
    /// Script to load (defaults to the bubble sort example)
    file: Option<PathBuf>,

    /// Load a bundled example instead of a file
    #[arg(long, value_enum, conflicts_with = "file")]
    example: Option<Example>,

    /// Run once and print log lines and array changes to stdout
    #[arg(long)]
    headless: bool,

    /// Do not sleep between steps in headless mode
    #[arg(long)]
    no_pause: bool,

    /// Pause after each step in milliseconds (overrides the config file)
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Config file (default: <config_dir>/algovis/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file for TUI mode (default: <temp_dir>/algovis.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    let target = if args.headless {
        match args.log_file.clone() {
            Some(path) => LogTarget::File(path),
            None => LogTarget::Stderr,
        }
    } else {
        LogTarget::File(args.log_file.clone().unwrap_or_else(logging::default_log_file))
    };
    logging::init_logging(&config.logging.level, target)?;

    let source = match (&args.file, args.example) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {:?}", path))?,
        (None, Some(example)) => example.source().to_string(),
        (None, None) => Example::BubbleSort.source().to_string(),
    };

    let mut settings = config.run_settings();
    if let Some(pause_ms) = args.pause_ms {
        settings.pause = std::time::Duration::from_millis(pause_ms);
    }

    if args.headless {
        run_headless(source, settings, !args.no_pause)
    } else {
        run_tui(source, settings, config.execution.max_frames)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn run_headless(source: String, settings: RunSettings, sleep: bool) -> Result<ExitCode> {
    info!(sleep, "headless run");
    let mut session = Session::new(ConsolePacer::new(io::stdout(), sleep), settings);
    session.set_source(source);

    match session.run() {
        RunOutcome::Completed => Ok(ExitCode::SUCCESS),
        RunOutcome::Failed(message) => {
            error!(error = %message, "headless run failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_tui(source: String, settings: RunSettings, max_frames: usize) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, settings, max_frames);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("TUI event loop failed")
}
