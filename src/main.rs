//! tcalc - Terminal Calculator
//!
//! Evaluates calculator expressions given on the command line, or runs an
//! interactive terminal calculator with a history of recent results.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use tcalc::application::{App, Settings, DEFAULT_ERROR_DISPLAY};
use tcalc::domain::{
    ConstantPrecision, EvaluatorConfig, ExpressionEngine, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_NESTING,
    MAX_NESTING_CEILING,
};
use tcalc::presentation::{render_ui, InputHandler};

/// How often the event loop wakes up to expire the error display.
const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "tcalc")]
#[command(about = "Terminal calculator with a safe arithmetic expression evaluator")]
#[command(version)]
struct Cli {
    /// Expressions to evaluate; starts the interactive calculator when omitted
    expressions: Vec<String>,

    /// Use full-precision π and e instead of the 10-digit constants
    #[arg(long)]
    full_precision: bool,

    /// Number of calculations kept in history
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// How long "Error" stays on screen, in milliseconds
    #[arg(long, default_value_t = DEFAULT_ERROR_DISPLAY.as_millis() as u64)]
    error_timeout_ms: u64,

    /// Maximum nesting of parentheses, function calls and negations (at most 256)
    #[arg(long, default_value_t = DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Write log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            history_limit: self.history_limit,
            error_display: Duration::from_millis(self.error_timeout_ms),
            evaluator: EvaluatorConfig {
                constant_precision: if self.full_precision {
                    ConstantPrecision::Full
                } else {
                    ConstantPrecision::Legacy
                },
                max_nesting: self.max_nesting.min(MAX_NESTING_CEILING),
            },
        }
    }
}

/// Entry point for tcalc.
///
/// # Errors
///
/// Returns an error if the log file cannot be created, if terminal setup
/// fails, or if there are issues with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let interactive = cli.expressions.is_empty();

    init_logging(cli.log_file.as_ref(), interactive)?;

    let settings = cli.settings();

    if !interactive {
        let failures = evaluate_expressions(&cli.expressions, settings.evaluator);
        if failures > 0 {
            process::exit(1);
        }
        return Ok(());
    }

    info!("starting interactive session");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(settings);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Sets up `env_logger` from `RUST_LOG` (default `warn`).
///
/// Logs go to `log_file` when given. Without one, the interactive session
/// logs nothing, since writing to stderr would corrupt the screen.
fn init_logging(log_file: Option<&PathBuf>, interactive: bool) -> io::Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        None if interactive => return Ok(()),
        None => {
            builder.target(Target::Stderr);
        }
    }

    builder.init();
    Ok(())
}

/// Prints one result per expression and returns the number that failed.
fn evaluate_expressions(expressions: &[String], config: EvaluatorConfig) -> usize {
    let engine = ExpressionEngine::new(config);
    let mut failures = 0;

    for expression in expressions {
        match engine.evaluate_to_string(expression) {
            Ok(result) => println!("{result}"),
            Err(err) => {
                eprintln!("Error: {err}");
                failures += 1;
            }
        }
    }

    failures
}

/// Main application event loop.
///
/// Renders, then waits up to [`TICK_RATE`] for a key so that an expired
/// error display is cleared even while the user is idle. Ctrl+C or Ctrl+Q
/// quits.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.expire_error(Instant::now());
        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(TICK_RATE)? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('c') | KeyCode::Char('q')
                        if key.modifiers.contains(KeyModifiers::CONTROL) =>
                    {
                        return Ok(());
                    }
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}
