//! Social story storybook TUI application.
//!
//! Generates a social story for a child and shows it one page at a time,
//! optionally read aloud by an external speech program.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for scripting:
//!
//! ```bash
//! cargo run -p story -- --headless --scenario dentist --age 7 --name Maya
//! ```

mod app;
mod events;
mod headless;
mod ui;

use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use story_core::headless::HeadlessConfig;
use story_core::params::{parse_age, ParamsError};
use story_core::{
    CommandNarrator, GenerationParameters, LanguageLevel, Narrator, Scenario, SilentNarrator,
    StoryConfig, StorySession,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

/// Errors from reading the command line.
#[derive(Debug, thiserror::Error, PartialEq)]
enum CliError {
    #[error("Unknown option: {0}")]
    UnknownFlag(String),

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Command line options.
#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    params: GenerationParameters,
    open_latest: bool,
    headless: bool,
    help: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if cli.help {
        print_help();
        return Ok(());
    }

    let config = StoryConfig::from_env();
    init_logging(&config, cli.headless)?;

    let headless_config = HeadlessConfig::new(cli.params.clone()).with_open_latest(cli.open_latest);

    if cli.headless {
        return headless::run_headless(&config, headless_config)
            .await
            .map_err(|e| e.into());
    }

    let session = match StorySession::from_config(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open story session: {e}");
            std::process::exit(1);
        }
    };

    let (finished_tx, finished_rx) = mpsc::unbounded_channel();
    let narrator: Box<dyn Narrator> = match &config.speech_program {
        Some(program) => Box::new(CommandNarrator::new(program.clone(), finished_tx)),
        None => Box::new(SilentNarrator),
    };

    let mut app = App::new(session, narrator, finished_rx, headless_config);
    app.start();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Set up tracing.
///
/// The TUI owns the terminal, so it logs to a file in the data directory.
/// Headless mode logs to stderr, leaving stdout to the protocol.
fn init_logging(config: &StoryConfig, headless: bool) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        fs::create_dir_all(&config.data_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Render
        terminal.draw(|f| render(f, &app))?;

        // Process any pending session action (generation, save, export, ...)
        if let Some(action) = app.take_pending() {
            app.set_status(action.progress_message());
            terminal.draw(|f| render(f, &app))?;
            app.run_action(action).await;
        }

        // Narration completions and the auto-advance timer
        app.drain_narration();
        app.tick(Instant::now());

        // Poll for events with a short timeout so the timer stays responsive
        if event::poll(Duration::from_millis(50))? {
            let ev = event::read()?;
            if handle_event(&mut app, ev) == EventResult::Quit {
                return Ok(());
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Parse command line arguments. The first element is the program name.
fn parse_args(args: &[String]) -> Result<CliArgs, CliError> {
    let mut scenario = Scenario::School;
    let mut age = 5;
    let mut level = LanguageLevel::Simple;
    let mut name = None;
    let mut context = None;
    let mut concerns = None;
    let mut open_latest = false;
    let mut headless = false;
    let mut help = false;

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--scenario", Some(v)) => {
                scenario = Scenario::parse(v);
                i += 1;
            }
            ("--age", Some(v)) => {
                age = parse_age(v)?;
                i += 1;
            }
            ("--level", Some(v)) => {
                level = v.parse()?;
                i += 1;
            }
            ("--name", Some(v)) => {
                name = Some(v.clone());
                i += 1;
            }
            ("--context", Some(v)) => {
                context = Some(v.clone());
                i += 1;
            }
            ("--concerns", Some(v)) => {
                concerns = Some(v.clone());
                i += 1;
            }
            ("--latest", _) => open_latest = true,
            ("--headless", _) => headless = true,
            ("-h" | "--help", _) => help = true,
            (
                flag @ ("--scenario" | "--age" | "--level" | "--name" | "--context" | "--concerns"),
                None,
            ) => return Err(CliError::MissingValue(flag.to_string())),
            (other, _) => return Err(CliError::UnknownFlag(other.to_string())),
        }
        i += 1;
    }

    let mut params = GenerationParameters::new(scenario, age, level);
    if let Some(name) = name {
        params = params.with_child_name(name);
    }
    if let Some(context) = context {
        params = params.with_context(context);
    }
    if let Some(concerns) = concerns {
        params = params.with_concerns(concerns);
    }

    Ok(CliArgs {
        params,
        open_latest,
        headless,
        help,
    })
}

fn print_help() {
    println!("Social Story - personalized, narrated social stories");
    println!();
    println!("USAGE:");
    println!("  social-story [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help             Show this help message");
    println!("  --headless             Run in headless mode (text-only, no TUI)");
    println!("  --scenario <SCENARIO>  Story scenario (default: school)");
    println!("  --age <AGE>            Child's age, 3-18 (default: 5)");
    println!("  --level <LEVEL>        simple, intermediate or advanced (default: simple)");
    println!("  --name <NAME>          Child's name");
    println!("  --context <TEXT>       Additional context for the story");
    println!("  --concerns <TEXT>      Specific concerns or goals");
    println!("  --latest               Open the most recent saved story");
    println!();
    println!("SCENARIOS:");
    let scenarios: Vec<String> = Scenario::ALL.iter().map(|s| s.key().to_string()).collect();
    println!("  {}", scenarios.join(", "));
    println!();
    println!("ENVIRONMENT:");
    println!("  OPENAI_API_KEY          API key (otherwise a saved key or demo stories)");
    println!("  OPENAI_BASE_URL         OpenAI-compatible endpoint");
    println!("  SOCIAL_STORY_MODEL      Model name (default: gpt-4o-mini)");
    println!("  SOCIAL_STORY_DATA_DIR   History, key and log directory (default: .social-story)");
    println!("  SOCIAL_STORY_TTS        Speech program for narration, e.g. espeak");
    println!();
    println!("EXAMPLES:");
    println!("  social-story                                   # Interactive TUI mode");
    println!("  social-story --scenario doctor --name Sam      # Story about a doctor visit");
    println!("  social-story --headless --latest               # Reopen the last story headless");
}
