//! DeepSearch TUI Entry Point
//!
//! Launches the terminal UI for progressive search results.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (backend at http://localhost:8001)
//! deepsearch
//!
//! # Different backend, slower reveal
//! deepsearch --api-url http://search.internal:8001 --char-delay-ms 25
//!
//! # Verbose logging (logs go to a file, the terminal belongs to the UI)
//! RUST_LOG=debug deepsearch --log-file /tmp/deepsearch.log
//! ```

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use deepsearch_tui::App;
use reveal_core::{
    default_config_path, load_config_from_path, ConfigOverrides, HttpResultFetcher, RevealConfig,
};

/// DeepSearch - progressive search results in the terminal
#[derive(Parser, Debug)]
#[command(name = "deepsearch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search backend base URL
    #[arg(short = 'a', long, value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "DEEPSEARCH_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Delay between revealed characters of prose sections
    #[arg(long, value_name = "MS")]
    char_delay_ms: Option<u64>,

    /// Delay between revealed characters of list items
    #[arg(long, value_name = "MS")]
    list_delay_ms: Option<u64>,

    /// Log file (logging is off without one)
    #[arg(long, env = "DEEPSEARCH_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "DEEPSEARCH_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(ref path) = args.log_file {
        init_logging(path, &args.log_level)?;
    }

    let config = load(&args)?;
    tracing::info!(
        api = %config.api_base_url,
        source = ?config.source(),
        char_delay_ms = config.reveal.char_delay.as_millis() as u64,
        list_delay_ms = config.reveal.list_item_char_delay.as_millis() as u64,
        "starting deepsearch"
    );
    let fetcher =
        HttpResultFetcher::from_config(&config).context("failed to build search client")?;

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: deepsearch requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  • Running in a non-interactive environment (CI, container)");
        eprintln!("  • SSH without -t flag");
        eprintln!("  • Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::new(&config, Arc::new(fetcher));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

/// Load configuration: file, then environment, then command line
fn load(args: &Args) -> Result<RevealConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = args.api_url {
        overrides = overrides.with_api_base_url(url.clone());
    }
    if let Some(ms) = args.char_delay_ms {
        overrides = overrides.with_char_delay_ms(ms);
    }
    if let Some(ms) = args.list_delay_ms {
        overrides = overrides.with_list_item_char_delay_ms(ms);
    }
    overrides.apply(&mut config);

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Initialize logging to `path` with the specified level
fn init_logging(path: &Path, level: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "deepsearch={level},deepsearch_tui={level},reveal_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}
