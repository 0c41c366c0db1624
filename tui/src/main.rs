//! DSTL Chat Entry Point
//!
//! Launches the terminal UI against the conversation service.
//!
//! Usage:
//!   dstl-chat [OPTIONS]
//!
//! Options:
//!   --url <URL>             Conversation service base URL
//!   --timeout-secs <SECS>   Per-request timeout (0 disables it)
//!   --config <PATH>         Config file (default: ~/.config/dstl-chat/config.toml)
//!   --log-file <PATH>       Log file (default: <tmp>/dstl-chat.log)

use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dstl_chat_core::{load_config, ConfigOverrides, ConfigSource, HttpBackend};
use dstl_chat_tui::App;

/// Terminal client for the DSTL chat service
#[derive(Parser, Debug)]
#[command(name = "dstl-chat", version, about)]
struct Args {
    /// Conversation service base URL
    #[arg(long)]
    url: Option<String>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, env = "DSTL_CHAT_LOG")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to a file; stdout belongs to the terminal UI
    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("dstl-chat.log"));
    let log_file = File::create(&log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dstl_chat_tui=info,dstl_chat_core=info")),
        )
        .init();

    let overrides = ConfigOverrides {
        base_url: args.url,
        timeout_secs: args.timeout_secs,
        config_path: args.config,
    };
    let (config, source) = load_config(&overrides)?;
    match &source {
        ConfigSource::Defaults => info!("No config file, using defaults"),
        ConfigSource::File(path) => info!(path = %path.display(), "Loaded config"),
    }
    info!(url = %config.base_url, timeout = ?config.request_timeout, "Starting DSTL Chat");
    let backend = HttpBackend::new(&config)?;

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: dstl-chat requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means stdin or stdout is piped, or SSH ran without -t.");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let mut app = App::new(Arc::new(backend));
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("DSTL Chat exited");
    result
}
