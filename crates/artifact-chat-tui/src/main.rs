use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::{Context, Result};
use clap::Parser;
use artifact_chat_core::Config;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, TokioScheduler};

#[derive(Parser)]
#[command(name = "artifact-chat")]
#[command(about = "Terminal chat with slash commands and a generated-artifact side panel")]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config dir>/artifact-chat/config.json)
    #[arg(long, env = "ARTIFACT_CHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Delay before the assistant reply, in milliseconds
    #[arg(long)]
    reply_delay_ms: Option<u64>,

    /// Delay before a generated artifact appears, in milliseconds
    #[arg(long)]
    artifact_delay_ms: Option<u64>,

    /// Write logs here (the terminal is owned by the UI, so nothing is logged otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> Config {
        let loaded = match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        };

        let mut config = loaded.unwrap_or_else(|e| {
            tracing::warn!("using default config: {:#}", e);
            Config::default()
        });

        if let Some(ms) = self.reply_delay_ms {
            config.reply_delay_ms = ms;
        }
        if let Some(ms) = self.artifact_delay_ms {
            config.artifact_delay_ms = ms;
        }
        config
    }
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_tracing(path)?;
    }

    let config = cli.load_config();
    tracing::info!(
        reply_delay_ms = config.reply_delay_ms,
        artifact_delay_ms = config.artifact_delay_ms,
        "starting artifact-chat"
    );

    // Setup terminal
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let scheduler = TokioScheduler::new(events.sender());
    let mut app = App::new(&config, scheduler);

    let result = run(&mut terminal, &mut app, &mut events).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}
