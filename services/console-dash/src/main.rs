// services/console-dash/src/main.rs
//
// Terminal operations console for the OmniRoute routing backend
//
// Run with: cargo run --bin console-dash -- --demo

use std::fs::OpenOptions;
use std::io::stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console_dash::app;
use console_dash::config::{load_config, ConsoleConfig};
use console_dash::dashboard::Dashboard;
use console_dash::events::EventsFeed;
use console_dash::mock::MockBackend;
use svckit::{HttpClient, LogisticsApi};

#[derive(Parser, Debug)]
#[command(name = "console-dash")]
#[command(about = "Terminal operations console for multimodal route planning")]
#[command(version = "0.1.0")]
struct Args {
    /// Configuration file (optional, YAML)
    #[arg(long, short, default_value = "config/console-dash.yaml")]
    config: String,

    /// REST base URL, overrides configuration and OMNIROUTE_API_BASE
    #[arg(long)]
    api_url: Option<String>,

    /// Events polling period in seconds
    #[arg(long)]
    poll_secs: Option<u64>,

    /// Maximum number of events requested per poll
    #[arg(long)]
    events_limit: Option<u32>,

    /// Run against an in-process simulated backend
    #[arg(long, short)]
    demo: bool,
}

fn apply_args(config: &mut ConsoleConfig, args: &Args) {
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(secs) = args.poll_secs {
        config.feed.poll_secs = secs;
    }
    if let Some(limit) = args.events_limit {
        config.feed.limit = limit;
    }
}

fn init_tracing(config: &ConsoleConfig) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.observability.log_file)
        .with_context(|| format!("opening log file {}", config.observability.log_file))?;

    let default_filter = format!("console_dash={0},svckit={0}", config.observability.log_level);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    apply_args(&mut config, &args);
    init_tracing(&config)?;

    let api: Arc<dyn LogisticsApi> = if args.demo {
        info!("Starting console in DEMO mode");
        Arc::new(MockBackend::new())
    } else {
        let client = HttpClient::new(&config.api)?;
        info!("Starting console against {}", client.base_url());
        Arc::new(client)
    };

    let events = EventsFeed::new(api.clone(), &config.feed);
    let dashboard = Dashboard::new(api, events);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = app::run(&mut terminal, dashboard, args.demo).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
