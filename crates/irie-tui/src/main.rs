//! IrieSphere TUI entry point.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use irie_client::Session;
use irie_core::ChatConfig;
use irie_tui::{App, Runtime, SystemEnv, TerminalDriver, ui};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// IrieSphere terminal chat client
#[derive(Parser, Debug)]
#[command(name = "irie-tui")]
#[command(about = "Terminal client for IrieSphere chat")]
#[command(version)]
struct Args {
    /// Backend base URL
    #[arg(long, env = "IRIE_SERVER", default_value = "http://localhost:8080")]
    server: String,

    /// Chat websocket URL
    ///
    /// Defaults to the server URL with a ws scheme and /ws path.
    #[arg(long, env = "IRIE_WS")]
    ws: Option<String>,

    /// Account username
    #[arg(short, long, env = "IRIE_USERNAME")]
    username: String,

    /// Account password
    #[arg(short, long, env = "IRIE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Write logs to this file; without it logging is off, keeping the
    /// terminal clean for the UI
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level filter when --log-file is set
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Websocket URL for a backend base URL: swap the scheme, append `/ws`.
fn derive_ws_url(server: &str) -> String {
    let trimmed = server.trim_end_matches('/');
    let authority = if let Some(rest) = trimmed.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{trimmed}")
    };
    format!("{authority}/ws")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = std::fs::File::create(path)?;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
            .with(filter)
            .init();
    }

    let session = Session::new(&args.server)?;
    session.login(&args.username, &args.password).await?;
    let friends = session.friends().await?;
    tracing::info!(friends = friends.len(), "logged in");

    let cookie = session.cookie_header().ok_or("login did not produce a session cookie")?;
    let ws_url = args.ws.clone().unwrap_or_else(|| derive_ws_url(&args.server));
    tracing::info!(%ws_url, "connecting chat socket");

    let driver = TerminalDriver::new(ws_url, cookie)?;
    let mut app = App::new(SystemEnv::new(), ChatConfig::default(), friends);
    let (_cols, rows) = crossterm::terminal::size()?;
    app.set_chat_height(ui::chat_rows(rows));

    Runtime::new(driver, app).run().await?;
    Ok(())
}
