use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};

use falana_core::{BackendClient, Config};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "falana")]
#[command(version, about = "Terminal chat client for the Falana AI backend")]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, env = "FALANA_BASE_URL")]
    base_url: Option<String>,

    /// Where to write logs [default: <cache dir>/falana/falana.log]
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_path) = cli.log_file.clone().or_else(logging::default_log_path) {
        logging::init(&log_path)?;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "ignoring config file");
            Config::new()
        }
    };
    let base_url = cli
        .base_url
        .unwrap_or_else(|| config.base_url_or_default().to_string());

    let backend = BackendClient::new(&base_url).with_timeouts(config.timeouts());
    info!(base_url = backend.base_url(), timeouts = ?backend.timeouts(), "starting");

    let mut app = App::new(Arc::new(backend), &base_url).await;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(err) = &result {
        error!(error = %err, "exiting with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event).await?;
        app.poll_send().await;
    }

    Ok(())
}
