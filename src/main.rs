use anyhow::{Context, Result};
use routerchat_core::{Model, OpenRouterClient, Session, Settings, TranscriptStore};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();
    let _log_guard = logging::init();

    // Everything that can fail fatally happens before the terminal is taken over
    let settings = Settings::from_env()?;
    let store = TranscriptStore::new(&settings.history_path);
    let session = Session::open(store, Model::default())
        .with_context(|| format!("failed to load {}", settings.history_path.display()))?;
    let client = OpenRouterClient::new(&settings).context("failed to build HTTP client")?;

    tracing::info!(
        endpoint = client.endpoint(),
        history = %settings.history_path.display(),
        messages = session.transcript().len(),
        "starting session"
    );

    let mut app = App::new(session, client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    tracing::info!("session ended");
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
