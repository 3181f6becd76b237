mod cli;
mod config;
mod logging;
mod report;
mod runtime;
mod ui;

use crate::cli::{Args, Command};
use crate::config::{load_config, Settings};
use crate::logging::init_tracing;
use crate::runtime::{reset_session, spawn_dispatcher, spawn_session_reset, UiCommand, UiEvent};
use crate::ui::{draw_ui, handle_key_event, restore_terminal, setup_terminal, AppState};
use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event};
use hipoteca_client::{ApiClient, ChatController, ClientSession, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _file_guard = init_tracing(&args.log_dir, args.log_to_stderr)?;

    let file_config = load_config(&args.config)?;
    let settings = Settings::resolve(args.base_url.clone(), args.state_dir.clone(), file_config);
    let api = ApiClient::new(&settings.base_url)
        .with_context(|| format!("invalid backend url {}", settings.base_url))?;
    tracing::info!(base_url = api.base_url(), "backend configured");

    let store = SessionStore::new(&settings.state_dir);
    if args.new_session {
        store
            .clear()
            .with_context(|| format!("failed to clear session in {}", store.dir().display()))?;
    }
    let session_id = store
        .load_or_create()
        .with_context(|| format!("failed to load session from {}", store.dir().display()))?;
    let chat = ChatController::new(ClientSession::new(session_id.clone()), settings.chat.clone());

    match args.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let api = Arc::new(api);
            if settings.reset_on_start {
                spawn_session_reset(Arc::clone(&api), session_id);
            }
            run_tui(api, chat).await
        }
        Command::Analyze(analyze) => {
            if settings.reset_on_start {
                reset_session(&api, &session_id).await;
            }
            let mut chat = chat;
            report::run_analyze(&api, &mut chat, &analyze).await
        }
        Command::Search(search) => report::run_search(&api, &search).await,
        Command::Health => report::run_health(&api).await,
    }
}

async fn run_tui(api: Arc<ApiClient>, chat: ChatController) -> anyhow::Result<()> {
    let (ui_tx, mut ui_rx) = mpsc::channel::<UiEvent>(128);
    let (cmd_tx, cmd_rx) = mpsc::channel::<UiCommand>(32);
    let dispatcher = spawn_dispatcher(Arc::clone(&api), cmd_rx, ui_tx);
    if cmd_tx.try_send(UiCommand::CheckHealth).is_err() {
        tracing::warn!("failed to queue initial health check");
    }

    let mut terminal = setup_terminal()?;
    let mut app = AppState::new(api.base_url(), chat);

    let tick_rate = Duration::from_millis(100);
    let outcome: anyhow::Result<()> = loop {
        while let Ok(event) = ui_rx.try_recv() {
            app.handle_event(event);
        }

        if let Err(err) = terminal.draw(|frame| draw_ui(frame, &mut app)) {
            break Err(err.into());
        }

        match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if handle_key_event(key, &mut app, &cmd_tx) {
                        break Ok(());
                    }
                }
                Ok(_) => {}
                Err(err) => break Err(err.into()),
            },
            Ok(false) => {}
            Err(err) => break Err(err.into()),
        }
    };

    restore_terminal(&mut terminal)?;
    dispatcher.abort();
    outcome
}
