mod bus;
mod config;
mod controller;
mod host;
mod logging;
mod model;
mod scheduler;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        DisableFocusChange, EnableFocusChange, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use parking_lot::Mutex;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use bus::EventBus;
use config::Config;
use controller::{AppController, WidgetContext};
use host::{Anchor, HostIntegration, LayoutEvent, TerminalHost};
use model::{FileStorage, PlayerClient, QueueReader, ReqwestTransport, SettingsStore, Storage, UiState};
use view::{AppView, PANEL_WIDTH};

const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {:#}", e);
            None
        }
    };
    tracing::info!(
        profile = ?config.profile,
        storage = %config.storage_path.display(),
        "Configuration loaded"
    );

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage_path));
    let settings = Arc::new(Mutex::new(SettingsStore::new(storage.clone())));
    let ui = Arc::new(Mutex::new(UiState::default()));
    let player = PlayerClient::new(Arc::new(ReqwestTransport::new()?), settings.clone());
    let queue = QueueReader::new(storage);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let host = Arc::new(TerminalHost::new(
        Rect::new(0, 0, size.width, size.height),
        config.mobile_width,
    ));
    let integration = Arc::new(HostIntegration::new(
        host.clone(),
        ui.clone(),
        config.profile,
        (PANEL_WIDTH, 0),
    ));

    let ctx = WidgetContext::new(&config, settings, ui, player, queue, EventBus::new(), integration);
    let controller = AppController::new(ctx);
    let poll_timer = controller.bind();

    let res = run_app(&mut terminal, &controller, &host).await;

    poll_timer.cancel();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Cast Widget shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &AppController,
    host: &TerminalHost,
) -> io::Result<()> {
    let ctx = controller.context();
    let with_volume = ctx.profile.has_volume();
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

    loop {
        let snapshot = ctx.queue.get_queue().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Host queue not readable for display");
            None
        });
        let ui_state = ctx.ui.lock().clone();

        terminal.draw(|f| {
            AppView::render(f, host, &ui_state, snapshot.as_ref(), with_volume);
        })?;

        if controller.should_quit() {
            break;
        }

        tokio::select! {
            _ = redraw.tick() => {}
            event = events.next() => match event {
                Some(Ok(event)) => handle_event(controller, host, event).await,
                Some(Err(e)) => return Err(e),
                None => break,
            },
        }
    }

    Ok(())
}

async fn handle_event(controller: &AppController, host: &TerminalHost, event: Event) {
    let integration = &controller.context().host;
    match event {
        Event::Key(key) => {
            if handle_host_key(controller, host, key) {
                return;
            }
            if let Err(e) = controller.handle_key_event(key).await {
                tracing::warn!(error = %e, "Key handling failed");
            }
        }
        Event::Resize(width, height) => {
            let was_mobile = host.is_mobile();
            host.resize(Rect::new(0, 0, width, height));
            if host.is_mobile() != was_mobile {
                let anchor = if host.is_mobile() { Anchor::MobilePlayer } else { Anchor::PlayerPanel };
                integration.on_node_added(anchor.marker());
            }
            // Startup may have happened in a terminal too small for the layout
            integration.attach();
            integration.on_layout_event(LayoutEvent::Resize);
        }
        Event::FocusLost => controller.set_host_hidden(true),
        Event::FocusGained => controller.set_host_hidden(false),
        _ => {}
    }
}

/// Keys owned by the host layout. Returns whether the key was consumed.
fn handle_host_key(controller: &AppController, host: &TerminalHost, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    let typing = {
        let ui = controller.context().ui.lock();
        ui.widget_open && ui.focus.is_text_input()
    };
    if typing {
        return false;
    }

    match key.code {
        KeyCode::Char('l') | KeyCode::Char('L') => {
            let open = host.toggle_playlist();
            tracing::debug!(open, "Host playlist toggled");
            controller.context().host.on_layout_event(LayoutEvent::TransitionEnd);
            true
        }
        _ => false,
    }
}
