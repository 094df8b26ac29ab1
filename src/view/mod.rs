//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, placement, styles)
//! - `layout`: Host player layout (player bar, playlist, mobile player)
//! - `panel`: Floating cast panel (settings, status, controls, volume)

mod utils;
mod layout;
mod panel;

use ratatui::Frame;

use crate::host::TerminalHost;
use crate::model::{QueueSnapshot, UiState};

pub use panel::PANEL_WIDTH;

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        host: &TerminalHost,
        ui_state: &UiState,
        queue: Option<&QueueSnapshot>,
        with_volume: bool,
    ) {
        // Host layout underneath
        if host.is_mobile() {
            layout::render_mobile(frame, host, ui_state, queue);
        } else {
            layout::render_desktop(frame, host, ui_state, queue);
        }

        // Cast panel floats on top when open
        if ui_state.widget_open {
            panel::render_panel(frame, ui_state, with_volume);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;
    use ratatui::Terminal;

    use super::*;
    use crate::model::{PanelPlacement, StatusLine, Track};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn queue() -> QueueSnapshot {
        QueueSnapshot {
            track_position: 0,
            queue_position: 0,
            queue: vec![Track {
                id: "t1".into(),
                name: "Opening".into(),
                album: "Debut".into(),
                artist: "Band".into(),
                duration: 185_000,
                ..Track::default()
            }],
        }
    }

    #[test]
    fn closed_widget_shows_only_host() {
        let host = TerminalHost::new(Rect::new(0, 0, 100, 30), 60);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let ui = UiState::default();
        let snapshot = queue();

        terminal
            .draw(|frame| AppView::render(frame, &host, &ui, Some(&snapshot), true))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Opening"));
        assert!(text.contains("3:05"));
        assert!(!text.contains("Settings"));
    }

    #[test]
    fn open_widget_shows_status_and_settings() {
        let host = TerminalHost::new(Rect::new(0, 0, 100, 30), 60);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut ui = UiState {
            widget_open: true,
            settings_open: true,
            placement: PanelPlacement {
                bottom: 3,
                left: 24,
                mobile: false,
            },
            ..UiState::default()
        };
        ui.status.apply(&StatusLine::error("Check your settings", "Fill in API URL"));

        terminal
            .draw(|frame| AppView::render(frame, &host, &ui, None, false))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Check your settings"));
        assert!(text.contains("Settings"));
        assert!(text.contains("Select device"));
        assert!(!text.contains("Volume"));
    }

    #[test]
    fn player_bar_shows_host_selected_track() {
        let host = TerminalHost::new(Rect::new(0, 0, 100, 30), 60);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut snapshot = queue();
        snapshot.queue.push(Track {
            id: "t2".into(),
            name: "Encore".into(),
            album: "Debut".into(),
            artist: "Band".into(),
            ..Track::default()
        });
        snapshot.queue_position = 1;

        terminal
            .draw(|frame| AppView::render(frame, &host, &UiState::default(), Some(&snapshot), true))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("♪ Encore"));
        assert!(!text.contains("♪ Opening"));
    }
}
