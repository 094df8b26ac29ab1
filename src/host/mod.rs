//! Host integration - anchoring the widget inside the host player layout
//!
//! The host exposes a handful of marker-tagged anchors. Their absence is never
//! an error: the widget simply does nothing until the anchor appears and the
//! host reports it through `on_node_added`.

mod terminal;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ratatui::layout::Rect;

use crate::config::Profile;
use crate::model::{PanelPlacement, SharedUi};

pub use terminal::TerminalHost;

/// Host elements the widget anchors to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    PlayerPanel,
    MobilePlayer,
    Playlist,
    LyricsButton,
}

impl Anchor {
    pub fn marker(self) -> &'static str {
        match self {
            Anchor::PlayerPanel => "music-player-panel",
            Anchor::MobilePlayer => "react-jinke-music-player-mobile",
            Anchor::Playlist => "audio-lists-panel",
            Anchor::LyricsButton => "lyric-btn",
        }
    }
}

/// Layout notifications that trigger a reposition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutEvent {
    TransitionEnd,
    AnimationEnd,
    Resize,
}

pub trait HostPage: Send + Sync {
    fn find(&self, anchor: Anchor) -> Option<Rect>;

    fn has_toggle_button(&self) -> bool;

    /// Place the toggle button next to the lyrics button, or as a menu item in the mobile player.
    fn insert_toggle_button(&self, mobile: bool);

    /// Stop whatever the host itself is playing so the remote device takes over.
    fn pause_local_audio(&self);
}

pub struct HostIntegration {
    host: Arc<dyn HostPage>,
    ui: SharedUi,
    profile: Profile,
    widget_size: (u16, u16),
    playlist_listeners: AtomicBool,
    resize_listener: AtomicBool,
}

impl HostIntegration {
    pub fn new(host: Arc<dyn HostPage>, ui: SharedUi, profile: Profile, widget_size: (u16, u16)) -> Self {
        Self {
            host,
            ui,
            profile,
            widget_size,
            playlist_listeners: AtomicBool::new(false),
            resize_listener: AtomicBool::new(false),
        }
    }

    /// Bind right away when the host layout is already rendered.
    pub fn attach(&self) {
        if self.host.find(Anchor::LyricsButton).is_some() {
            self.bind();
        } else {
            tracing::debug!("Host anchors not ready, waiting for layout");
        }
    }

    /// Host reported a newly rendered element.
    pub fn on_node_added(&self, marker: &str) {
        if marker == Anchor::PlayerPanel.marker() || marker == Anchor::MobilePlayer.marker() {
            self.bind();
        }
    }

    pub fn on_layout_event(&self, event: LayoutEvent) {
        let listening = match event {
            LayoutEvent::TransitionEnd | LayoutEvent::AnimationEnd => self.playlist_listeners.load(Ordering::SeqCst),
            LayoutEvent::Resize => self.resize_listener.load(Ordering::SeqCst),
        };
        if listening {
            self.reposition();
        }
    }

    /// Toggle button click.
    pub fn toggle_widget(&self) {
        {
            let mut ui = self.ui.lock();
            ui.widget_open = !ui.widget_open;
            tracing::debug!(open = ui.widget_open, "Widget toggled");
        }
        self.reposition();
    }

    pub fn pause_local_audio(&self) {
        self.host.pause_local_audio();
    }

    fn bind(&self) {
        if self.host.has_toggle_button() {
            return;
        }
        if self.host.find(Anchor::LyricsButton).is_none() {
            return;
        }

        let mobile = self.host.find(Anchor::MobilePlayer).is_some();
        self.host.insert_toggle_button(mobile);
        self.ui.lock().toggle_button_installed = true;
        self.reposition();

        if self.host.find(Anchor::Playlist).is_some() {
            self.playlist_listeners.store(true, Ordering::SeqCst);
        }
        self.resize_listener.store(true, Ordering::SeqCst);
        tracing::info!(mobile, "Widget attached to host layout");
    }

    pub fn reposition(&self) {
        let placement = if let Some(player) = self.host.find(Anchor::PlayerPanel) {
            let (widget_width, _) = self.widget_size;
            let right_edge = self
                .host
                .find(Anchor::Playlist)
                .map(|playlist| playlist.x)
                .unwrap_or(player.x + player.width);
            Some(PanelPlacement {
                bottom: player.height,
                left: right_edge.saturating_sub(widget_width),
                mobile: false,
            })
        } else if self.host.find(Anchor::MobilePlayer).is_some() && self.profile.has_mobile_layout() {
            Some(PanelPlacement {
                bottom: 0,
                left: 0,
                mobile: true,
            })
        } else {
            None
        };

        if let Some(placement) = placement {
            self.ui.lock().placement = placement;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeHost;
    use super::*;
    use crate::model::UiState;
    use parking_lot::Mutex;

    fn integration(host: Arc<FakeHost>, profile: Profile) -> (HostIntegration, SharedUi) {
        let ui: SharedUi = Arc::new(Mutex::new(UiState::default()));
        (HostIntegration::new(host, ui.clone(), profile, (30, 12)), ui)
    }

    #[test]
    fn attach_places_widget_left_of_playlist_above_player() {
        let host = FakeHost::desktop();
        let (integration, ui) = integration(host.clone(), Profile::Extended);

        integration.attach();

        assert_eq!(*host.toggle_inserted.lock(), vec![false]);
        let ui = ui.lock();
        assert!(ui.toggle_button_installed);
        assert_eq!(ui.placement, PanelPlacement { bottom: 3, left: 50, mobile: false });
    }

    #[test]
    fn binding_is_idempotent() {
        let host = FakeHost::desktop();
        let (integration, _) = integration(host.clone(), Profile::Extended);

        integration.attach();
        integration.on_node_added(Anchor::PlayerPanel.marker());
        integration.on_node_added(Anchor::MobilePlayer.marker());

        assert_eq!(host.toggle_inserted.lock().len(), 1);
    }

    #[test]
    fn missing_anchor_defers_until_player_appears() {
        let host = Arc::new(FakeHost::default());
        let (integration, ui) = integration(host.clone(), Profile::Extended);

        integration.attach();
        assert!(host.toggle_inserted.lock().is_empty());

        integration.on_node_added("some-unrelated-panel");
        assert!(host.toggle_inserted.lock().is_empty());

        host.set(Anchor::MobilePlayer, Some(Rect::new(0, 0, 40, 20)));
        host.set(Anchor::LyricsButton, Some(Rect::new(1, 1, 3, 1)));
        integration.on_node_added(Anchor::MobilePlayer.marker());

        assert_eq!(*host.toggle_inserted.lock(), vec![true]);
        assert!(ui.lock().placement.mobile);
    }

    #[test]
    fn basic_profile_never_switches_to_mobile_layout() {
        let host = Arc::new(FakeHost::default());
        host.set(Anchor::MobilePlayer, Some(Rect::new(0, 0, 40, 20)));
        host.set(Anchor::LyricsButton, Some(Rect::new(1, 1, 3, 1)));
        let (integration, ui) = integration(host, Profile::Basic);

        integration.attach();
        assert!(!ui.lock().placement.mobile);
    }

    #[test]
    fn layout_events_reposition_only_after_binding() {
        let host = FakeHost::desktop();
        let (integration, ui) = integration(host.clone(), Profile::Extended);

        host.set(Anchor::Playlist, Some(Rect::new(60, 0, 60, 37)));
        integration.on_layout_event(LayoutEvent::Resize);
        assert_eq!(ui.lock().placement, PanelPlacement::default());

        integration.attach();
        assert_eq!(ui.lock().placement.left, 30);

        host.set(Anchor::Playlist, Some(Rect::new(90, 0, 30, 37)));
        integration.on_layout_event(LayoutEvent::TransitionEnd);
        assert_eq!(ui.lock().placement.left, 60);
    }

    #[test]
    fn toggle_flips_visibility() {
        let host = FakeHost::desktop();
        let (integration, ui) = integration(host, Profile::Extended);

        integration.toggle_widget();
        assert!(ui.lock().widget_open);
        integration.toggle_widget();
        assert!(!ui.lock().widget_open);
    }
}
