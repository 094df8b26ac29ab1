//! Terminal rendition of the host player layout
//!
//! A player bar runs along the bottom and a collapsible playlist panel sits on the
//! right. Narrow terminals get the mobile player instead, which covers the screen.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use ratatui::layout::Rect;

use super::{Anchor, HostPage};

pub const PLAYER_HEIGHT: u16 = 3;
const LYRICS_BUTTON_WIDTH: u16 = 5;

pub struct TerminalHost {
    area: Mutex<Rect>,
    mobile_width: u16,
    playlist_open: AtomicBool,
    toggle_installed: AtomicBool,
}

impl TerminalHost {
    pub fn new(area: Rect, mobile_width: u16) -> Self {
        Self {
            area: Mutex::new(area),
            mobile_width,
            playlist_open: AtomicBool::new(true),
            toggle_installed: AtomicBool::new(false),
        }
    }

    pub fn resize(&self, area: Rect) {
        *self.area.lock() = area;
    }

    pub fn area(&self) -> Rect {
        *self.area.lock()
    }

    pub fn is_mobile(&self) -> bool {
        self.area().width < self.mobile_width
    }

    pub fn toggle_playlist(&self) -> bool {
        !self.playlist_open.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_playlist_open(&self) -> bool {
        self.playlist_open.load(Ordering::SeqCst)
    }

    pub fn player_bar(&self) -> Rect {
        let area = self.area();
        let height = PLAYER_HEIGHT.min(area.height);
        Rect::new(area.x, area.y + area.height - height, area.width, height)
    }

    pub fn playlist_panel(&self) -> Rect {
        let area = self.area();
        let width = (area.width * 2) / 5;
        let height = area.height.saturating_sub(PLAYER_HEIGHT);
        Rect::new(area.x + area.width - width, area.y, width, height)
    }

    pub fn lyrics_button(&self) -> Rect {
        let bar = self.player_bar();
        let x = (bar.x + bar.width).saturating_sub(LYRICS_BUTTON_WIDTH * 2 + 1);
        Rect::new(x, bar.y + bar.height / 2, LYRICS_BUTTON_WIDTH, 1)
    }

    /// Where the toggle button sits once inserted, right after the lyrics button.
    pub fn toggle_button(&self) -> Option<Rect> {
        if !self.has_toggle_button() {
            return None;
        }
        let lyrics = self.lyrics_button();
        Some(Rect::new(lyrics.x + lyrics.width, lyrics.y, LYRICS_BUTTON_WIDTH, 1))
    }
}

impl HostPage for TerminalHost {
    fn find(&self, anchor: Anchor) -> Option<Rect> {
        let area = self.area();
        if area.width == 0 || area.height <= PLAYER_HEIGHT {
            return None;
        }
        let mobile = self.is_mobile();
        match anchor {
            Anchor::PlayerPanel if !mobile => Some(self.player_bar()),
            Anchor::MobilePlayer if mobile => Some(area),
            Anchor::Playlist if !mobile && self.is_playlist_open() => Some(self.playlist_panel()),
            Anchor::LyricsButton => Some(self.lyrics_button()),
            _ => None,
        }
    }

    fn has_toggle_button(&self) -> bool {
        self.toggle_installed.load(Ordering::SeqCst)
    }

    fn insert_toggle_button(&self, mobile: bool) {
        self.toggle_installed.store(true, Ordering::SeqCst);
        tracing::debug!(mobile, "Toggle button inserted into host");
    }

    fn pause_local_audio(&self) {
        // The terminal host has no audio element of its own.
        tracing::debug!("Host local playback paused");
    }
}
