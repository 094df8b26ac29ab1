//! Status view binding and the now-playing poller

use crate::model::{PlayState, StatusLine};
use crate::scheduler::TimerHandle;

use super::WidgetContext;

#[derive(Clone)]
pub struct StatusPoller {
    ctx: WidgetContext,
}

impl StatusPoller {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }

    /// Route status updates into the panel and start polling.
    pub fn bind(&self) -> TimerHandle {
        let ui = self.ctx.ui.clone();
        self.ctx.bus.subscribe_status(move |status| {
            ui.lock().status.apply(status);
        });

        let poller = self.clone();
        self.ctx.scheduler.every(self.ctx.poll_interval, move || {
            let poller = poller.clone();
            async move {
                poller.tick().await;
            }
        })
    }

    /// One poll. Returns whether the remote API was asked.
    pub async fn tick(&self) -> bool {
        let device = {
            let settings = self.ctx.settings.lock();
            if !settings.is_ready() {
                return false;
            }
            settings.device_selected().cloned()
        };
        let Some(device) = device else {
            return false;
        };
        {
            let ui = self.ctx.ui.lock();
            if !ui.widget_open || ui.host_hidden {
                return false;
            }
        }

        match self.ctx.player.get_playing().await {
            Err(e) => {
                tracing::warn!(error = %e, "Now playing poll failed, invalidating settings");
                self.ctx.settings.lock().mark_dirty();
                self.ctx.bus.publish_settings_changed();
                self.ctx.bus.publish_status(StatusLine::error(
                    "Check your settings",
                    "Correct API URL, Key and select Device",
                ));
            }
            Ok(playing) => {
                let status = match (playing.state, playing.song) {
                    (PlayState::Playing, Some(song)) => {
                        StatusLine::normal(song.name, format!("{} - {}", song.album, song.artist))
                    }
                    (_, Some(song)) => StatusLine::normal(song.name, "Stopped"),
                    (_, None) => StatusLine::ready(&device),
                };
                self.ctx.bus.publish_status(status);
            }
        }
        true
    }
}
