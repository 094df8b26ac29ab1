//! Controller module - Widget logic and event handling
//!
//! This module contains the controllers that bind the panel to settings and
//! the remote player API. It is organized into submodules by responsibility:
//!
//! - `status`: Status view and the periodic now-playing poller
//! - `settings_panel`: Settings form and device discovery
//! - `transport`: Play/stop/prev/next and volume controls
//! - `input`: Key event handling

mod status;
mod settings_panel;
mod transport;
mod input;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::bus::EventBus;
use crate::config::{Config, Profile};
use crate::host::HostIntegration;
use crate::model::{Control, PlayerClient, QueueReader, SharedSettings, SharedUi};
use crate::scheduler::{Scheduler, TimerHandle};

pub use settings_panel::SettingsPanel;
pub use status::StatusPoller;
pub use transport::{TransportControls, slider_to_volume, volume_to_slider};

/// Everything the controllers share, built once at startup
#[derive(Clone)]
pub struct WidgetContext {
    pub settings: SharedSettings,
    pub ui: SharedUi,
    pub player: PlayerClient,
    pub queue: QueueReader,
    pub bus: EventBus,
    pub host: Arc<HostIntegration>,
    pub scheduler: Scheduler,
    pub profile: Profile,
    pub poll_interval: Duration,
    pub volume_debounce: Duration,
}

impl WidgetContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &Config,
        settings: SharedSettings,
        ui: SharedUi,
        player: PlayerClient,
        queue: QueueReader,
        bus: EventBus,
        host: Arc<HostIntegration>,
    ) -> Self {
        Self {
            settings,
            ui,
            player,
            queue,
            bus,
            host,
            scheduler: Scheduler::new(),
            profile: config.profile,
            poll_interval: config.poll_interval,
            volume_debounce: config.volume_debounce,
        }
    }

    /// Mark `control` busy for the lifetime of the returned guard.
    ///
    /// Returns `None` when the control is already disabled or busy.
    pub(crate) fn begin(&self, control: Control) -> Option<BusyGuard> {
        let mut ui = self.ui.lock();
        let state = ui.control_mut(control);
        if state.is_disabled() {
            tracing::debug!(?control, "Ignoring activation of disabled control");
            return None;
        }
        state.busy = true;
        Some(BusyGuard {
            ui: self.ui.clone(),
            control,
        })
    }
}

/// Clears the busy flag of a control when dropped, whatever the handler outcome.
pub(crate) struct BusyGuard {
    ui: SharedUi,
    control: Control,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.ui.lock().control_mut(self.control).busy = false;
    }
}

#[derive(Clone)]
pub struct AppController {
    pub(crate) ctx: WidgetContext,
    pub(crate) settings_panel: SettingsPanel,
    pub(crate) transport: TransportControls,
    pub(crate) poller: StatusPoller,
    quit: Arc<AtomicBool>,
}

impl AppController {
    pub fn new(ctx: WidgetContext) -> Self {
        Self {
            settings_panel: SettingsPanel::new(ctx.clone()),
            transport: TransportControls::new(ctx.clone()),
            poller: StatusPoller::new(ctx.clone()),
            quit: Arc::new(AtomicBool::new(false)),
            ctx,
        }
    }

    /// Bind every controller in the order the panel expects and start the poller.
    pub fn bind(&self) -> TimerHandle {
        let poll_timer = self.poller.bind();
        self.settings_panel.bind();
        self.transport.bind();
        self.ctx.host.attach();
        poll_timer
    }

    pub fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::Relaxed)
    }

    pub(crate) fn request_quit(&self) {
        self.quit.store(true, Ordering::Relaxed);
    }

    /// The terminal lost or regained focus.
    pub fn set_host_hidden(&self, hidden: bool) {
        self.ctx.ui.lock().host_hidden = hidden;
        tracing::debug!(hidden, "Host visibility changed");
    }
}
