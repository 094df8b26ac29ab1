//! Playback control methods

use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::{ApiError, Control, Device, StatusLine, VolumeRequest};
use crate::scheduler::TimerHandle;

use super::WidgetContext;

/// Slider position (0..=100) to device volume, quadratic so low volumes get more travel.
pub fn slider_to_volume(slider: u8) -> u32 {
    let slider = u32::from(slider.min(100));
    (slider * slider).div_ceil(100)
}

pub fn volume_to_slider(volume: u32) -> u8 {
    let slider = ((volume as f64).sqrt() * 10.0).round();
    slider.clamp(0.0, 100.0) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Stop,
    Prev,
    Next,
}

impl Command {
    fn label(self) -> &'static str {
        match self {
            Command::Stop => "stop",
            Command::Prev => "prev",
            Command::Next => "next",
        }
    }

    fn control(self) -> Control {
        match self {
            Command::Stop => Control::Stop,
            Command::Prev => Control::Prev,
            Command::Next => Control::Next,
        }
    }
}

#[derive(Clone)]
pub struct TransportControls {
    ctx: WidgetContext,
    last_posted_queue: Arc<tokio::sync::Mutex<Option<String>>>,
    /// Serial number of the device and the volume last sent to it
    last_posted_volume: Arc<Mutex<Option<(String, u32)>>>,
    volume_timer: Arc<Mutex<Option<TimerHandle>>>,
}

impl TransportControls {
    pub fn new(ctx: WidgetContext) -> Self {
        Self {
            ctx,
            last_posted_queue: Arc::new(tokio::sync::Mutex::new(None)),
            last_posted_volume: Arc::new(Mutex::new(None)),
            volume_timer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn bind(&self) {
        let controls = self.clone();
        self.ctx.bus.subscribe_settings_changed(move || controls.toggle_controls());
        self.toggle_controls();

        if self.ctx.profile.has_volume() {
            let controls = self.clone();
            tokio::spawn(async move { controls.load_current_volume().await });
        }
    }

    /// Enable the controls exactly when settings are clean and complete.
    pub fn toggle_controls(&self) {
        let ready_device = {
            let settings = self.ctx.settings.lock();
            if settings.is_ready() {
                settings.device_selected().cloned()
            } else {
                None
            }
        };
        let enabled = ready_device.is_some();
        let with_volume = self.ctx.profile.has_volume();

        {
            let mut ui = self.ctx.ui.lock();
            for control in Control::TRANSPORT {
                ui.control_mut(control).enabled = enabled;
            }
            ui.volume.enabled = enabled && with_volume;
        }

        let status = match ready_device {
            Some(device) => StatusLine::ready(&device),
            None => StatusLine::error("Check your settings", "Fill in API URL, Key and select Device"),
        };
        self.ctx.bus.publish_status(status);
    }

    pub async fn play(&self) {
        let Some(_busy) = self.ctx.begin(Control::Play) else {
            return;
        };
        self.ctx.host.pause_local_audio();

        let queue = match self.ctx.queue.get_queue() {
            Ok(Some(queue)) if !queue.is_empty() => queue,
            Ok(_) => {
                self.ctx
                    .bus
                    .publish_status(StatusLine::warn("Queue is empty", "Select more items to play"));
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Host queue could not be read");
                self.ctx
                    .bus
                    .publish_status(StatusLine::warn("Queue is unreadable", e.to_string()));
                return;
            }
        };
        let Some(device) = self.selected_device() else {
            return;
        };

        let fingerprint = queue.fingerprint();
        {
            let mut last_posted = self.last_posted_queue.lock().await;
            if last_posted.as_deref() != Some(fingerprint.as_str()) {
                if let Err(e) = self.ctx.player.post_queue(&queue).await {
                    self.report("Error sending queue", &e);
                    return;
                }
                tracing::info!(tracks = queue.queue.len(), "Queue posted");
                *last_posted = Some(fingerprint);
            } else {
                tracing::debug!("Queue unchanged, not posting");
            }
        }

        match self.ctx.player.post_play(&device).await {
            Ok(_) => tracing::info!(device = %device.name, "Play sent"),
            Err(e) => self.report("Error sending play", &e),
        }
    }

    pub async fn stop(&self) {
        self.send_command(Command::Stop).await;
    }

    pub async fn prev(&self) {
        self.send_command(Command::Prev).await;
    }

    pub async fn next(&self) {
        self.send_command(Command::Next).await;
    }

    async fn send_command(&self, command: Command) {
        let Some(_busy) = self.ctx.begin(command.control()) else {
            return;
        };
        let Some(device) = self.selected_device() else {
            return;
        };

        let result = match command {
            Command::Stop => self.ctx.player.post_stop(&device).await,
            Command::Prev => self.ctx.player.post_prev(&device).await,
            Command::Next => self.ctx.player.post_next(&device).await,
        };
        match result {
            Ok(_) => tracing::info!(command = command.label(), device = %device.name, "Command sent"),
            Err(e) => self.report(&format!("Error sending {}", command.label()), &e),
        }
    }

    /// Slider moved: show the volume it maps to.
    pub fn on_volume_input(&self, slider: u8) {
        let volume = slider_to_volume(slider);
        self.ctx.ui.lock().volume_slider = slider.min(100);
        self.ctx
            .bus
            .publish_status(StatusLine::normal("", format!("Volume: {}%", volume)));
    }

    /// Slider released: post the volume once the slider has been still for the debounce period.
    pub fn on_volume_change(&self, slider: u8) {
        if self.ctx.ui.lock().volume.is_disabled() {
            return;
        }
        let volume = slider_to_volume(slider);
        let controls = self.clone();
        // Once the delay has passed the post runs on its own task, so a later
        // slider move only cancels a timer that has not fired yet.
        let timer = self.ctx.scheduler.after(self.ctx.volume_debounce, async move {
            tokio::spawn(async move { controls.post_volume(volume).await });
        });

        if let Some(previous) = self.volume_timer.lock().replace(timer) {
            previous.cancel();
        }
    }

    async fn post_volume(&self, volume: u32) {
        let Some(device) = self.selected_device() else {
            return;
        };
        let unchanged = self
            .last_posted_volume
            .lock()
            .as_ref()
            .is_some_and(|(serial, last)| *serial == device.serial_number && *last == volume);
        if unchanged {
            tracing::debug!(volume, device = %device.name, "Volume unchanged, not posting");
            return;
        }

        let serial = device.serial_number.clone();
        let request = VolumeRequest { device, volume };
        match self.ctx.player.post_volume(&request).await {
            Ok(_) => {
                tracing::info!(volume, "Volume sent");
                *self.last_posted_volume.lock() = Some((serial, volume));
            }
            Err(e) => self.report("Error sending volume", &e),
        }
    }

    /// Move the slider to the selected device's current volume.
    pub async fn load_current_volume(&self) {
        let device = {
            let settings = self.ctx.settings.lock();
            if !(settings.is_api_key_set() && settings.is_api_url_set()) {
                return;
            }
            settings.device_selected().cloned()
        };
        let Some(device) = device else {
            return;
        };

        match self.ctx.player.get_volume().await {
            Ok(volumes) => {
                if let Some(current) = volumes.for_device(&device) {
                    self.ctx.ui.lock().volume_slider = volume_to_slider(current.volume);
                }
            }
            Err(e) => self.report("Error getting volume", &e),
        }
    }

    fn selected_device(&self) -> Option<Device> {
        let device = self.ctx.settings.lock().device_selected().cloned();
        if device.is_none() {
            self.ctx
                .bus
                .publish_status(StatusLine::warn("No device selected", "Select a device in settings"));
        }
        device
    }

    fn report(&self, action: &str, error: &ApiError) {
        tracing::error!(action, error = %error, "Remote command failed");
        self.ctx.bus.publish_status(StatusLine::error(action, error.message.clone()));
    }
}
