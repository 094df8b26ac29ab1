//! Settings form binding and device discovery

use crate::model::{Control, SettingsError, StatusLine};

use super::WidgetContext;

#[derive(Clone)]
pub struct SettingsPanel {
    ctx: WidgetContext,
}

impl SettingsPanel {
    pub fn new(ctx: WidgetContext) -> Self {
        Self { ctx }
    }

    pub fn bind(&self) {
        self.load_values_from_settings();
    }

    pub fn toggle_settings(&self) {
        let mut ui = self.ctx.ui.lock();
        ui.settings_open = !ui.settings_open;
    }

    /// Reload settings from storage and mirror them into the form.
    ///
    /// A stored device list without a usable selection defaults to its first device.
    pub fn load_values_from_settings(&self) {
        let (api_url, api_key, devices, choice) = {
            let mut settings = self.ctx.settings.lock();
            if let Err(e) = settings.load() {
                drop(settings);
                self.report_settings_error("Error loading settings", &e);
                return;
            }

            let devices = settings.is_devices_set().then(|| settings.devices().to_vec());
            let mut choice = None;
            if let Some(devices) = devices.as_ref() {
                let selected = settings
                    .device_selected()
                    .and_then(|selected| devices.iter().position(|d| d.same_device(selected)));
                choice = match selected {
                    Some(index) => Some(index),
                    None => {
                        // Stale or missing selection: default to the first device and persist it.
                        settings.set_device_selected(devices.first().cloned());
                        if let Err(e) = settings.save() {
                            tracing::warn!(error = %e, "Could not persist default device");
                        }
                        devices.first().map(|_| 0)
                    }
                };
            }

            (
                settings.api_url().filter(|_| settings.is_api_url_set()).map(str::to_string),
                settings.api_key().filter(|_| settings.is_api_key_set()).map(str::to_string),
                devices,
                choice,
            )
        };

        let mut ui = self.ctx.ui.lock();
        if let Some(api_url) = api_url {
            ui.form.api_url = api_url;
        }
        if let Some(api_key) = api_key {
            ui.form.api_key = api_key;
        }
        if let Some(devices) = devices {
            ui.form.device_options = devices;
            ui.form.device_choice = choice;
        }
    }

    pub fn on_api_url_changed(&self) {
        let value = self.ctx.ui.lock().form.api_url.clone();
        {
            let mut settings = self.ctx.settings.lock();
            if settings.api_url() == Some(value.as_str()) {
                return;
            }
            settings.set_api_url(value);
        }
        self.ctx.bus.publish_settings_changed();
    }

    pub fn on_api_key_changed(&self) {
        let value = self.ctx.ui.lock().form.api_key.clone();
        {
            let mut settings = self.ctx.settings.lock();
            if settings.api_key() == Some(value.as_str()) {
                return;
            }
            settings.set_api_key(value);
        }
        self.ctx.bus.publish_settings_changed();
    }

    /// Device selector changed. `None` is the placeholder entry.
    ///
    /// Picking a device on clean settings persists right away; on dirty settings it
    /// waits for the next check so the device list is not reloaded under the user.
    pub fn on_device_chosen(&self, choice: Option<usize>) {
        let chosen = {
            let mut ui = self.ctx.ui.lock();
            let options = ui.form.device_options.len();
            ui.form.device_choice = choice.filter(|i| *i < options);
            ui.form.chosen_device().cloned()
        };

        let result = {
            let mut settings = self.ctx.settings.lock();
            match chosen {
                Some(device) => {
                    let was_dirty = settings.is_dirty();
                    settings
                        .select_device_by_serial(&device.serial_number)
                        .and_then(|_| if was_dirty { Ok(()) } else { settings.save() })
                }
                None => {
                    settings.set_device_selected(None);
                    Ok(())
                }
            }
        };
        if let Err(e) = result {
            self.report_settings_error("Error selecting device", &e);
        }
        self.ctx.bus.publish_settings_changed();
    }

    /// "Save settings" action: discover devices with the entered URL and key, then persist.
    pub async fn check(&self) {
        let Some(_busy) = self.ctx.begin(Control::Check) else {
            return;
        };

        let filled = {
            let ui = self.ctx.ui.lock();
            !ui.form.api_key.is_empty() && !ui.form.api_url.is_empty()
        };
        if filled {
            self.discover_devices().await;
        }
        self.ctx.bus.publish_settings_changed();
    }

    async fn discover_devices(&self) {
        match self.ctx.player.get_devices().await {
            Ok(response) => {
                tracing::info!(count = response.devices.len(), "Devices discovered");
                let saved = {
                    let mut settings = self.ctx.settings.lock();
                    settings.set_devices(response.devices);
                    settings.save()
                };
                match saved {
                    Ok(()) => self.load_values_from_settings(),
                    Err(e) => self.report_settings_error("Error saving settings", &e),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Device discovery failed");
                self.ctx
                    .bus
                    .publish_status(StatusLine::error("Error getting devices", e.message));
            }
        }
    }

    fn report_settings_error(&self, action: &str, error: &SettingsError) {
        tracing::error!(action, error = %error, "Settings operation failed");
        self.ctx.bus.publish_status(StatusLine::error(action, error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::config::Profile;
    use crate::controller::TransportControls;
    use crate::controller::testing::Harness;
    use crate::model::testing::FakeReply;
    use crate::model::{Device, HttpMethod};

    fn devices_reply() -> serde_json::Value {
        json!({"devices": [
            {"serialNumber": "S1", "name": "Speaker", "deviceType": "A3S5BH2HU6VAYF", "deviceOwnerCustomerId": "C1"},
            {"serialNumber": "S2", "name": "Kitchen", "deviceType": "A3S5BH2HU6VAYF", "deviceOwnerCustomerId": "C1"}
        ]})
    }

    fn type_credentials(harness: &Harness, panel: &SettingsPanel) {
        {
            let mut ui = harness.ctx.ui.lock();
            ui.form.api_url = "https://x".to_string();
            ui.form.api_key = "k".to_string();
        }
        panel.on_api_url_changed();
        panel.on_api_key_changed();
    }

    #[test]
    fn bind_populates_form_from_storage() {
        let harness = Harness::configured(Profile::Basic);
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();

        let ui = harness.ctx.ui.lock();
        assert_eq!(ui.form.api_url, "https://x");
        assert_eq!(ui.form.api_key, "k");
        assert_eq!(ui.form.device_options, vec![Device::new("S1", "Speaker")]);
        assert_eq!(ui.form.device_choice, Some(0));
        assert!(!harness.ctx.settings.lock().is_dirty());
    }

    #[test]
    fn field_changes_write_through_and_notify() {
        let harness = Harness::new(Profile::Basic);
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();
        let notified = Arc::new(Mutex::new(0));
        let counter = notified.clone();
        harness.ctx.bus.subscribe_settings_changed(move || *counter.lock() += 1);

        type_credentials(&harness, &panel);

        let settings = harness.ctx.settings.lock();
        assert_eq!(settings.api_url(), Some("https://x"));
        assert_eq!(settings.api_key(), Some("k"));
        assert!(settings.is_dirty());
        assert_eq!(*notified.lock(), 2);
    }

    #[test]
    fn unchanged_field_commit_is_ignored() {
        let harness = Harness::configured(Profile::Basic);
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();

        panel.on_api_url_changed();
        assert!(!harness.ctx.settings.lock().is_dirty());
    }

    #[tokio::test]
    async fn check_discovers_devices_and_defaults_selection() {
        let harness = Harness::new(Profile::Basic);
        harness.show_status();
        harness.transport.ok(HttpMethod::Get, "/api/devices", devices_reply());
        let panel = SettingsPanel::new(harness.ctx.clone());
        let controls = TransportControls::new(harness.ctx.clone());
        panel.bind();
        controls.bind();
        type_credentials(&harness, &panel);

        panel.check().await;

        {
            let settings = harness.ctx.settings.lock();
            assert!(!settings.is_dirty());
            assert_eq!(settings.devices().len(), 2);
            assert_eq!(settings.device_selected().map(|d| d.serial_number.as_str()), Some("S1"));
            assert_eq!(settings.device_selected().map(|d| d.device_type.as_str()), Some("A3S5BH2HU6VAYF"));
        }
        let ui = harness.ctx.ui.lock();
        assert_eq!(ui.form.device_options.len(), 2);
        assert_eq!(ui.form.device_choice, Some(0));
        assert!(ui.play.enabled);
        assert!(!ui.check.busy);
        assert_eq!(ui.status, StatusLine::normal("Ready", "To play on Speaker"));
    }

    #[tokio::test]
    async fn check_failure_reports_and_keeps_controls_disabled() {
        let harness = Harness::new(Profile::Basic);
        harness.show_status();
        harness.transport.reply(
            HttpMethod::Get,
            "/api/devices",
            FakeReply::Json(404, json!({"status": "error", "message": "No devices on the account"})),
        );
        let panel = SettingsPanel::new(harness.ctx.clone());
        let controls = TransportControls::new(harness.ctx.clone());
        panel.bind();
        controls.bind();
        type_credentials(&harness, &panel);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        harness.ctx.bus.subscribe_status(move |s| sink.lock().push(s.clone()));

        panel.check().await;

        let seen = seen.lock();
        assert_eq!(seen[0], StatusLine::error("Error getting devices", "No devices on the account"));
        assert!(!harness.ctx.ui.lock().play.enabled);
        assert!(harness.ctx.settings.lock().is_dirty());
        assert!(!harness.ctx.ui.lock().check.busy);
    }

    #[tokio::test]
    async fn check_with_empty_fields_does_not_call_api() {
        let harness = Harness::new(Profile::Basic);
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();

        panel.check().await;
        assert!(harness.transport.requests().is_empty());
    }

    #[test]
    fn choosing_device_on_clean_settings_persists() {
        let harness = Harness::configured(Profile::Basic);
        {
            let mut settings = harness.ctx.settings.lock();
            settings.set_devices(vec![Device::new("S1", "Speaker"), Device::new("S2", "Kitchen")]);
            settings.save().unwrap();
        }
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();

        panel.on_device_chosen(Some(1));

        let settings = harness.ctx.settings.lock();
        assert!(!settings.is_dirty());
        assert_eq!(settings.device_selected().map(|d| d.name.as_str()), Some("Kitchen"));
    }

    #[test]
    fn choosing_device_on_dirty_settings_waits_for_check() {
        let harness = Harness::configured(Profile::Basic);
        {
            let mut settings = harness.ctx.settings.lock();
            settings.set_devices(vec![Device::new("S1", "Speaker"), Device::new("S2", "Kitchen")]);
            settings.save().unwrap();
        }
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();
        harness.ctx.ui.lock().form.api_key = "changed".to_string();
        panel.on_api_key_changed();

        panel.on_device_chosen(Some(1));
        assert!(harness.ctx.settings.lock().is_dirty());

        panel.on_device_chosen(None);
        let settings = harness.ctx.settings.lock();
        assert!(settings.device_selected().is_none());
        assert!(settings.is_dirty());
    }

    #[test]
    fn stale_selection_falls_back_to_first_device() {
        let harness = Harness::configured(Profile::Basic);
        {
            let mut settings = harness.ctx.settings.lock();
            settings.set_devices(vec![Device::new("S7", "Bedroom")]);
            settings.save().unwrap();
        }
        let panel = SettingsPanel::new(harness.ctx.clone());
        panel.bind();

        let settings = harness.ctx.settings.lock();
        assert_eq!(settings.device_selected().map(|d| d.serial_number.as_str()), Some("S7"));
        assert!(!settings.is_dirty());
        assert_eq!(harness.ctx.ui.lock().form.device_choice, Some(0));
    }
}
