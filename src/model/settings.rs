//! Persisted widget settings and their dirty-tracking store

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::storage::{Storage, StorageError};

pub const SETTINGS_STORAGE_KEY: &str = "naWidgetSettings";

/// A remote playback endpoint. Identity is the serial number.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub serial_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_owner_customer_id: String,
}

impl Device {
    pub fn new(serial_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn same_device(&self, other: &Device) -> bool {
        self.serial_number == other.serial_number
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        self.same_device(other)
    }
}

impl Eq for Device {}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<Device>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_selected: Option<Device>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("settings could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("device {0} is not in the known device list")]
    UnknownDevice(String),
}

/// In-memory settings with a persisted copy behind an injected [`Storage`].
///
/// The dirty flag starts set and is only cleared by `load` or `save`.
pub struct SettingsStore {
    storage: Arc<dyn Storage>,
    data: Settings,
    dirty: bool,
}

impl SettingsStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            data: Settings::default(),
            dirty: true,
        }
    }

    /// Replace in-memory state with the persisted copy.
    ///
    /// A missing or unreadable blob yields empty settings; the flag is cleared either way.
    pub fn load(&mut self) -> Result<(), SettingsError> {
        let blob = self.storage.get_item(SETTINGS_STORAGE_KEY)?;
        self.data = match blob {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored settings are unreadable, starting empty");
                Settings::default()
            }),
            None => Settings::default(),
        };
        self.dirty = false;
        tracing::debug!(
            api_url_set = self.is_api_url_set(),
            devices = self.data.devices.as_ref().map(|d| d.len()).unwrap_or(0),
            "Settings loaded"
        );
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), SettingsError> {
        let blob = serde_json::to_string(&self.data)?;
        self.storage.set_item(SETTINGS_STORAGE_KEY, &blob)?;
        self.dirty = false;
        tracing::info!("Settings saved");
        Ok(())
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_api_url(&mut self, api_url: impl Into<String>) {
        self.data.api_url = Some(api_url.into());
        self.dirty = true;
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.data.api_key = Some(api_key.into());
        self.dirty = true;
    }

    pub fn set_devices(&mut self, devices: Vec<Device>) {
        self.data.devices = Some(devices);
        self.dirty = true;
    }

    pub fn set_device_selected(&mut self, device: Option<Device>) {
        self.data.device_selected = device;
        self.dirty = true;
    }

    /// Select one of the known devices by serial number.
    pub fn select_device_by_serial(&mut self, serial_number: &str) -> Result<(), SettingsError> {
        let device = self
            .data
            .devices
            .as_ref()
            .and_then(|devices| devices.iter().find(|d| d.serial_number == serial_number))
            .cloned()
            .ok_or_else(|| SettingsError::UnknownDevice(serial_number.to_string()))?;
        self.set_device_selected(Some(device));
        Ok(())
    }

    pub fn api_url(&self) -> Option<&str> {
        self.data.api_url.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.data.api_key.as_deref()
    }

    pub fn devices(&self) -> &[Device] {
        self.data.devices.as_deref().unwrap_or(&[])
    }

    pub fn device_selected(&self) -> Option<&Device> {
        self.data.device_selected.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.data
    }

    pub fn is_api_url_set(&self) -> bool {
        is_non_blank(self.data.api_url.as_deref())
    }

    pub fn is_api_key_set(&self) -> bool {
        is_non_blank(self.data.api_key.as_deref())
    }

    pub fn is_devices_set(&self) -> bool {
        self.data.devices.is_some()
    }

    pub fn is_device_selected(&self) -> bool {
        self.data.device_selected.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clean and complete: the precondition for any remote command.
    pub fn is_ready(&self) -> bool {
        !self.dirty && self.is_api_key_set() && self.is_api_url_set() && self.is_device_selected()
    }
}

fn is_non_blank(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::storage::MemoryStorage;

    fn store() -> (SettingsStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (SettingsStore::new(Arc::new(storage.clone())), storage)
    }

    #[test]
    fn fresh_store_is_dirty_until_loaded() {
        let (mut settings, _) = store();
        assert!(settings.is_dirty());
        settings.load().unwrap();
        assert!(!settings.is_dirty());
        assert!(!settings.is_api_url_set());
        assert!(!settings.is_devices_set());
    }

    #[test]
    fn every_mutation_sets_dirty_and_load_or_save_clears_it() {
        let (mut settings, _) = store();
        settings.load().unwrap();

        let mutations: Vec<Box<dyn Fn(&mut SettingsStore)>> = vec![
            Box::new(|s| s.set_api_url("https://x")),
            Box::new(|s| s.set_api_key("k")),
            Box::new(|s| s.set_devices(vec![Device::new("S1", "Speaker")])),
            Box::new(|s| s.set_device_selected(Some(Device::new("S1", "Speaker")))),
            Box::new(|s| s.set_device_selected(None)),
            Box::new(|s| s.mark_dirty()),
        ];

        for (i, mutate) in mutations.iter().enumerate() {
            mutate(&mut settings);
            assert!(settings.is_dirty(), "mutation {} should set dirty", i);
            if i % 2 == 0 {
                settings.save().unwrap();
            } else {
                settings.load().unwrap();
            }
            assert!(!settings.is_dirty(), "mutation {} should be cleared", i);
        }
    }

    #[test]
    fn save_then_load_restores_persisted_copy() {
        let (mut settings, storage) = store();
        settings.set_api_url("https://x");
        settings.set_api_key("k");
        settings.set_devices(vec![Device::new("S1", "Speaker")]);
        settings.set_device_selected(Some(Device::new("S1", "Speaker")));
        settings.save().unwrap();

        let mut reloaded = SettingsStore::new(Arc::new(storage));
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings(), settings.settings());
        assert!(reloaded.is_ready());
    }

    #[test]
    fn unsaved_changes_are_discarded_by_load() {
        let (mut settings, _) = store();
        settings.set_api_url("https://saved");
        settings.save().unwrap();
        settings.set_api_url("https://unsaved");
        settings.load().unwrap();
        assert_eq!(settings.api_url(), Some("https://saved"));
    }

    #[test]
    fn blank_strings_do_not_count_as_set() {
        let (mut settings, _) = store();
        settings.set_api_url("   ");
        settings.set_api_key("");
        assert!(!settings.is_api_url_set());
        assert!(!settings.is_api_key_set());

        settings.set_api_url("not even a url");
        assert!(settings.is_api_url_set());
    }

    #[test]
    fn unreadable_blob_loads_as_empty_settings() {
        let (mut settings, storage) = store();
        storage.set_item(SETTINGS_STORAGE_KEY, "{broken").unwrap();
        settings.set_api_url("https://x");
        settings.load().unwrap();
        assert!(!settings.is_dirty());
        assert_eq!(settings.settings(), &Settings::default());
    }

    #[test]
    fn only_known_devices_are_selectable() {
        let (mut settings, _) = store();
        settings.set_devices(vec![Device::new("S1", "Speaker"), Device::new("S2", "Kitchen")]);

        settings.select_device_by_serial("S2").unwrap();
        assert_eq!(settings.device_selected().map(|d| d.name.as_str()), Some("Kitchen"));

        let err = settings.select_device_by_serial("S9").unwrap_err();
        assert!(matches!(err, SettingsError::UnknownDevice(ref s) if s == "S9"));
        assert_eq!(settings.device_selected().map(|d| d.serial_number.as_str()), Some("S2"));
    }

    #[test]
    fn readiness_requires_every_condition() {
        let (mut settings, _) = store();
        settings.set_api_url("https://x");
        settings.set_api_key("k");
        settings.set_devices(vec![Device::new("S1", "Speaker")]);
        settings.set_device_selected(Some(Device::new("S1", "Speaker")));
        assert!(!settings.is_ready());
        settings.save().unwrap();
        assert!(settings.is_ready());

        settings.set_api_key(" ");
        settings.save().unwrap();
        assert!(!settings.is_ready());
    }

    #[test]
    fn devices_compare_by_serial_number() {
        let a = Device::new("S1", "Speaker");
        let mut b = Device::new("S1", "Renamed");
        b.device_type = "ECHO".to_string();
        assert_eq!(a, b);
        assert_ne!(a, Device::new("S2", "Speaker"));
    }

    #[test]
    fn settings_blob_uses_camel_case_keys() {
        let (mut settings, storage) = store();
        settings.set_api_url("https://x");
        settings.set_device_selected(Some(Device::new("S1", "Speaker")));
        settings.save().unwrap();

        let raw = storage.get_item(SETTINGS_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["apiUrl"], "https://x");
        assert_eq!(value["deviceSelected"]["serialNumber"], "S1");
    }
}
