//! Model module - Widget state and data types
//!
//! This module contains the data structures, persistence and remote API access.
//! It is organized into submodules by responsibility:
//!
//! - `types`: UI-facing types (status lines, control state, panel state)
//! - `storage`: Key-value persistence capability
//! - `settings`: Settings entity and dirty-tracking store
//! - `queue`: Neutral queue format and host queue reader
//! - `api`: Remote API wire schemas
//! - `player_client`: Remote player HTTP client

mod types;
mod storage;
mod settings;
mod queue;
mod api;
mod player_client;

use std::sync::Arc;

use parking_lot::Mutex;

pub use types::{
    Control, ControlState, FormState, PanelField, PanelPlacement, StatusLine, StatusStyle, UiState,
};

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

pub use settings::{Device, Settings, SettingsError, SettingsStore, SETTINGS_STORAGE_KEY};

pub use queue::{QueueError, QueueReader, QueueSnapshot, Track, HOST_STATE_STORAGE_KEY};

pub use api::{DeviceVolume, PlayState, PlayingResponse, Song, VolumeRequest, VolumeResponse};

pub use player_client::{ApiError, ApiErrorKind, HttpTransport, PlayerClient, ReqwestTransport};

#[cfg(test)]
pub use player_client::{testing, HttpMethod};

/// Settings store shared between controllers. Never held across an await point.
pub type SharedSettings = Arc<Mutex<SettingsStore>>;

/// Panel state shared between controllers and the view.
pub type SharedUi = Arc<Mutex<UiState>>;
