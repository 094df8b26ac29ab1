//! Neutral queue format and the reader that derives it from host storage

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::storage::{Storage, StorageError};

pub const HOST_STATE_STORAGE_KEY: &str = "state";

/// Host sentinel for "nothing selected in the play queue".
const NO_SELECTION_INDEX: i64 = -1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub stream: String,
    pub cover: String,
    pub name: String,
    pub album: String,
    pub artist: String,
    /// Milliseconds
    pub duration: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub track_position: i64,
    pub queue_position: i64,
    pub queue: Vec<Track>,
}

impl QueueSnapshot {
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Index of the host's selected track, when it points into the queue.
    pub fn current_index(&self) -> Option<usize> {
        usize::try_from(self.queue_position)
            .ok()
            .filter(|i| *i < self.queue.len())
    }

    pub fn current(&self) -> Option<&Track> {
        self.current_index().and_then(|i| self.queue.get(i))
    }

    /// Stable serialized form used to detect queue changes between plays.
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("host queue state is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

// Host application's persisted player state, only the parts we map.

#[derive(Debug, Deserialize)]
struct HostState {
    player: HostPlayer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostPlayer {
    #[serde(default)]
    saved_play_index: i64,
    #[serde(default)]
    queue: Vec<HostQueueItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostQueueItem {
    #[serde(default)]
    track_id: String,
    #[serde(default)]
    music_src: String,
    #[serde(default)]
    cover: String,
    song: HostSong,
}

#[derive(Debug, Deserialize)]
struct HostSong {
    #[serde(default)]
    title: String,
    #[serde(default)]
    album: String,
    #[serde(default)]
    artist: String,
    /// Seconds
    #[serde(default)]
    duration: Option<f64>,
}

impl From<HostQueueItem> for Track {
    fn from(item: HostQueueItem) -> Self {
        let seconds = item.song.duration.unwrap_or(0.0).max(0.0);
        Self {
            id: item.track_id,
            stream: item.music_src,
            cover: item.cover,
            name: item.song.title,
            album: item.song.album,
            artist: item.song.artist,
            duration: (seconds * 1000.0).round() as u64,
        }
    }
}

impl From<HostState> for QueueSnapshot {
    fn from(state: HostState) -> Self {
        let queue_position = if state.player.saved_play_index == NO_SELECTION_INDEX {
            0
        } else {
            state.player.saved_play_index
        };
        Self {
            track_position: 0,
            queue_position,
            queue: state.player.queue.into_iter().map(Track::from).collect(),
        }
    }
}

/// Reads the host application's play queue. Never writes.
#[derive(Clone)]
pub struct QueueReader {
    storage: Arc<dyn Storage>,
}

impl QueueReader {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn get_queue(&self) -> Result<Option<QueueSnapshot>, QueueError> {
        match self.storage.get_item(HOST_STATE_STORAGE_KEY)? {
            Some(raw) => parse_host_state(&raw).map(Some),
            None => Ok(None),
        }
    }
}

pub fn parse_host_state(raw: &str) -> Result<QueueSnapshot, QueueError> {
    let state: HostState = serde_json::from_str(raw)?;
    Ok(state.into())
}
