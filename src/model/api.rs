//! Wire schemas of the remote playback API

use serde::{Deserialize, Serialize};

use super::settings::Device;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayState {
    Playing,
    #[default]
    Idle,
    #[serde(other)]
    Unknown,
}

/// A queued song as the remote API reports it
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub album: String,
    pub artist: String,
    pub duration: u64,
    pub cover: String,
    pub stream: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlayingResponse {
    #[serde(default)]
    pub state: PlayState,
    #[serde(default)]
    pub song: Option<Song>,
}

/// Queue as stored by the remote API
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteQueue {
    pub state: PlayState,
    pub queue_position: i64,
    pub track_position: i64,
    pub queue: Vec<Song>,
    pub shuffle: bool,
    pub repeat: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceVolume {
    pub device_serial_number: String,
    pub muted: bool,
    pub volume: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VolumeResponse {
    #[serde(default)]
    pub volumes: Vec<DeviceVolume>,
}

impl VolumeResponse {
    pub fn for_device(&self, device: &Device) -> Option<&DeviceVolume> {
        self.volumes
            .iter()
            .find(|v| v.device_serial_number == device.serial_number)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct VolumeRequest {
    pub device: Device,
    pub volume: u32,
}

/// Acknowledgement returned by command endpoints
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_response_tolerates_idle_without_song() {
        let idle: PlayingResponse = serde_json::from_str(r#"{"state":"IDLE"}"#).unwrap();
        assert_eq!(idle.state, PlayState::Idle);
        assert!(idle.song.is_none());

        let odd: PlayingResponse = serde_json::from_str(r#"{"state":"BUFFERING"}"#).unwrap();
        assert_eq!(odd.state, PlayState::Unknown);
    }

    #[test]
    fn volume_lookup_matches_serial_number() {
        let response: VolumeResponse = serde_json::from_str(
            r#"{"volumes":[{"deviceSerialNumber":"S1","muted":false,"volume":25},
                           {"deviceSerialNumber":"S2","muted":true,"volume":80}]}"#,
        )
        .unwrap();
        let device = Device::new("S2", "Kitchen");
        assert_eq!(response.for_device(&device).map(|v| v.volume), Some(80));
        assert!(response.for_device(&Device::new("S3", "Nope")).is_none());
    }

    #[test]
    fn volume_request_embeds_device_identity() {
        let request = VolumeRequest {
            device: Device::new("S1", "Speaker"),
            volume: 25,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["device"]["serialNumber"], "S1");
        assert_eq!(value["volume"], 25);
    }
}
