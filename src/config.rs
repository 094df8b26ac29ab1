use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

const CONFIG_FILE_NAME: &str = "cast-widget.toml";
const STORAGE_ENV_VAR: &str = "CAST_WIDGET_STORAGE";
const DEFAULT_STORAGE_PATH: &str = ".cache/storage.json";
const DEFAULT_LOG_DIR: &str = ".logs";

/// Widget feature set. The two shipped widget builds differ only in these switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Transport buttons only, desktop layout only
    Basic,
    /// Adds the volume slider and the full-screen mobile layout
    #[default]
    Extended,
}

impl Profile {
    pub fn has_volume(self) -> bool {
        self == Profile::Extended
    }

    pub fn has_mobile_layout(self) -> bool {
        self == Profile::Extended
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub profile: Profile,
    pub storage_path: PathBuf,
    pub log_dir: PathBuf,
    pub poll_interval: Duration,
    pub volume_debounce: Duration,
    /// Terminal widths below this render the host as its mobile player
    pub mobile_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            poll_interval: Duration::from_millis(1500),
            volume_debounce: Duration::from_millis(1000),
            mobile_width: 60,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = env::current_dir() {
            candidates.push(current_dir.join(CONFIG_FILE_NAME));
            candidates.push(current_dir.join("config").join(CONFIG_FILE_NAME));
        }

        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(CONFIG_FILE_NAME));
            }
        }

        let mut config = Config::default();
        for path in candidates {
            if path.exists() {
                let data = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                config = Self::parse(&data)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))?;
                tracing::info!(path = %path.display(), "Config loaded");
                break;
            }
        }

        if let Ok(storage) = env::var(STORAGE_ENV_VAR) {
            if !storage.trim().is_empty() {
                config.storage_path = PathBuf::from(storage);
            }
        }

        Ok(config)
    }

    pub fn parse(data: &str) -> anyhow::Result<Self> {
        let doc: ConfigDocument = toml::from_str(data)?;
        Ok(doc.into())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    widget: WidgetSection,
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
struct WidgetSection {
    profile: Option<Profile>,
    poll_interval_ms: Option<u64>,
    volume_debounce_ms: Option<u64>,
    mobile_width: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingSection {
    dir: Option<PathBuf>,
}

impl From<ConfigDocument> for Config {
    fn from(value: ConfigDocument) -> Self {
        let defaults = Config::default();
        Config {
            profile: value.widget.profile.unwrap_or(defaults.profile),
            storage_path: value.storage.path.unwrap_or(defaults.storage_path),
            log_dir: value.logging.dir.unwrap_or(defaults.log_dir),
            poll_interval: value
                .widget
                .poll_interval_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            volume_debounce: value
                .widget
                .volume_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.volume_debounce),
            mobile_width: value.widget.mobile_width.unwrap_or(defaults.mobile_width),
        }
    }
}
