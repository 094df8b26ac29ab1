//! Core type definitions for the widget

use super::settings::Device;

/// Style tag carried by a status line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusStyle {
    #[default]
    Normal,
    Warn,
    Error,
}

impl StatusStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusStyle::Normal => "normal",
            StatusStyle::Warn => "warn",
            StatusStyle::Error => "error",
        }
    }
}

/// Two-line status message shown in the widget
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub primary: String,
    pub secondary: String,
    pub style: StatusStyle,
}

impl StatusLine {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>, style: StatusStyle) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            style,
        }
    }

    pub fn normal(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self::new(primary, secondary, StatusStyle::Normal)
    }

    pub fn warn(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self::new(primary, secondary, StatusStyle::Warn)
    }

    pub fn error(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self::new(primary, secondary, StatusStyle::Error)
    }

    pub fn ready(device: &Device) -> Self {
        Self::normal("Ready", format!("To play on {}", device.name))
    }

    /// Merge an update into the displayed line. Empty lines keep the previous text.
    pub fn apply(&mut self, update: &StatusLine) {
        if !update.primary.is_empty() {
            self.primary = update.primary.clone();
        }
        if !update.secondary.is_empty() {
            self.secondary = update.secondary.clone();
        }
        self.style = update.style;
    }
}

/// Widget controls that can be enabled, disabled or busy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Check,
    Prev,
    Play,
    Stop,
    Next,
    Volume,
}

impl Control {
    pub const TRANSPORT: [Control; 4] = [Control::Prev, Control::Play, Control::Stop, Control::Next];
}

/// Enable state of a single control
///
/// `busy` is owned by the control's own handler, `enabled` by settings readiness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    pub enabled: bool,
    pub busy: bool,
}

impl ControlState {
    pub fn is_disabled(&self) -> bool {
        !self.enabled || self.busy
    }
}

/// Which field of the panel has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PanelField {
    ApiUrl,
    ApiKey,
    Device,
    Check,
    Prev,
    #[default]
    Play,
    Stop,
    Next,
    Volume,
}

impl PanelField {
    const SETTINGS: [PanelField; 4] = [PanelField::ApiUrl, PanelField::ApiKey, PanelField::Device, PanelField::Check];
    const CONTROLS: [PanelField; 5] = [
        PanelField::Prev,
        PanelField::Play,
        PanelField::Stop,
        PanelField::Next,
        PanelField::Volume,
    ];

    /// Focus order for the current panel shape.
    pub fn cycle(settings_open: bool, with_volume: bool) -> Vec<PanelField> {
        let mut order = Vec::new();
        if settings_open {
            order.extend(Self::SETTINGS);
        }
        order.extend(
            Self::CONTROLS
                .iter()
                .copied()
                .filter(|f| with_volume || *f != PanelField::Volume),
        );
        order
    }

    pub fn next_in(self, order: &[PanelField]) -> PanelField {
        let pos = order.iter().position(|f| *f == self);
        match pos {
            Some(i) => order[(i + 1) % order.len()],
            None => order.first().copied().unwrap_or_default(),
        }
    }

    pub fn prev_in(self, order: &[PanelField]) -> PanelField {
        let pos = order.iter().position(|f| *f == self);
        match pos {
            Some(i) => order[(i + order.len() - 1) % order.len()],
            None => order.first().copied().unwrap_or_default(),
        }
    }

    pub fn is_text_input(self) -> bool {
        matches!(self, PanelField::ApiUrl | PanelField::ApiKey)
    }
}

/// Settings form contents, mirrors what the user sees
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub api_url: String,
    pub api_key: String,
    pub device_options: Vec<Device>,
    /// `None` is the "select device" placeholder entry
    pub device_choice: Option<usize>,
}

impl FormState {
    pub fn chosen_device(&self) -> Option<&Device> {
        self.device_choice.and_then(|i| self.device_options.get(i))
    }
}

/// Placement of the floating panel relative to the host layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelPlacement {
    pub bottom: u16,
    pub left: u16,
    pub mobile: bool,
}

/// UI state for the widget panel
#[derive(Clone, Debug)]
pub struct UiState {
    pub widget_open: bool,
    /// Host surface is not visible to the user (terminal lost focus)
    pub host_hidden: bool,
    pub settings_open: bool,
    pub focus: PanelField,
    pub form: FormState,
    pub status: StatusLine,
    pub check: ControlState,
    pub prev: ControlState,
    pub play: ControlState,
    pub stop: ControlState,
    pub next: ControlState,
    pub volume: ControlState,
    pub volume_slider: u8,
    pub placement: PanelPlacement,
    pub toggle_button_installed: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            widget_open: false,
            host_hidden: false,
            settings_open: false,
            focus: PanelField::default(),
            form: FormState::default(),
            status: StatusLine::default(),
            check: ControlState {
                enabled: true,
                busy: false,
            },
            prev: ControlState::default(),
            play: ControlState::default(),
            stop: ControlState::default(),
            next: ControlState::default(),
            volume: ControlState::default(),
            volume_slider: 0,
            placement: PanelPlacement::default(),
            toggle_button_installed: false,
        }
    }
}

impl UiState {
    pub fn control(&self, control: Control) -> &ControlState {
        match control {
            Control::Check => &self.check,
            Control::Prev => &self.prev,
            Control::Play => &self.play,
            Control::Stop => &self.stop,
            Control::Next => &self.next,
            Control::Volume => &self.volume,
        }
    }

    pub fn control_mut(&mut self, control: Control) -> &mut ControlState {
        match control {
            Control::Check => &mut self.check,
            Control::Prev => &mut self.prev,
            Control::Play => &mut self.play,
            Control::Stop => &mut self.stop,
            Control::Next => &mut self.next,
            Control::Volume => &mut self.volume,
        }
    }
}
