//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

use crate::model::{ControlState, StatusStyle};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: Option<usize>,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(selected_index);

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Key fields show only their last characters.
pub fn mask_secret(s: &str) -> String {
    let count = s.chars().count();
    let visible = 4.min(count / 3);
    let tail: String = s.chars().skip(count - visible).collect();
    format!("{}{}", "•".repeat(count - visible), tail)
}

pub fn status_color(style: StatusStyle) -> Color {
    match style {
        StatusStyle::Normal => Color::White,
        StatusStyle::Warn => Color::Yellow,
        StatusStyle::Error => Color::Red,
    }
}

pub fn control_style(state: &ControlState, focused: bool) -> Style {
    if state.is_disabled() {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else {
        Style::default().fg(Color::Green)
    }
}

/// Rect of `width` x `height` whose bottom edge sits `bottom` rows above the
/// bottom of `area`, clamped into `area`.
pub fn anchored_rect(area: Rect, left: u16, bottom: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + left.min(area.width - width);
    let bottom_edge = (area.y + area.height).saturating_sub(bottom).max(area.y + height);
    Rect::new(x, bottom_edge - height, width, height)
}
