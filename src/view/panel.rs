//! Floating cast panel rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Padding, Paragraph},
    Frame,
};

use crate::model::{Control, PanelField, UiState};

use super::utils::{anchored_rect, control_style, mask_secret, status_color, truncate_string};

pub const PANEL_WIDTH: u16 = 36;

const SETTINGS_HEIGHT: u16 = 6;
const STATUS_HEIGHT: u16 = 4;
const CONTROLS_HEIGHT: u16 = 3;
const VOLUME_HEIGHT: u16 = 3;

pub fn panel_height(ui_state: &UiState, with_volume: bool) -> u16 {
    let mut height = STATUS_HEIGHT + CONTROLS_HEIGHT + 2;
    if ui_state.settings_open {
        height += SETTINGS_HEIGHT;
    }
    if with_volume {
        height += VOLUME_HEIGHT;
    }
    height
}

pub fn render_panel(frame: &mut Frame, ui_state: &UiState, with_volume: bool) {
    let placement = ui_state.placement;
    let area = if placement.mobile {
        frame.area()
    } else {
        anchored_rect(
            frame.area(),
            placement.left,
            placement.bottom,
            PANEL_WIDTH,
            panel_height(ui_state, with_volume),
        )
    };

    frame.render_widget(Clear, area);
    let hint = if placement.mobile { " s settings  Esc close " } else { " s settings " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Cast ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .title_bottom(Line::from(hint).right_aligned())
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = Vec::new();
    if ui_state.settings_open {
        constraints.push(Constraint::Length(SETTINGS_HEIGHT));
    }
    constraints.push(Constraint::Length(STATUS_HEIGHT));
    constraints.push(Constraint::Length(CONTROLS_HEIGHT));
    if with_volume {
        constraints.push(Constraint::Length(VOLUME_HEIGHT));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut next = 0;
    if ui_state.settings_open {
        render_settings(frame, chunks[next], ui_state);
        next += 1;
    }
    render_status(frame, chunks[next], ui_state);
    render_controls(frame, chunks[next + 1], ui_state);
    if with_volume {
        render_volume(frame, chunks[next + 2], ui_state);
    }
}

fn field_label(label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("{:<7}", label), style)
}

fn render_settings(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let focus = ui_state.focus;
    let value_width = area.width.saturating_sub(11) as usize;
    let form = &ui_state.form;

    let cursor = |field: PanelField| if focus == field { "▏" } else { "" };
    let url = if form.api_url.is_empty() && focus != PanelField::ApiUrl {
        Span::styled("https://…", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(format!("{}{}", truncate_string(&form.api_url, value_width).trim_end(), cursor(PanelField::ApiUrl)))
    };
    let key = Span::raw(format!(
        "{}{}",
        truncate_string(&mask_secret(&form.api_key), value_width).trim_end(),
        cursor(PanelField::ApiKey)
    ));
    let device_name = form
        .chosen_device()
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "Select device".to_string());
    let device = Span::raw(format!("‹ {} ›", truncate_string(&device_name, value_width.saturating_sub(4)).trim_end()));

    let check_style = control_style(ui_state.control(Control::Check), focus == PanelField::Check);
    let lines = vec![
        Line::from(vec![field_label("URL", focus == PanelField::ApiUrl), url]),
        Line::from(vec![field_label("Key", focus == PanelField::ApiKey), key]),
        Line::from(vec![field_label("Device", focus == PanelField::Device), device]),
        Line::from(Span::styled(" Check ", check_style)).right_aligned(),
    ];

    let settings = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Settings ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(settings, area);
}

fn render_status(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let status = &ui_state.status;
    let color = status_color(status.style);
    let width = area.width.saturating_sub(4) as usize;
    let lines = vec![
        Line::from(Span::styled(
            truncate_string(&status.primary, width),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(truncate_string(&status.secondary, width), Style::default().fg(color))),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(paragraph, area);
}

fn render_controls(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let buttons = [
        (Control::Prev, PanelField::Prev, " ⏮ "),
        (Control::Play, PanelField::Play, " ▶ "),
        (Control::Stop, PanelField::Stop, " ■ "),
        (Control::Next, PanelField::Next, " ⏭ "),
    ];
    let mut spans = Vec::new();
    for (i, (control, field, label)) in buttons.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            *label,
            control_style(ui_state.control(*control), ui_state.focus == *field),
        ));
    }
    let row = Paragraph::new(Line::from(spans).centered()).block(Block::default().borders(Borders::ALL));
    frame.render_widget(row, area);
}

fn render_volume(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let state = ui_state.control(Control::Volume);
    let focused = ui_state.focus == PanelField::Volume;
    let gauge_color = if state.is_disabled() { Color::DarkGray } else { Color::Green };
    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Volume (← →) ")
                .border_style(border_style),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .percent(u16::from(ui_state.volume_slider.min(100)))
        .label(format!("{}", ui_state.volume_slider));
    frame.render_widget(gauge, area);
}
