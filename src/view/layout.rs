//! Host layout rendering (player bar, playlist panel, mobile player)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::host::TerminalHost;
use crate::model::{QueueSnapshot, Track, UiState};

use super::utils::{calculate_num_width, format_duration, render_scrollable_list, truncate_string};

fn current_track(queue: Option<&QueueSnapshot>) -> Option<&Track> {
    queue?.current()
}

fn track_title(track: Option<&Track>) -> String {
    match track {
        Some(track) => format!(" ♪ {} | {} ({})", track.name, track.artist, track.album),
        None => " Nothing selected".to_string(),
    }
}

fn toggle_label(ui_state: &UiState) -> Span<'static> {
    let style = if ui_state.widget_open {
        Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    Span::styled(" Cast", style)
}

pub fn render_player_bar(frame: &mut Frame, host: &TerminalHost, ui_state: &UiState, queue: Option<&QueueSnapshot>) {
    let area = host.player_bar();
    let track = current_track(queue);

    let duration = track.map(|t| format_duration(t.duration)).unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(track_title(track))
        .title_bottom(Line::from(" l playlist  w cast  q quit ").right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![Span::styled(duration, Style::default().fg(Color::Gray))];
    if inner.width > 0 {
        let lyrics = host.lyrics_button();
        let pad = lyrics.x.saturating_sub(inner.x + spans[0].width() as u16);
        spans.push(Span::raw(" ".repeat(pad as usize)));
        spans.push(Span::styled("Lyric", Style::default().fg(Color::White)));
        if host.toggle_button().is_some() {
            spans.push(toggle_label(ui_state));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

pub fn render_playlist(frame: &mut Frame, area: Rect, queue: Option<&QueueSnapshot>) {
    let tracks = queue.map(|q| q.queue.as_slice()).unwrap_or_default();
    let playing = queue.and_then(QueueSnapshot::current_index);

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(tracks.len());
    let title_width = content_width.saturating_sub(num_width + 1 + 6);

    let items: Vec<ListItem> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let style = if Some(i) == playing {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!(
                "{:>num$} {}{:>6}",
                i + 1,
                truncate_string(&track.name, title_width),
                format_duration(track.duration),
                num = num_width,
            ))
            .style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Play queue ({}) ", tracks.len()))
        .padding(Padding::horizontal(1));
    render_scrollable_list(frame, area, items, playing, block);
}

pub fn render_desktop(frame: &mut Frame, host: &TerminalHost, ui_state: &UiState, queue: Option<&QueueSnapshot>) {
    let area = host.area();
    let library = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(host.player_bar().height));
    let chunks = if host.is_playlist_open() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(host.playlist_panel().width)])
            .split(library)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0)])
            .split(library)
    };

    let hint = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Music library", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("Queue tracks in the player, then press w to cast them."),
    ])
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)));
    frame.render_widget(hint, chunks[0]);

    if host.is_playlist_open() {
        render_playlist(frame, chunks[1], queue);
    }
    render_player_bar(frame, host, ui_state, queue);
}

pub fn render_mobile(frame: &mut Frame, host: &TerminalHost, ui_state: &UiState, queue: Option<&QueueSnapshot>) {
    let area = host.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(host.player_bar().height)])
        .split(area);

    render_playlist(frame, chunks[0], queue);
    render_player_bar(frame, host, ui_state, queue);
}
