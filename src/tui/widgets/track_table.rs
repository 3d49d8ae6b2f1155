use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Row, Table},
};
use std::sync::Arc;

use crate::{
    domain::TrackRecord,
    tui::{ACCENT, TEXT_DIM},
    ui_state::{UiState, View},
};

/// Track listing for the home/radio/playlist views.
pub(crate) fn track_view(f: &mut Frame, area: Rect, ui: &mut UiState) {
    let (title, pending) = match ui.view {
        View::Home => (
            ui.home.section_title().unwrap_or("Home").to_string(),
            ui.home.pending,
        ),
        View::Radio => (
            ui.radio.section_title().unwrap_or("Radio").to_string(),
            ui.radio.pending,
        ),
        View::Playlists => (
            ui.selected_playlist()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Playlists".to_string()),
            false,
        ),
        View::Search => unreachable!("search renders its own view"),
    };

    let tracks = ui.visible_tracks();
    let block = Block::new()
        .borders(Borders::ALL)
        .title(format!(" {title} "))
        .title_bottom(Line::from(" [ / ] sections  enter: play ").fg(TEXT_DIM));

    if tracks.is_empty() {
        let empty = match pending {
            true => "Loading…",
            false => "Nothing here yet",
        };
        let placeholder = Table::new(
            [Row::new([empty.to_string()]).fg(TEXT_DIM)],
            [Constraint::Fill(1)],
        )
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let table = Table::new(rows(&tracks), widths())
        .header(header())
        .block(block)
        .row_highlight_style(Style::new().fg(ACCENT).bold())
        .highlight_symbol("▶ ");

    let state = match ui.view {
        View::Home => &mut ui.home.table,
        View::Radio => &mut ui.radio.table,
        _ => &mut ui.playlist_table,
    };
    f.render_stateful_widget(table, area, state);
}

pub(super) fn header() -> Row<'static> {
    Row::new(["Title", "Artist", "Source", ""]).fg(TEXT_DIM).underlined()
}

pub(super) fn widths() -> [Constraint; 4] {
    [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(9),
        Constraint::Length(3),
    ]
}

pub(super) fn rows(tracks: &[Arc<TrackRecord>]) -> Vec<Row<'static>> {
    tracks
        .iter()
        .map(|track| {
            let badge = match track.is_playable() {
                true => "♪",
                false => " ",
            };
            Row::new([
                track.title.clone(),
                track.artist.clone(),
                track.origin.label().to_string(),
                badge.to_string(),
            ])
        })
        .collect()
}
