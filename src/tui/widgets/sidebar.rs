use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Borders, List, ListItem},
};

use crate::{
    player::PlaybackEngine,
    tui::{ACCENT, TEXT_DIM},
    ui_state::{UiState, View},
};

/// Playlist rail with track counts.
pub(crate) fn sidebar(f: &mut Frame, area: Rect, ui: &mut UiState, engine: &PlaybackEngine) {
    let playing_key = engine.current().map(|t| t.identity_key());

    let items: Vec<ListItem> = ui
        .playlists
        .iter()
        .map(|playlist| {
            // dot marks playlists holding the loaded track
            let marker = match playing_key {
                Some(key) if playlist.contains(key) => "•",
                _ => " ",
            };
            ListItem::new(format!(
                "{marker} {} ({})",
                playlist.name,
                playlist.tracks.len()
            ))
        })
        .collect();

    let focused = ui.view == View::Playlists;
    let mut footer = String::new();
    if let Some(track) = engine.current() {
        footer = format!(" {} ", track.origin.label());
    }

    let list = List::new(items)
        .block(
            Block::new()
                .borders(Borders::ALL)
                .border_style(match focused {
                    true => Style::new().fg(ACCENT),
                    false => Style::new(),
                })
                .title(" Playlists ")
                .title_bottom(Line::from(footer).fg(TEXT_DIM)),
        )
        .highlight_style(Style::new().fg(ACCENT).bold())
        .highlight_symbol("› ");

    f.render_stateful_widget(list, area, &mut ui.playlist_pos);
}
