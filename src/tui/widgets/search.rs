use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Paragraph, Table},
};

use crate::{
    tui::{ACCENT, TEXT_DIM, widgets::track_table},
    ui_state::{InputMode, UiState},
};

pub(crate) fn search_view(f: &mut Frame, area: Rect, ui: &mut UiState) {
    let [input_area, suggestion_area, results_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    let focused = ui.input_mode == InputMode::Search;
    let cursor = match focused {
        true => "▏",
        false => "",
    };

    let input = Paragraph::new(format!("{}{cursor}", ui.search.input)).block(
        Block::new()
            .borders(Borders::ALL)
            .border_style(match focused {
                true => Style::new().fg(ACCENT),
                false => Style::new(),
            })
            .title(" Search ")
            .title_bottom(
                Line::from(match focused {
                    true => " enter: search  tab: complete  esc: done ",
                    false => " /: edit query ",
                })
                .fg(TEXT_DIM),
            ),
    );
    f.render_widget(input, input_area);

    if focused && !ui.search.suggestions.is_empty() {
        let line = format!("  ≈ {}", ui.search.suggestions.join("  ·  "));
        f.render_widget(Paragraph::new(line).fg(TEXT_DIM), suggestion_area);
    }

    let title = match ui.search.last_query.is_empty() {
        true => " Results ".to_string(),
        false => format!(" Results for \"{}\" ", ui.search.last_query),
    };
    let block = Block::new().borders(Borders::ALL).title(title);

    if ui.search.results.is_empty() {
        let hint = match (ui.search.pending, ui.search.last_query.is_empty()) {
            (true, _) => "Searching…",
            (false, true) => "Type a query to search Spotify and YouTube",
            (false, false) => "No results. Try again later or refine the query.",
        };
        f.render_widget(Paragraph::new(hint).fg(TEXT_DIM).block(block), results_area);
        return;
    }

    let table = Table::new(track_table::rows(&ui.search.results), track_table::widths())
        .header(track_table::header())
        .block(block)
        .row_highlight_style(Style::new().fg(ACCENT).bold())
        .highlight_symbol("▶ ");

    f.render_stateful_widget(table, results_area, &mut ui.search.table);
}
