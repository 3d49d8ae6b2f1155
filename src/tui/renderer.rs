use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
};

use crate::{
    player::{PlaybackEngine, VisualizerSampler},
    tui::{ACCENT, TEXT_DIM, widgets},
    ui_state::{InputMode, UiState, View},
};

pub fn render(
    f: &mut Frame,
    ui: &mut UiState,
    engine: &PlaybackEngine,
    vis: &mut VisualizerSampler,
) {
    let [tabs_area, main_area, player_area, buffer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(5),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_tabs(f, tabs_area, ui);

    let [sidebar_area, content_area] =
        Layout::horizontal([Constraint::Length(24), Constraint::Min(20)]).areas(main_area);

    widgets::sidebar(f, sidebar_area, ui, engine);

    match ui.view {
        View::Search => widgets::search_view(f, content_area, ui),
        _ => widgets::track_view(f, content_area, ui),
    }

    widgets::player_bar(f, player_area, engine, vis);
    widgets::buffer_line(f, buffer_area, ui, engine);

    if matches!(
        ui.input_mode,
        InputMode::NewPlaylist | InputMode::RenamePlaylist
    ) {
        render_name_popup(f, ui);
    }
}

fn render_tabs(f: &mut Frame, area: Rect, ui: &UiState) {
    let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(v.title())).collect();
    let tabs = Tabs::new(titles)
        .select(ui.view.index())
        .highlight_style(Style::new().fg(ACCENT).bold())
        .divider("|");
    f.render_widget(tabs, area);
}

fn render_name_popup(f: &mut Frame, ui: &UiState) {
    let title = match ui.input_mode {
        InputMode::RenamePlaylist => " Rename playlist ",
        _ => " New playlist ",
    };

    let area = centered_rect(40, 20, f.area());
    f.render_widget(Clear, area);

    let input = Paragraph::new(format!("{}▏", ui.popup_input)).block(
        Block::new()
            .borders(Borders::ALL)
            .border_style(Style::new().fg(ACCENT))
            .title(title)
            .title_bottom(Line::from(" enter: confirm  esc: cancel ").fg(TEXT_DIM)),
    );
    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}
