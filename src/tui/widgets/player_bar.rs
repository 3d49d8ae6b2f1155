use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
};

use crate::{
    DurationStyle, get_readable_duration,
    player::{PlaybackEngine, PlaybackStatus, RepeatMode, VisualizerSampler},
    tui::{ACCENT, BG_PANEL, TEXT_DIM, TEXT_ERR},
    ui_state::UiState,
};

pub(crate) fn player_bar(
    f: &mut Frame,
    area: Rect,
    engine: &PlaybackEngine,
    vis: &mut VisualizerSampler,
) {
    let block = Block::new().borders(Borders::TOP).border_style(Style::new().fg(TEXT_DIM));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [progress_area, info_area, vis_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
    ])
    .areas(inner);

    render_progress(f, progress_area, engine);
    render_info(f, info_area, engine);
    render_visualizer(f, vis_area, engine, vis);
}

fn render_progress(f: &mut Frame, area: Rect, engine: &PlaybackEngine) {
    let position = engine.position();
    let elapsed = get_readable_duration(position, DurationStyle::Compact);

    let (ratio, label) = match engine.duration() {
        Some(duration) if !duration.is_zero() => {
            let total = get_readable_duration(duration, DurationStyle::Compact);
            (
                (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0),
                format!("{elapsed} / {total}"),
            )
        }
        _ => match engine.status() {
            // live streams report no duration
            PlaybackStatus::Playing | PlaybackStatus::Paused => (1.0, format!("{elapsed} · LIVE")),
            _ => (0.0, elapsed),
        },
    };

    let gauge = Gauge::default()
        .ratio(ratio)
        .label(label)
        .gauge_style(Style::new().fg(ACCENT).bg(BG_PANEL))
        .use_unicode(true);
    f.render_widget(gauge, area);
}

fn render_info(f: &mut Frame, area: Rect, engine: &PlaybackEngine) {
    let mut spans: Vec<Span> = Vec::new();

    match engine.current() {
        Some(track) => {
            spans.push(Span::from(track.title.clone()).bold());
            if !track.artist.is_empty() {
                spans.push(Span::from(format!("  {}", track.artist)).fg(TEXT_DIM));
            }
            if let Some(url) = track.external_url() {
                spans.push(Span::from(format!("  ↗ {url}")).fg(TEXT_DIM));
            }
        }
        None => spans.push(Span::from("Nothing playing").fg(TEXT_DIM)),
    }

    let mut flags = Vec::new();
    if engine.has_previous() {
        flags.push("⏮".to_string());
    }
    flags.push(status_glyph(engine.status()).to_string());
    if engine.has_next() {
        flags.push("⏭".to_string());
    }
    if engine.shuffle_enabled() {
        flags.push("⤨".to_string());
    }
    if engine.repeat() != RepeatMode::None {
        flags.push(engine.repeat().glyph().to_string());
    }
    if engine.is_favorite() {
        flags.push("♥".to_string());
    }
    flags.push(format!("vol {:>3}%", engine.volume()));
    let flags = flags.join("  ");

    let [left_area, right_area] = Layout::horizontal([
        Constraint::Min(10),
        Constraint::Length(flags.chars().count() as u16 + 1),
    ])
    .areas(area);

    f.render_widget(Paragraph::new(Line::from(spans)), left_area);
    f.render_widget(Paragraph::new(Line::from(flags).fg(ACCENT)), right_area);
}

fn render_visualizer(
    f: &mut Frame,
    area: Rect,
    engine: &PlaybackEngine,
    vis: &mut VisualizerSampler,
) {
    let metrics = engine.metrics();
    let bars = vis.sample(&metrics);
    let data: Vec<u64> = bars.iter().map(|&b| b as u64).collect();

    let sparkline = Sparkline::default()
        .data(data)
        .max(100)
        .style(Style::new().fg(ACCENT).bg(BG_PANEL));
    f.render_widget(sparkline, area);
}

fn status_glyph(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "▶",
        PlaybackStatus::Paused => "⏸",
        PlaybackStatus::Loading => "…",
        PlaybackStatus::Errored => "!",
        PlaybackStatus::Idle => "■",
    }
}

/// Bottom status line: surfaced errors win over the key hints.
pub(crate) fn buffer_line(f: &mut Frame, area: Rect, ui: &UiState, engine: &PlaybackEngine) {
    let line = match ui.error.as_deref().or(engine.last_error()) {
        Some(message) => Line::from(format!(" {message}  (esc to dismiss)")).fg(TEXT_ERR),
        None => Line::from(
            " enter play · space pause · n/p track · ←/→ seek · f favorite · s shuffle · r repeat · q quit ",
        )
        .fg(TEXT_DIM),
    };
    f.render_widget(Paragraph::new(line), area);
}
