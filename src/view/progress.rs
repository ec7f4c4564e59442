//! Player bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::model::{PlaybackView, UiState};
use super::utils::format_duration;

pub fn render_player_bar(frame: &mut Frame, area: Rect, playback: &PlaybackView, ui_state: &UiState) {
    let notice = ui_state.notice.clone().unwrap_or_default();

    if !playback.visible {
        let idle = Paragraph::new(" No preview playing — Enter on a melody to listen")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title_bottom(Line::from(format!(" {} ", notice)).right_aligned()),
            );
        frame.render_widget(idle, area);
        return;
    }

    let (title, progress_ms, duration_ms) = match &playback.current {
        Some((info, elapsed)) => (
            format!(" ▶ {} | {}", info.title, info.producer),
            *elapsed,
            info.duration_ms,
        ),
        None => (" ▶ loading preview...".to_string(), 0, 0),
    };

    let autoplay_text = if playback.autoplay { "Autoplay: On" } else { "Autoplay: Off" };
    let controls_info = if notice.is_empty() {
        format!(" {} | ←/→ prev/next | Space stop ", autoplay_text)
    } else {
        format!(" {} | {} ", notice, autoplay_text)
    };

    let time_str = format!("{} / {}", format_duration(progress_ms), format_duration(duration_ms));

    let progress_ratio = if duration_ms > 0 {
        (progress_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", title))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
