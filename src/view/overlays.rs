//! Overlay rendering (error notification, checkout receipt, stats, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::model::{CatalogStats, UiState};
use super::utils::format_count;

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.width.saturating_sub(popup_width) / 2,
        y: area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    }
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        // Fixed width popup (responsive to screen size)
        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4) as usize; // account for borders

        // Calculate how many lines the error message will take when wrapped
        let error_line_count = ((error_msg.chars().count() as f32) / (inner_width as f32)).ceil() as u16;
        let popup_height = (2 + error_line_count.max(1)).min(area.height - 4);

        let popup_area = centered_popup(area, popup_width, popup_height);

        // Clear the area behind the popup first
        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(Color::Black)),
            );

        frame.render_widget(error_widget, popup_area);
    }
}

pub fn render_checkout_receipt(frame: &mut Frame, ui_state: &UiState) {
    let Some(ref receipt) = ui_state.checkout_receipt else {
        return;
    };
    let area = frame.area();

    let lines = vec![
        Line::from(Span::styled(
            format!("Order {} created", receipt.order_id),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(format!("Total: ${}.{:02}", receipt.total_cents / 100, receipt.total_cents % 100)),
        Line::raw(""),
        Line::from("Complete the payment at:"),
        Line::from(Span::styled(
            receipt.payment_url.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        )),
    ];

    let popup_width = (receipt.payment_url.len() as u16 + 6).max(40);
    let popup_area = centered_popup(area, popup_width, lines.len() as u16 + 2);

    frame.render_widget(Clear, popup_area);

    let receipt_widget = Paragraph::new(lines)
        .wrap(ratatui::widgets::Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Checkout (Esc to close) ")
                .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(receipt_widget, popup_area);
}

pub fn render_stats_popup(frame: &mut Frame, stats: Option<&CatalogStats>) {
    let area = frame.area();

    let mut lines: Vec<Line> = Vec::new();
    match stats {
        Some(stats) => {
            lines.push(Line::from(format!("Items:        {}", stats.total)));
            lines.push(Line::from(format!("Total plays:  {}", format_count(stats.total_plays))));
            match stats.mean_bpm {
                Some(mean) => lines.push(Line::from(format!("Mean BPM:     {:.0}", mean))),
                None => lines.push(Line::from("Mean BPM:     -")),
            }
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                "Genres",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            for (genre, count) in stats.genres.iter().take(8) {
                lines.push(Line::from(format!("  {:<12} {}", genre, count)));
            }
        }
        None => {
            lines.push(Line::from("No listing loaded"));
        }
    }

    let popup_area = centered_popup(area, 36, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let stats_widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Catalog Stats (S or Esc to close) ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(stats_widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    // Define keybindings organized by category
    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("PgUp / PgDn", "Jump a page"),
        ("Enter", "Play / open / add to cart"),
        ("Backspace / Esc", "Go back"),
        ("/", "Focus search"),
        ("B", "Focus browse"),
        ("", ""),
        ("", "── Preview ──"),
        ("← / →", "Previous / next (player open)"),
        ("P / N", "Previous / next"),
        ("Space", "Stop preview"),
        ("", ""),
        ("", "── Filter & sort ──"),
        ("K / G / A / T", "Cycle key/genre/artist/tempo"),
        ("E", "Pin exact tempo of selection"),
        ("X", "Clear all filters"),
        ("1-5", "Sort by title/producer/bpm/key/genre"),
        ("R / O / Z", "Recent / popular / random"),
        ("", ""),
        ("", "── Actions ──"),
        ("F", "Favorite / unfavorite"),
        ("D", "Download melody"),
        ("C", "Open cart"),
        ("U", "Checkout"),
        ("S", "Catalog stats"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_width = 62;
    let popup_height = (keybindings.len() as u16 + 2).min(area.height - 4);
    let popup_area = centered_popup(area, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    // Create help text lines
    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
