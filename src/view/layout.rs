//! Layout rendering (top bar, sidebar with browse list and filter panel)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, CartState, UiState};
use super::utils::format_price;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(28), // Viewer
        ])
        .split(area);

    let search_style = if ui_state.active_section == ActiveSection::Search {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type to filter, Enter to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if ui_state.active_section == ActiveSection::Search {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let viewer_text = match &ui_state.viewer {
        Some(viewer) if viewer.pro => format!("♪ @{} · Pro", viewer.handle),
        Some(viewer) => format!("♪ @{}", viewer.handle),
        None => "♪ not signed in".to_string(),
    };
    let viewer = Paragraph::new(viewer_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Viewer "));
    frame.render_widget(viewer, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState, cart: &CartState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Browse (6 items + 2 borderlines)
            Constraint::Min(0),    // Active filters / sort
        ])
        .split(area);

    let browse_items: Vec<ListItem> = ui_state
        .browse_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let label = if item.name == "Cart" && !cart.is_empty() {
                format!("{} ({})", item.name, cart.len())
            } else {
                item.name.clone()
            };
            let style = if i == ui_state.browse_selected
                && ui_state.active_section == ActiveSection::Browse
            {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if i == ui_state.browse_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(label).style(style)
        })
        .collect();

    let browse_border_style = if ui_state.active_section == ActiveSection::Browse {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let browse = List::new(browse_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Browse ")
            .padding(Padding::horizontal(1))
            .border_style(browse_border_style),
    );
    frame.render_widget(browse, chunks[0]);

    render_filter_panel(frame, chunks[1], ui_state, cart);
}

/// Read-only summary of the active filter and sort criteria; the values
/// themselves are driven by keybindings.
fn render_filter_panel(frame: &mut Frame, area: Rect, ui_state: &UiState, cart: &CartState) {
    let filter = &ui_state.filter;

    let set_style = Style::default().fg(Color::Yellow);
    let unset_style = Style::default().fg(Color::DarkGray);

    let row = |label: &str, value: Option<String>| -> Line<'static> {
        match value {
            Some(v) => Line::styled(format!("{:<7} {}", label, v), set_style),
            None => Line::styled(format!("{:<7} any", label), unset_style),
        }
    };

    let mut lines = vec![
        row("key", filter.musical_key.clone()),
        row("genre", filter.genre.clone()),
        row("artist", filter.artist_type.clone()),
        row("tempo", filter.tempo.map(|t| t.label())),
        row(
            "query",
            if filter.query.is_empty() { None } else { Some(filter.query.clone()) },
        ),
        Line::raw(""),
        Line::styled(
            format!("sort    {}", ui_state.sort.label()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    if !cart.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("cart    {} · {}", cart.len(), format_price(cart.total_cents())),
            Style::default().fg(Color::Magenta),
        ));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Filters ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(panel, area);
}
