//! Main content area rendering (listings, producer pages, cart)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    paginate, ActiveSection, CartState, ContentState, ContentView, Melody, Pack,
    ProducerProfile, ProducerSection, UiState, PAGE_SIZE,
};
use super::utils::{
    calculate_num_width, format_count, format_duration, format_price, render_scrollable_list,
    truncate_string,
};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    cart: &CartState,
    playing_id: Option<&str>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new(
                "Pick a section in Browse and press Enter\n\nUse Tab to move between sections\nUse ↑/↓ to select items\nPress H for all keybindings",
            )
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
            frame.render_widget(content, area);
        }
        ContentView::Melodies { title, displayed, selected, .. } => {
            render_melody_list(frame, area, title, displayed, *selected, is_focused, playing_id);
        }
        ContentView::Packs { title, displayed, selected, .. } => {
            render_pack_list(frame, area, title, displayed, *selected, is_focused, cart);
        }
        ContentView::Producers { producers, selected } => {
            render_producer_list(frame, area, producers, *selected, is_focused);
        }
        ContentView::ProducerDetail {
            profile,
            displayed,
            packs,
            section,
            melody_index,
            pack_index,
            ..
        } => {
            render_producer_detail(
                frame,
                area,
                profile,
                displayed,
                packs,
                *section,
                *melody_index,
                *pack_index,
                is_focused,
                playing_id,
                cart,
            );
        }
        ContentView::Cart { selected } => {
            render_cart(frame, area, cart, *selected, is_focused);
        }
    }
}

fn row_style(is_selected: bool, is_focused: bool, is_playing: bool) -> Style {
    if is_selected && is_focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_playing {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn melody_items(
    melodies: &[Melody],
    page_start: usize,
    total: usize,
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(total);
    // num + fav(2) + bpm(4) + key(4) + plays(6) + duration(6) + separators
    let fixed_width = 1 + num_width + 3 + 2 + 3 + 3 + 3 + 4 + 3 + 4 + 3 + 8 + 3 + 6 + 3 + 6;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let producer_width = remaining_width.saturating_sub(title_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {}   {:<title_width$}   {:<producer_width$}   {:>4}   {:<4}   {:<8}   {:>6}   {:>6}",
            "#", "  ", "Title", "Producer", "BPM", "Key", "Genre", "Plays", "Length",
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let melody_rows: Vec<ListItem> = melodies
        .iter()
        .enumerate()
        .map(|(i, melody)| {
            let index = page_start + i;
            let is_playing = playing_id.is_some_and(|id| id == melody.id);
            let style = row_style(index == selected, is_focused, is_playing);

            let favorite_indicator = if melody.favorite { "♥" } else { " " };
            let playing_indicator = if is_playing { "▶" } else { " " };
            let num = format!("{}{:<num_width$}", playing_indicator, index + 1);

            ListItem::new(format!(
                "{}   {}    {}   {}   {:>4}   {:<4}   {}   {:>6}   {:>6}",
                num,
                favorite_indicator,
                truncate_string(&melody.title, title_width),
                truncate_string(&melody.producer, producer_width),
                melody.bpm,
                truncate_string(&melody.musical_key, 4),
                truncate_string(&melody.genre, 8),
                format_count(melody.plays),
                format_duration(melody.duration_ms),
            ))
            .style(style)
        })
        .collect();

    items.extend(melody_rows);
    items
}

fn render_melody_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    displayed: &[Melody],
    selected: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if displayed.is_empty() {
        let empty = Paragraph::new("  No melodies match the active filters")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let page = paginate(displayed, selected / PAGE_SIZE);
    let page_start = page.index * PAGE_SIZE;
    let content_width = area.width.saturating_sub(4) as usize;

    let items = melody_items(
        page.entries,
        page_start,
        displayed.len(),
        selected,
        is_focused,
        playing_id,
        content_width,
    );

    let page_info = format!(" {} · page {}/{} ", displayed.len(), page.index + 1, page.count);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_bottom(Line::from(page_info).right_aligned())
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected - page_start + 1, block);
}

fn render_pack_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    displayed: &[Pack],
    selected: usize,
    is_focused: bool,
    cart: &CartState,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if displayed.is_empty() {
        let empty = Paragraph::new("  No packs match the active filters")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let page = paginate(displayed, selected / PAGE_SIZE);
    let page_start = page.index * PAGE_SIZE;
    let content_width = area.width.saturating_sub(4) as usize;

    let num_width = calculate_num_width(displayed.len());
    let fixed_width = 1 + num_width + 3 + 2 + 3 + 3 + 3 + 8 + 3 + 6 + 3 + 8;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let producer_width = remaining_width.saturating_sub(title_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {}   {:<title_width$}   {:<producer_width$}   {:<8}   {:>6}   {:>8}",
            "#", "  ", "Pack", "Producer", "Genre", "Tracks", "Price",
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let pack_rows: Vec<ListItem> = page
        .entries
        .iter()
        .enumerate()
        .map(|(i, pack)| {
            let index = page_start + i;
            let style = row_style(index == selected, is_focused, false);
            let in_cart = if cart.contains(&pack.id) { "◼" } else { " " };
            let favorite_indicator = if pack.favorite { "♥" } else { " " };

            ListItem::new(format!(
                " {:<num_width$}   {}{}   {}   {}   {:<8}   {:>6}   {:>8}",
                index + 1,
                in_cart,
                favorite_indicator,
                truncate_string(&pack.title, title_width),
                truncate_string(&pack.producer, producer_width),
                truncate_string(&pack.genre, 8),
                pack.melody_count,
                format_price(pack.price_cents),
            ))
            .style(style)
        })
        .collect();
    items.extend(pack_rows);

    let page_info = format!(" {} · page {}/{} ", displayed.len(), page.index + 1, page.count);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_bottom(Line::from(page_info).right_aligned())
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected - page_start + 1, block);
}

fn render_producer_list(
    frame: &mut Frame,
    area: Rect,
    producers: &[ProducerProfile],
    selected: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if producers.is_empty() {
        let empty = Paragraph::new("  No producers found")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Producers ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(producers.len());
    let fixed_width = 1 + num_width + 3 + 3 + 12 + 3 + 8 + 3 + 5 + 3 + 6;
    let name_width = content_width.saturating_sub(fixed_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {:<name_width$}   {:<12}   {:>8}   {:>5}   {:>6}",
            "#", "Producer", "Type", "Melodies", "Packs", "Plays",
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let producer_rows: Vec<ListItem> = producers
        .iter()
        .enumerate()
        .map(|(i, producer)| {
            let style = row_style(i == selected, is_focused, false);
            ListItem::new(format!(
                " {:<num_width$}   {}   {:<12}   {:>8}   {:>5}   {:>6}",
                i + 1,
                truncate_string(&producer.name, name_width),
                truncate_string(&producer.artist_type, 12),
                producer.melody_count,
                producer.pack_count,
                format_count(producer.total_plays),
            ))
            .style(style)
        })
        .collect();
    items.extend(producer_rows);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Producers ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected + 1, block);
}

fn render_producer_detail(
    frame: &mut Frame,
    area: Rect,
    profile: &ProducerProfile,
    displayed: &[Melody],
    packs: &[Pack],
    section: ProducerSection,
    melody_index: usize,
    pack_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
    cart: &CartState,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Profile header
            Constraint::Min(0),    // Melodies / packs
        ])
        .split(area);

    let header_lines = vec![
        Line::from(Span::styled(
            profile.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} · {} melodies · {} packs · {} plays · joined {}",
                profile.artist_type,
                profile.melody_count,
                profile.pack_count,
                format_count(profile.total_plays),
                profile.joined_at.format("%b %Y"),
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let header = Paragraph::new(header_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .border_style(border_style),
    );
    frame.render_widget(header, chunks[0]);

    match section {
        ProducerSection::Melodies => {
            let title = format!(" Melodies ({}) · ←/→ packs ", displayed.len());
            render_melody_list(
                frame,
                chunks[1],
                &title,
                displayed,
                melody_index,
                is_focused,
                playing_id,
            );
        }
        ProducerSection::Packs => {
            let title = format!(" Packs ({}) · ←/→ melodies ", packs.len());
            render_pack_list(frame, chunks[1], &title, packs, pack_index, is_focused, cart);
        }
    }
}

fn render_cart(frame: &mut Frame, area: Rect, cart: &CartState, selected: usize, is_focused: bool) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if cart.is_empty() {
        let empty = Paragraph::new("  Cart is empty — Enter on a pack adds it")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Cart ")
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(cart.len());
    let fixed_width = 1 + num_width + 3 + 3 + 8;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 60) / 100;
    let producer_width = remaining_width.saturating_sub(title_width);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {:<title_width$}   {:<producer_width$}{:>8}",
            "#", "Pack", "Producer", "Price",
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    ];

    let cart_rows: Vec<ListItem> = cart
        .entries()
        .iter()
        .enumerate()
        .map(|(i, pack)| {
            let style = row_style(i == selected, is_focused, false);
            ListItem::new(format!(
                " {:<num_width$}   {}   {}{:>8}",
                i + 1,
                truncate_string(&pack.title, title_width),
                truncate_string(&pack.producer, producer_width),
                format_price(pack.price_cents),
            ))
            .style(style)
        })
        .collect();
    items.extend(cart_rows);

    let footer = format!(
        " total {} · Enter removes · U checks out ",
        format_price(cart.total_cents())
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Cart ")
        .title_bottom(Line::from(footer).right_aligned())
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected + 1, block);
}
