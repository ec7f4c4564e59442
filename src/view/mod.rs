//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, sidebar with filters)
//! - `content`: Main content area rendering
//! - `progress`: Player bar rendering
//! - `overlays`: Modal overlays (error, help, stats, checkout receipt)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{CartState, CatalogStats, ContentState, PlaybackView, UiState};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        playback: &PlaybackView,
        ui_state: &UiState,
        content_state: &ContentState,
        cart: &CartState,
        stats: Option<&CatalogStats>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + viewer
                Constraint::Min(0),    // Main content (sidebar + content)
                Constraint::Length(3), // Player bar
            ])
            .split(frame.area());

        // Top bar: Search + Viewer
        layout::render_top_bar(frame, chunks[0], ui_state);

        // Middle: Sidebar (Browse + Filters) and Main Content
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(26), // Sidebar
                Constraint::Percentage(74), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ui_state, cart);

        let playing_id = playback.current.as_ref().map(|(info, _)| info.melody_id.as_str());
        content::render_main_content(frame, main_chunks[1], ui_state, content_state, cart, playing_id);

        // Bottom: Player bar with preview progress
        progress::render_player_bar(frame, chunks[2], playback, ui_state);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Checkout receipt overlay (if an order was just created)
        if ui_state.checkout_receipt.is_some() {
            overlays::render_checkout_receipt(frame, ui_state);
        }

        // Stats popup overlay (if open)
        if ui_state.show_stats_popup {
            overlays::render_stats_popup(frame, stats);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
