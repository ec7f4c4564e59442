//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, SortField};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Checkout receipt popup
        if model.is_checkout_receipt_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_checkout_receipt().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        // Stats popup
        if model.is_stats_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('S') => {
                    model.hide_stats_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            };
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    drop(model);
                    if !query.is_empty() {
                        self.perform_search(&query).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.update_search_query(String::new()).await;
                    model.apply_search_filter(String::new()).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    let query = model.get_ui_state().await.search_query;
                    model.apply_search_filter(query).await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    // Typing filters the current listing as-you-go
                    model.append_to_search(c).await;
                    let query = model.get_ui_state().await.search_query;
                    model.apply_search_filter(query).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Arrow keys drive the player only while it is visible
        if model.is_player_visible().await {
            match key.code {
                KeyCode::Left => {
                    drop(model);
                    self.previous_preview().await;
                    return Ok(());
                }
                KeyCode::Right => {
                    drop(model);
                    self.next_preview().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::PageUp => {
                    model.content_move_page(false).await;
                    return Ok(());
                }
                KeyCode::PageDown => {
                    model.content_move_page(true).await;
                    return Ok(());
                }
                KeyCode::Left | KeyCode::Right => {
                    // Player hidden: toggles between a producer's melodies and packs
                    model.navigate_detail_section().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('f') | KeyCode::Char('F') => {
                    drop(model);
                    self.toggle_favorite_selected().await;
                    return Ok(());
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    drop(model);
                    self.download_selected_melody().await;
                    return Ok(());
                }
                // Sorting
                KeyCode::Char('1') => {
                    drop(model);
                    self.select_sort_field(SortField::Title).await;
                    return Ok(());
                }
                KeyCode::Char('2') => {
                    drop(model);
                    self.select_sort_field(SortField::Producer).await;
                    return Ok(());
                }
                KeyCode::Char('3') => {
                    drop(model);
                    self.select_sort_field(SortField::Bpm).await;
                    return Ok(());
                }
                KeyCode::Char('4') => {
                    drop(model);
                    self.select_sort_field(SortField::MusicalKey).await;
                    return Ok(());
                }
                KeyCode::Char('5') => {
                    drop(model);
                    self.select_sort_field(SortField::Genre).await;
                    return Ok(());
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    drop(model);
                    self.select_recency_sort().await;
                    return Ok(());
                }
                KeyCode::Char('o') | KeyCode::Char('O') => {
                    drop(model);
                    self.select_popularity_sort().await;
                    return Ok(());
                }
                KeyCode::Char('z') | KeyCode::Char('Z') => {
                    drop(model);
                    self.select_random_sort().await;
                    return Ok(());
                }
                // Filters
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    drop(model);
                    self.cycle_key_filter().await;
                    return Ok(());
                }
                KeyCode::Char('g') | KeyCode::Char('G') => {
                    drop(model);
                    self.cycle_genre_filter().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    drop(model);
                    self.cycle_artist_type_filter().await;
                    return Ok(());
                }
                KeyCode::Char('t') | KeyCode::Char('T') => {
                    drop(model);
                    self.cycle_tempo_filter().await;
                    return Ok(());
                }
                KeyCode::Char('e') | KeyCode::Char('E') => {
                    drop(model);
                    self.toggle_exact_tempo_filter().await;
                    return Ok(());
                }
                KeyCode::Char('x') | KeyCode::Char('X') => {
                    drop(model);
                    self.clear_filters().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.browse_move_up().await;
            }
            KeyCode::Down => {
                model.browse_move_down().await;
            }
            KeyCode::Enter => {
                let ui_state = model.get_ui_state().await;
                if ui_state.active_section == ActiveSection::Browse {
                    let selected = ui_state.browse_selected;
                    drop(model);
                    self.open_browse_item(selected).await;
                    return Ok(());
                }
            }
            // Stop the current preview
            KeyCode::Char(' ') => {
                if model.playing_id().await.is_some() {
                    drop(model);
                    self.stop_preview().await;
                    return Ok(());
                }
            }
            // Next / previous preview
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_preview().await;
                return Ok(());
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.previous_preview().await;
                return Ok(());
            }
            // Cart & checkout
            KeyCode::Char('c') | KeyCode::Char('C') => {
                model.open_cart_view().await;
                model.set_active_section(ActiveSection::MainContent).await;
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.checkout().await;
                return Ok(());
            }
            // Focus search / browse
            KeyCode::Char('/') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                model.set_active_section(ActiveSection::Browse).await;
            }
            // Popups
            KeyCode::Char('s') | KeyCode::Char('S') => {
                model.show_stats_popup().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
