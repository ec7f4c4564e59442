//! Core type definitions for the application

use std::time::Instant;
use serde::Deserialize;

use super::catalog::{FilterState, SortMode};
use super::content::{Melody, Pack};

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Browse,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Browse,
            ActiveSection::Browse => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Browse => ActiveSection::Search,
            ActiveSection::MainContent => ActiveSection::Browse,
        }
    }
}

/// An entry in the Browse sidebar
#[derive(Clone, Debug)]
pub struct BrowseItem {
    pub name: String,
}

/// The authenticated viewer, as returned at session establishment.
#[derive(Clone, Debug, Deserialize)]
pub struct ViewerProfile {
    pub id: String,
    pub handle: String,
    pub role: String,
    #[serde(default)]
    pub pro: bool,
}

/// Receipt returned by the order endpoint; the payment URL is surfaced to
/// the viewer, payment collection itself happens at the provider.
#[derive(Clone, Debug, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub total_cents: u64,
    pub payment_url: String,
}

/// Represents a selected item for action handling
#[derive(Clone, Debug)]
pub enum SelectedItem {
    Melody(Melody),
    Pack(Pack),
    Producer { id: String },
    CartEntry { pack_id: String },
}

/// Packs the viewer intends to buy. Adds are idempotent per pack id.
#[derive(Clone, Debug, Default)]
pub struct CartState {
    entries: Vec<Pack>,
}

impl CartState {
    pub fn contains(&self, pack_id: &str) -> bool {
        self.entries.iter().any(|p| p.id == pack_id)
    }

    /// Add if absent, remove if present. Returns true when the pack ended
    /// up in the cart.
    pub fn toggle(&mut self, pack: Pack) -> bool {
        if let Some(pos) = self.entries.iter().position(|p| p.id == pack.id) {
            self.entries.remove(pos);
            false
        } else {
            self.entries.push(pack);
            true
        }
    }

    pub fn remove(&mut self, pack_id: &str) {
        self.entries.retain(|p| p.id != pack_id);
    }

    pub fn entries(&self) -> &[Pack] {
        &self.entries
    }

    pub fn pack_ids(&self) -> Vec<String> {
        self.entries.iter().map(|p| p.id.clone()).collect()
    }

    pub fn total_cents(&self) -> u64 {
        self.entries.iter().map(|p| p.price_cents).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub browse_items: Vec<BrowseItem>,
    pub browse_selected: usize,
    pub filter: FilterState,
    pub sort: SortMode,
    pub viewer: Option<ViewerProfile>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub notice: Option<String>,
    pub notice_timestamp: Option<Instant>,
    pub checkout_receipt: Option<OrderReceipt>,
    pub show_help_popup: bool,
    pub show_stats_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Browse,
            search_query: String::new(),
            browse_items: vec![
                BrowseItem { name: "Melodies".to_string() },
                BrowseItem { name: "Sample Packs".to_string() },
                BrowseItem { name: "New This Week".to_string() },
                BrowseItem { name: "Producers".to_string() },
                BrowseItem { name: "Favorites".to_string() },
                BrowseItem { name: "Cart".to_string() },
            ],
            browse_selected: 0,
            filter: FilterState::default(),
            sort: SortMode::default(),
            viewer: None,
            error_message: None,
            error_timestamp: None,
            notice: None,
            notice_timestamp: None,
            checkout_receipt: None,
            show_help_popup: false,
            show_stats_popup: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pack(id: &str, price_cents: u64) -> Pack {
        Pack {
            id: id.to_string(),
            title: format!("Pack {}", id),
            producer: "prodigy".to_string(),
            genre: "trap".to_string(),
            cover_url: String::new(),
            price_cents,
            melody_count: 10,
            plays: 0,
            created_at: Utc::now(),
            favorite: false,
        }
    }

    #[test]
    fn section_cycling_round_trips() {
        let mut section = ActiveSection::Search;
        for _ in 0..3 {
            section = section.next();
        }
        assert_eq!(section, ActiveSection::Search);
        assert_eq!(ActiveSection::Browse.next().prev(), ActiveSection::Browse);
    }

    #[test]
    fn cart_toggle_is_involutive() {
        let mut cart = CartState::default();
        assert!(cart.toggle(pack("p1", 1999)));
        assert!(cart.contains("p1"));
        assert!(!cart.toggle(pack("p1", 1999)));
        assert!(cart.is_empty());
    }

    #[test]
    fn cart_totals_sum_entry_prices() {
        let mut cart = CartState::default();
        cart.toggle(pack("p1", 1999));
        cart.toggle(pack("p2", 2500));
        assert_eq!(cart.total_cents(), 4499);
        cart.remove("p1");
        assert_eq!(cart.total_cents(), 2500);
        assert_eq!(cart.pack_ids(), vec!["p2".to_string()]);
    }
}
