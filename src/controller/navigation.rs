//! Navigation-related controller methods (listings, search, filters, cart)

use crate::log_api_result;
use crate::model::{ActiveSection, SelectedItem, SortField};
use super::AppController;

pub const LISTING_LIMIT: u32 = 200;
pub const SEARCH_LIMIT: u32 = 100;

impl AppController {
    pub async fn load_melodies(&self) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.list_melodies(LISTING_LIMIT).await {
                Ok(mut melodies) => {
                    tracing::info!(count = melodies.len(), "Melody catalog loaded");
                    market.mark_melodies_favorite(&mut melodies).await;
                    model.set_melody_listing(" Melodies ", melodies).await;
                    let mut ui_state = model.ui_state.lock().await;
                    ui_state.active_section = ActiveSection::MainContent;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Melody catalog load failed");
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn load_packs(&self) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.list_packs(LISTING_LIMIT).await {
                Ok(mut packs) => {
                    market.mark_packs_favorite(&mut packs).await;
                    model.set_pack_listing(" Sample Packs ", packs).await;
                    let mut ui_state = model.ui_state.lock().await;
                    ui_state.active_section = ActiveSection::MainContent;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn load_feed(&self) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.recent_melodies(LISTING_LIMIT).await {
                Ok(mut melodies) => {
                    market.mark_melodies_favorite(&mut melodies).await;
                    model.set_melody_listing(" New This Week ", melodies).await;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn load_producers(&self) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.list_producers(LISTING_LIMIT).await {
                Ok(producers) => {
                    model.set_producers(producers).await;
                    let mut ui_state = model.ui_state.lock().await;
                    ui_state.active_section = ActiveSection::MainContent;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn load_favorites(&self) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.list_favorite_melodies().await {
                Ok(mut melodies) => {
                    // Everything here is a favorite by construction
                    market.mark_melodies_favorite(&mut melodies).await;
                    model.set_melody_listing(" Favorites ", melodies).await;
                    let mut ui_state = model.ui_state.lock().await;
                    ui_state.active_section = ActiveSection::MainContent;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn open_producer(&self, producer_id: &str) {
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.get_producer(producer_id).await {
                Ok(mut page) => {
                    market.mark_melodies_favorite(&mut page.melodies).await;
                    market.mark_packs_favorite(&mut page.packs).await;
                    model.set_producer_detail(page).await;
                    let mut ui_state = model.ui_state.lock().await;
                    ui_state.active_section = ActiveSection::MainContent;
                }
                Err(e) => {
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    /// Server-side search seeds a listing; the local filter pipeline still
    /// applies on top of whatever comes back.
    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        let model = self.model.lock().await;
        model.set_content_loading(true).await;

        if let Some(market) = &model.market {
            match market.search_melodies(query, SEARCH_LIMIT).await {
                Ok(mut melodies) => {
                    tracing::info!(query, count = melodies.len(), "Search completed");
                    market.mark_melodies_favorite(&mut melodies).await;
                    model.set_melody_listing(&format!(" Search: {} ", query), melodies).await;
                    model.apply_search_filter(String::new()).await;
                    let mut ui_state = model.ui_state.lock().await;
                    ui_state.active_section = ActiveSection::MainContent;
                }
                Err(e) => {
                    tracing::error!(query, error = %e, "Search failed");
                    model.set_content_loading(false).await;
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    pub async fn open_browse_item(&self, index: usize) {
        match index {
            0 => self.load_melodies().await,
            1 => self.load_packs().await,
            2 => self.load_feed().await,
            3 => self.load_producers().await,
            4 => self.load_favorites().await,
            5 => {
                let model = self.model.lock().await;
                model.open_cart_view().await;
                let mut ui_state = model.ui_state.lock().await;
                ui_state.active_section = ActiveSection::MainContent;
            }
            _ => {}
        }
    }

    pub async fn handle_selected_item(&self, item: SelectedItem) {
        match item {
            SelectedItem::Melody(melody) => {
                self.toggle_preview(melody).await;
            }
            SelectedItem::Pack(pack) => {
                let model = self.model.lock().await;
                let title = pack.title.clone();
                let added = model.toggle_cart_pack(pack).await;
                let verb = if added { "added to" } else { "removed from" };
                model.set_notice(format!("{} {} cart", title, verb)).await;
            }
            SelectedItem::Producer { id } => {
                self.open_producer(&id).await;
            }
            SelectedItem::CartEntry { pack_id } => {
                let model = self.model.lock().await;
                model.remove_cart_entry(&pack_id).await;
            }
        }
    }

    // ========================================================================
    // Filters & sorting
    // ========================================================================

    pub async fn select_sort_field(&self, field: SortField) {
        self.model.lock().await.select_sort_field(field).await;
    }

    pub async fn select_recency_sort(&self) {
        self.model.lock().await.select_recency_sort().await;
    }

    pub async fn select_popularity_sort(&self) {
        self.model.lock().await.select_popularity_sort().await;
    }

    pub async fn select_random_sort(&self) {
        self.model.lock().await.select_random_sort().await;
    }

    pub async fn cycle_key_filter(&self) {
        self.model.lock().await.cycle_key_filter().await;
    }

    pub async fn cycle_genre_filter(&self) {
        self.model.lock().await.cycle_genre_filter().await;
    }

    pub async fn cycle_artist_type_filter(&self) {
        self.model.lock().await.cycle_artist_type_filter().await;
    }

    pub async fn cycle_tempo_filter(&self) {
        self.model.lock().await.cycle_tempo_filter().await;
    }

    pub async fn toggle_exact_tempo_filter(&self) {
        self.model.lock().await.toggle_exact_tempo_filter().await;
    }

    pub async fn clear_filters(&self) {
        self.model.lock().await.clear_filters().await;
    }

    // ========================================================================
    // Cart & checkout
    // ========================================================================

    pub async fn checkout(&self) {
        let model = self.model.lock().await;
        let pack_ids = model.cart_pack_ids().await;
        if pack_ids.is_empty() {
            model.set_notice("Cart is empty".to_string()).await;
            return;
        }

        if let Some(market) = &model.market {
            let result = market.create_order(&pack_ids).await;
            log_api_result!("create_order", result);
            match result {
                Ok(receipt) => {
                    model.clear_cart().await;
                    model.set_checkout_receipt(receipt).await;
                }
                Err(e) => {
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }
}
