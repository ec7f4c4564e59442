//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::catalog::{
    build_view, catalog_stats, CatalogStats, FilterState, SortField, SortMode, TempoFilter, PAGE_SIZE,
};
use super::content::{ContentState, ContentView, Melody, Pack, ProducerSection};
use super::market_client::{MarketClient, ProducerPage};
use super::playback::{NowPlaying, PlaybackView, PlayerState, PreviewSession};
use super::types::{ActiveSection, CartState, OrderReceipt, SelectedItem, UiState, ViewerProfile};

const NOTIFICATION_TTL_SECS: u64 = 5;

/// Tempo presets the tempo filter key cycles through.
const TEMPO_PRESETS: [Option<TempoFilter>; 5] = [
    None,
    Some(TempoFilter::Range { min: None, max: Some(90) }),
    Some(TempoFilter::Range { min: Some(90), max: Some(120) }),
    Some(TempoFilter::Range { min: Some(120), max: Some(150) }),
    Some(TempoFilter::Range { min: Some(150), max: None }),
];

/// Main application model containing all state
pub struct AppModel {
    pub market: Option<MarketClient>,
    preview: Arc<Mutex<Option<PreviewSession>>>,
    player_state: Arc<Mutex<PlayerState>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    cart: Arc<Mutex<CartState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            market: None,
            preview: Arc::new(Mutex::new(None)),
            player_state: Arc::new(Mutex::new(PlayerState::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            cart: Arc::new(Mutex::new(CartState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_market_client(&mut self, client: MarketClient) {
        self.market = Some(client);
    }

    pub async fn get_market_client(&self) -> Option<MarketClient> {
        self.market.clone()
    }

    // ========================================================================
    // UI state & sections
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn set_viewer(&self, viewer: ViewerProfile) {
        let mut state = self.ui_state.lock().await;
        state.viewer = Some(viewer);
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        let mut state = self.ui_state.lock().await;
        state.active_section = section;
    }

    pub async fn browse_move_up(&self) {
        let mut state = self.ui_state.lock().await;
        if state.browse_selected > 0 {
            state.browse_selected -= 1;
        }
    }

    pub async fn browse_move_down(&self) {
        let mut state = self.ui_state.lock().await;
        if state.browse_selected < state.browse_items.len().saturating_sub(1) {
            state.browse_selected += 1;
        }
    }

    pub async fn update_search_query(&self, query: String) {
        let mut state = self.ui_state.lock().await;
        state.search_query = query;
    }

    pub async fn append_to_search(&self, c: char) {
        let mut state = self.ui_state.lock().await;
        state.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        let mut state = self.ui_state.lock().await;
        state.search_query.pop();
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn set_notice(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.notice = Some(message);
        state.notice_timestamp = Some(Instant::now());
    }

    pub async fn auto_clear_old_notifications(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > NOTIFICATION_TTL_SECS {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
        if let Some(timestamp) = state.notice_timestamp {
            if timestamp.elapsed().as_secs() > NOTIFICATION_TTL_SECS {
                state.notice = None;
                state.notice_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    pub async fn show_stats_popup(&self) {
        self.ui_state.lock().await.show_stats_popup = true;
    }

    pub async fn hide_stats_popup(&self) {
        self.ui_state.lock().await.show_stats_popup = false;
    }

    pub async fn is_stats_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_stats_popup
    }

    pub async fn set_checkout_receipt(&self, receipt: OrderReceipt) {
        self.ui_state.lock().await.checkout_receipt = Some(receipt);
    }

    pub async fn clear_checkout_receipt(&self) {
        self.ui_state.lock().await.checkout_receipt = None;
    }

    pub async fn is_checkout_receipt_open(&self) -> bool {
        self.ui_state.lock().await.checkout_receipt.is_some()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // Content views
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    /// Install a top-level melody listing (browse, feed, search results,
    /// favorites). Clears the navigation stack and materializes the view
    /// under the active filter and sort.
    pub async fn set_melody_listing(&self, title: &str, items: Vec<Melody>) {
        let (filter, sort) = self.view_criteria().await;
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        let displayed = build_view(&items, &filter, &sort);
        state.view =
            ContentView::Melodies { title: title.to_string(), items, displayed, selected: 0 };
        state.is_loading = false;
    }

    pub async fn set_pack_listing(&self, title: &str, items: Vec<Pack>) {
        let (filter, sort) = self.view_criteria().await;
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        let displayed = build_view(&items, &filter, &sort);
        state.view = ContentView::Packs { title: title.to_string(), items, displayed, selected: 0 };
        state.is_loading = false;
    }

    pub async fn set_producers(&self, producers: Vec<super::content::ProducerProfile>) {
        let mut state = self.content_state.lock().await;
        state.navigation_stack.clear();
        state.view = ContentView::Producers { producers, selected: 0 };
        state.is_loading = false;
    }

    /// Open a producer page, pushing the previous view for Esc/Backspace.
    pub async fn set_producer_detail(&self, page: ProducerPage) {
        let (filter, sort) = self.view_criteria().await;
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        let displayed = build_view(&page.melodies, &filter, &sort);
        state.view = ContentView::ProducerDetail {
            profile: page.profile,
            melodies: page.melodies,
            displayed,
            packs: page.packs,
            section: ProducerSection::Melodies,
            melody_index: 0,
            pack_index: 0,
        };
        state.is_loading = false;
    }

    pub async fn open_cart_view(&self) {
        let mut state = self.content_state.lock().await;
        if !matches!(state.view, ContentView::Empty | ContentView::Cart { .. }) {
            let previous_view = state.view.clone();
            state.navigation_stack.push(previous_view);
        }
        state.view = ContentView::Cart { selected: 0 };
        state.is_loading = false;
    }

    pub async fn navigate_back(&self) -> bool {
        let mut state = self.content_state.lock().await;
        if let Some(previous_view) = state.navigation_stack.pop() {
            state.view = previous_view;
            true
        } else {
            state.view = ContentView::Empty;
            false
        }
    }

    pub async fn navigate_detail_section(&self) {
        let mut state = self.content_state.lock().await;
        if let ContentView::ProducerDetail { section, .. } = &mut state.view {
            *section = section.toggled();
        }
    }

    // ========================================================================
    // View derivation
    // ========================================================================

    async fn view_criteria(&self) -> (FilterState, SortMode) {
        let ui = self.ui_state.lock().await;
        (ui.filter.clone(), ui.sort)
    }

    /// Rebuild the displayed order of the current view from its source
    /// items and the active filter/sort, clamping the selection. Called
    /// after every filter or sort change; the one place a `Random` order
    /// is (re)drawn.
    pub async fn refresh_view(&self) {
        let (filter, sort) = self.view_criteria().await;
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Melodies { items, displayed, selected, .. } => {
                *displayed = build_view(items, &filter, &sort);
                *selected = (*selected).min(displayed.len().saturating_sub(1));
            }
            ContentView::Packs { items, displayed, selected, .. } => {
                *displayed = build_view(items, &filter, &sort);
                *selected = (*selected).min(displayed.len().saturating_sub(1));
            }
            ContentView::ProducerDetail { melodies, displayed, melody_index, .. } => {
                *displayed = build_view(melodies, &filter, &sort);
                *melody_index = (*melody_index).min(displayed.len().saturating_sub(1));
            }
            ContentView::Producers { .. } | ContentView::Cart { .. } | ContentView::Empty => {}
        }
    }

    pub async fn content_move_up(&self) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Melodies { selected, .. }
            | ContentView::Packs { selected, .. }
            | ContentView::Producers { selected, .. }
            | ContentView::Cart { selected } => {
                if *selected > 0 {
                    *selected -= 1;
                }
            }
            ContentView::ProducerDetail { section, melody_index, pack_index, .. } => {
                let idx = match section {
                    ProducerSection::Melodies => melody_index,
                    ProducerSection::Packs => pack_index,
                };
                if *idx > 0 {
                    *idx -= 1;
                }
            }
            ContentView::Empty => {}
        }
    }

    pub async fn content_move_down(&self) {
        let cart_len = self.cart.lock().await.len();
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Melodies { displayed, selected, .. } => {
                if *selected < displayed.len().saturating_sub(1) {
                    *selected += 1;
                }
            }
            ContentView::Packs { displayed, selected, .. } => {
                if *selected < displayed.len().saturating_sub(1) {
                    *selected += 1;
                }
            }
            ContentView::Producers { producers, selected } => {
                if *selected < producers.len().saturating_sub(1) {
                    *selected += 1;
                }
            }
            ContentView::ProducerDetail { displayed, packs, section, melody_index, pack_index, .. } => {
                let (idx, max) = match section {
                    ProducerSection::Melodies => (melody_index, displayed.len()),
                    ProducerSection::Packs => (pack_index, packs.len()),
                };
                if *idx < max.saturating_sub(1) {
                    *idx += 1;
                }
            }
            ContentView::Cart { selected } => {
                if *selected < cart_len.saturating_sub(1) {
                    *selected += 1;
                }
            }
            ContentView::Empty => {}
        }
    }

    /// Jump the selection a full page forward or back, clamped.
    pub async fn content_move_page(&self, forward: bool) {
        let mut state = self.content_state.lock().await;
        let (selected, len) = match &mut state.view {
            ContentView::Melodies { displayed, selected, .. } => (selected, displayed.len()),
            ContentView::Packs { displayed, selected, .. } => (selected, displayed.len()),
            _ => return,
        };
        if forward {
            *selected = (*selected + PAGE_SIZE).min(len.saturating_sub(1));
        } else {
            *selected = selected.saturating_sub(PAGE_SIZE);
        }
    }

    pub async fn get_selected_content_item(&self) -> Option<SelectedItem> {
        let cart_entries = self.cart.lock().await.entries().to_vec();
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Melodies { displayed, selected, .. } => {
                displayed.get(*selected).map(|m| SelectedItem::Melody(m.clone()))
            }
            ContentView::Packs { displayed, selected, .. } => {
                displayed.get(*selected).map(|p| SelectedItem::Pack(p.clone()))
            }
            ContentView::Producers { producers, selected } => {
                producers.get(*selected).map(|p| SelectedItem::Producer { id: p.id.clone() })
            }
            ContentView::ProducerDetail { displayed, packs, section, melody_index, pack_index, .. } => {
                match section {
                    ProducerSection::Melodies => {
                        displayed.get(*melody_index).map(|m| SelectedItem::Melody(m.clone()))
                    }
                    ProducerSection::Packs => {
                        packs.get(*pack_index).map(|p| SelectedItem::Pack(p.clone()))
                    }
                }
            }
            ContentView::Cart { selected } => cart_entries
                .get(*selected)
                .map(|p| SelectedItem::CartEntry { pack_id: p.id.clone() }),
            ContentView::Empty => None,
        }
    }

    /// Stats over the source items of the current view, for the overlay.
    pub async fn current_stats(&self) -> Option<CatalogStats> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Melodies { items, .. } => Some(catalog_stats(items)),
            ContentView::Packs { items, .. } => Some(catalog_stats(items)),
            ContentView::ProducerDetail { melodies, .. } => Some(catalog_stats(melodies)),
            _ => None,
        }
    }

    // ========================================================================
    // Filters & sorting
    // ========================================================================

    /// Distinct values present in the current view's source items, the
    /// options the filter keys cycle through.
    async fn filter_values<F>(&self, extract: F) -> Vec<String>
    where
        F: Fn(&Melody) -> &str,
    {
        let state = self.content_state.lock().await;
        let melodies: &[Melody] = match &state.view {
            ContentView::Melodies { items, .. } => items,
            ContentView::ProducerDetail { melodies, .. } => melodies,
            _ => return Vec::new(),
        };
        let mut values: Vec<String> = melodies.iter().map(|m| extract(m).to_string()).collect();
        values.sort();
        values.dedup();
        values
    }

    fn advance_option(current: &Option<String>, values: &[String]) -> Option<String> {
        if values.is_empty() {
            return None;
        }
        match current {
            None => Some(values[0].clone()),
            Some(value) => {
                let pos = values.iter().position(|v| v == value);
                match pos {
                    Some(i) if i + 1 < values.len() => Some(values[i + 1].clone()),
                    _ => None,
                }
            }
        }
    }

    pub async fn cycle_key_filter(&self) {
        let values = self.filter_values(|m| m.musical_key.as_str()).await;
        {
            let mut ui = self.ui_state.lock().await;
            ui.filter.musical_key = Self::advance_option(&ui.filter.musical_key, &values);
        }
        self.refresh_view().await;
    }

    pub async fn cycle_genre_filter(&self) {
        let values = self.filter_values(|m| m.genre.as_str()).await;
        {
            let mut ui = self.ui_state.lock().await;
            ui.filter.genre = Self::advance_option(&ui.filter.genre, &values);
        }
        self.refresh_view().await;
    }

    pub async fn cycle_artist_type_filter(&self) {
        let values = self.filter_values(|m| m.artist_type.as_str()).await;
        {
            let mut ui = self.ui_state.lock().await;
            ui.filter.artist_type = Self::advance_option(&ui.filter.artist_type, &values);
        }
        self.refresh_view().await;
    }

    pub async fn cycle_tempo_filter(&self) {
        {
            let mut ui = self.ui_state.lock().await;
            let pos = TEMPO_PRESETS.iter().position(|p| *p == ui.filter.tempo).unwrap_or(0);
            ui.filter.tempo = TEMPO_PRESETS[(pos + 1) % TEMPO_PRESETS.len()];
        }
        self.refresh_view().await;
    }

    /// Pin the tempo filter to the selected melody's exact bpm, or clear
    /// an exact pin that is already set.
    pub async fn toggle_exact_tempo_filter(&self) {
        let selected = self.get_selected_content_item().await;
        {
            let mut ui = self.ui_state.lock().await;
            match (&ui.filter.tempo, selected) {
                (Some(TempoFilter::Exact(_)), _) => ui.filter.tempo = None,
                (_, Some(SelectedItem::Melody(melody))) => {
                    ui.filter.tempo = Some(TempoFilter::Exact(melody.bpm));
                }
                _ => return,
            }
        }
        self.refresh_view().await;
    }

    pub async fn clear_filters(&self) {
        {
            let mut ui = self.ui_state.lock().await;
            ui.filter.clear();
        }
        self.refresh_view().await;
    }

    pub async fn apply_search_filter(&self, query: String) {
        {
            let mut ui = self.ui_state.lock().await;
            ui.filter.query = query;
        }
        self.refresh_view().await;
    }

    pub async fn select_sort_field(&self, field: SortField) {
        {
            let mut ui = self.ui_state.lock().await;
            ui.sort = ui.sort.select_field(field);
        }
        self.refresh_view().await;
    }

    pub async fn select_recency_sort(&self) {
        {
            let mut ui = self.ui_state.lock().await;
            ui.sort = ui.sort.select_recency();
        }
        self.refresh_view().await;
    }

    pub async fn select_popularity_sort(&self) {
        {
            let mut ui = self.ui_state.lock().await;
            ui.sort = ui.sort.select_popularity();
        }
        self.refresh_view().await;
    }

    pub async fn select_random_sort(&self) {
        {
            let mut ui = self.ui_state.lock().await;
            ui.sort = SortMode::Random;
        }
        self.refresh_view().await;
    }

    // ========================================================================
    // Playback reference
    // ========================================================================

    pub async fn playing_id(&self) -> Option<String> {
        self.player_state.lock().await.playing_id.clone()
    }

    pub async fn is_player_visible(&self) -> bool {
        self.player_state.lock().await.visible
    }

    pub async fn autoplay_enabled(&self) -> bool {
        self.player_state.lock().await.autoplay
    }

    /// Install `melody` as the single playing reference.
    pub async fn begin_preview(&self, melody: &Melody) {
        let mut player = self.player_state.lock().await;
        player.toggle(&melody.id);
        drop(player);

        let mut preview = self.preview.lock().await;
        *preview = Some(PreviewSession::begin(NowPlaying::from_melody(melody)));
    }

    pub async fn clear_preview(&self) {
        self.player_state.lock().await.clear();
        *self.preview.lock().await = None;
    }

    pub async fn playback_snapshot(&self) -> PlaybackView {
        let player = self.player_state.lock().await.clone();
        let preview = self.preview.lock().await;
        PlaybackView {
            current: preview.as_ref().map(|s| (s.info.clone(), s.elapsed_ms())),
            visible: player.visible,
            autoplay: player.autoplay,
        }
    }

    /// Ids of the currently displayed melodies, in display order. This is
    /// the sequence next/previous walk.
    pub async fn displayed_melody_ids(&self) -> Vec<String> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Melodies { displayed, .. }
            | ContentView::ProducerDetail { displayed, .. } => {
                displayed.iter().map(|m| m.id.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub async fn displayed_melody_at(&self, position: usize) -> Option<Melody> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::Melodies { displayed, .. }
            | ContentView::ProducerDetail { displayed, .. } => displayed.get(position).cloned(),
            _ => None,
        }
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn update_favorite_status(&self, item_id: &str, favorite: bool) {
        let mut state = self.content_state.lock().await;
        match &mut state.view {
            ContentView::Melodies { items, displayed, .. } => {
                for melody in items.iter_mut().chain(displayed.iter_mut()) {
                    if melody.id == item_id {
                        melody.favorite = favorite;
                    }
                }
            }
            ContentView::Packs { items, displayed, .. } => {
                for pack in items.iter_mut().chain(displayed.iter_mut()) {
                    if pack.id == item_id {
                        pack.favorite = favorite;
                    }
                }
            }
            ContentView::ProducerDetail { melodies, displayed, packs, .. } => {
                for melody in melodies.iter_mut().chain(displayed.iter_mut()) {
                    if melody.id == item_id {
                        melody.favorite = favorite;
                    }
                }
                if let Some(pack) = packs.iter_mut().find(|p| p.id == item_id) {
                    pack.favorite = favorite;
                }
            }
            _ => {}
        }
    }

    // ========================================================================
    // Cart
    // ========================================================================

    pub async fn cart_snapshot(&self) -> CartState {
        self.cart.lock().await.clone()
    }

    pub async fn toggle_cart_pack(&self, pack: Pack) -> bool {
        self.cart.lock().await.toggle(pack)
    }

    pub async fn remove_cart_entry(&self, pack_id: &str) {
        let mut cart = self.cart.lock().await;
        cart.remove(pack_id);
        drop(cart);

        // Keep the cart selection within range.
        let len = self.cart.lock().await.len();
        let mut state = self.content_state.lock().await;
        if let ContentView::Cart { selected } = &mut state.view {
            *selected = (*selected).min(len.saturating_sub(1));
        }
    }

    pub async fn cart_pack_ids(&self) -> Vec<String> {
        self.cart.lock().await.pack_ids()
    }

    pub async fn clear_cart(&self) {
        self.cart.lock().await.clear();
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn melody(id: &str, title: &str, bpm: u32, key: &str, plays: u64, day: u32) -> Melody {
        Melody {
            id: id.to_string(),
            title: title.to_string(),
            producer: "prodigy".to_string(),
            bpm,
            musical_key: key.to_string(),
            genre: "trap".to_string(),
            artist_type: "producer".to_string(),
            cover_url: String::new(),
            audio_url: format!("/media/{}.mp3", id),
            duration_ms: 30_000,
            plays,
            downloads: 0,
            created_at: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
            favorite: false,
        }
    }

    fn pack(id: &str, price_cents: u64) -> Pack {
        Pack {
            id: id.to_string(),
            title: format!("Pack {}", id),
            producer: "prodigy".to_string(),
            genre: "trap".to_string(),
            cover_url: String::new(),
            price_cents,
            melody_count: 8,
            plays: 0,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
            favorite: false,
        }
    }

    #[tokio::test]
    async fn key_filter_narrows_displayed_without_touching_source() {
        let model = AppModel::new();
        model
            .set_melody_listing(
                " Melodies ",
                vec![melody("a", "Alpha", 120, "C", 10, 2), melody("b", "Beta", 90, "D", 50, 5)],
            )
            .await;

        model.cycle_key_filter().await; // first distinct key: "C"

        let state = model.get_content_state().await;
        match &state.view {
            ContentView::Melodies { items, displayed, .. } => {
                assert_eq!(items.len(), 2);
                assert_eq!(displayed.len(), 1);
                assert_eq!(displayed[0].title, "Alpha");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn filter_cycle_returns_to_unfiltered() {
        let model = AppModel::new();
        model
            .set_melody_listing(
                " Melodies ",
                vec![melody("a", "Alpha", 120, "C", 10, 2), melody("b", "Beta", 90, "D", 50, 5)],
            )
            .await;

        // C -> D -> None
        model.cycle_key_filter().await;
        model.cycle_key_filter().await;
        model.cycle_key_filter().await;

        let ui = model.get_ui_state().await;
        assert_eq!(ui.filter.musical_key, None);
        let state = model.get_content_state().await;
        match &state.view {
            ContentView::Melodies { displayed, .. } => assert_eq!(displayed.len(), 2),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn selection_clamps_when_the_view_shrinks() {
        let model = AppModel::new();
        let items: Vec<Melody> =
            (0..6).map(|i| melody(&format!("m{}", i), "T", 100 + i, "C", 0, 1)).collect();
        model.set_melody_listing(" Melodies ", items).await;

        for _ in 0..5 {
            model.content_move_down().await;
        }
        model.toggle_exact_tempo_filter().await; // exact bpm of the last entry

        let state = model.get_content_state().await;
        match &state.view {
            ContentView::Melodies { displayed, selected, .. } => {
                assert_eq!(displayed.len(), 1);
                assert_eq!(*selected, 0);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn content_selection_clamps_at_both_ends() {
        let model = AppModel::new();
        model
            .set_melody_listing(
                " Melodies ",
                vec![melody("a", "Alpha", 120, "C", 0, 1), melody("b", "Beta", 90, "D", 0, 2)],
            )
            .await;

        model.content_move_up().await;
        model.content_move_down().await;
        model.content_move_down().await;
        model.content_move_down().await;

        let state = model.get_content_state().await;
        match &state.view {
            ContentView::Melodies { selected, .. } => assert_eq!(*selected, 1),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn preview_toggle_twice_goes_back_to_idle() {
        let model = AppModel::new();
        let m = melody("a", "Alpha", 120, "C", 0, 1);

        model.begin_preview(&m).await;
        assert_eq!(model.playing_id().await.as_deref(), Some("a"));
        assert!(model.is_player_visible().await);

        model.clear_preview().await;
        assert_eq!(model.playing_id().await, None);
        assert!(!model.is_player_visible().await);
        assert!(model.playback_snapshot().await.current.is_none());
    }

    #[tokio::test]
    async fn displayed_ids_follow_the_materialized_order() {
        let model = AppModel::new();
        model
            .set_melody_listing(
                " Melodies ",
                vec![melody("a", "Alpha", 120, "C", 10, 2), melody("b", "Beta", 90, "D", 50, 5)],
            )
            .await;
        model.select_popularity_sort().await; // descending by plays

        assert_eq!(model.displayed_melody_ids().await, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(model.displayed_melody_at(1).await.unwrap().id, "a");
    }

    #[tokio::test]
    async fn favorite_update_reaches_source_and_displayed_copies() {
        let model = AppModel::new();
        model
            .set_melody_listing(" Melodies ", vec![melody("a", "Alpha", 120, "C", 0, 1)])
            .await;

        model.update_favorite_status("a", true).await;
        let state = model.get_content_state().await;
        match &state.view {
            ContentView::Melodies { items, displayed, .. } => {
                assert!(items[0].favorite);
                assert!(displayed[0].favorite);
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[tokio::test]
    async fn cart_removal_clamps_cart_selection() {
        let model = AppModel::new();
        model.toggle_cart_pack(pack("p1", 1000)).await;
        model.toggle_cart_pack(pack("p2", 2000)).await;
        model.open_cart_view().await;
        model.content_move_down().await;

        model.remove_cart_entry("p2").await;
        let state = model.get_content_state().await;
        match &state.view {
            ContentView::Cart { selected } => assert_eq!(*selected, 0),
            other => panic!("unexpected view: {:?}", other),
        }
        assert_eq!(model.cart_pack_ids().await, vec!["p1".to_string()]);
    }

    #[tokio::test]
    async fn navigate_back_pops_to_the_previous_view() {
        let model = AppModel::new();
        model
            .set_melody_listing(" Melodies ", vec![melody("a", "Alpha", 120, "C", 0, 1)])
            .await;
        model.open_cart_view().await;

        assert!(model.navigate_back().await);
        let state = model.get_content_state().await;
        assert!(matches!(state.view, ContentView::Melodies { .. }));

        // No history left: falls back to the empty view.
        assert!(!model.navigate_back().await);
    }
}
