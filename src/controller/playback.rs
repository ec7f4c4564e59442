//! Preview playback, favorites and downloads

use std::path::Path;

use crate::model::{adjacent_position, Melody, SelectedItem, Step};
use super::AppController;

const DOWNLOAD_DIR: &str = "downloads";

impl AppController {
    /// The single play/stop transition: selecting the playing melody stops
    /// it, selecting any other replaces it.
    pub async fn toggle_preview(&self, melody: Melody) {
        let model = self.model.lock().await;
        let playing = model.playing_id().await;

        if playing.as_deref() == Some(melody.id.as_str()) {
            tracing::debug!(melody_id = %melody.id, "Stopping current preview");
            drop(model);
            self.stop_preview().await;
            return;
        }

        drop(model);
        self.start_preview(melody).await;
    }

    /// Stop whatever plays and start `melody`. The previous sink is torn
    /// down inside the audio thread before the new one starts.
    pub(crate) async fn start_preview(&self, melody: Melody) {
        self.try_start_event_listener().await;

        let model = self.model.lock().await;
        let Some(market) = model.get_market_client().await else {
            return;
        };

        // The play counter is fire-and-forget: a failed increment never
        // blocks or reverts playback.
        let counter_client = market.clone();
        let counted_id = melody.id.clone();
        tokio::spawn(async move {
            if let Err(e) = counter_client.increment_plays(&counted_id).await {
                tracing::warn!(melody_id = %counted_id, error = %e, "Play counter increment failed");
            }
        });

        model.begin_preview(&melody).await;
        drop(model);

        tracing::info!(melody_id = %melody.id, title = %melody.title, "Starting preview");

        match market.fetch_preview(&melody.audio_url).await {
            Ok(bytes) => {
                let backend_guard = self.audio_backend.lock().await;
                let played = match backend_guard.as_ref() {
                    Some(backend) => backend.play(melody.id.clone(), bytes),
                    None => Err(anyhow::anyhow!("Audio backend not ready")),
                };
                drop(backend_guard);

                if let Err(e) = played {
                    tracing::error!(melody_id = %melody.id, error = %e, "Preview start failed");
                    let model = self.model.lock().await;
                    model.clear_preview().await;
                    model.set_error(Self::format_error(&e)).await;
                }
            }
            Err(e) => {
                tracing::error!(melody_id = %melody.id, error = %e, "Preview fetch failed");
                let model = self.model.lock().await;
                model.clear_preview().await;
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn stop_preview(&self) {
        let backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_ref() {
            let _ = backend.stop();
        }
        drop(backend_guard);

        let model = self.model.lock().await;
        model.clear_preview().await;
    }

    /// Move to the adjacent entry of the displayed list, clamping at the
    /// ends. No-op when nothing is playing.
    pub async fn next_preview(&self) {
        self.step_preview(Step::Next).await;
    }

    pub async fn previous_preview(&self) {
        self.step_preview(Step::Previous).await;
    }

    async fn step_preview(&self, step: Step) {
        let model = self.model.lock().await;
        let playing = model.playing_id().await;
        let displayed = model.displayed_melody_ids().await;

        let Some(position) = adjacent_position(&displayed, playing.as_deref(), step) else {
            tracing::debug!(?step, "Preview step is a no-op");
            return;
        };

        let Some(target) = model.displayed_melody_at(position).await else {
            return;
        };
        drop(model);

        self.start_preview(target).await;
    }

    /// Reaction to the audio thread reporting a finished preview: advance
    /// when a next entry exists, otherwise stop and hide the player.
    pub(crate) async fn handle_track_ended(&self, melody_id: &str) {
        let model = self.model.lock().await;
        if model.playing_id().await.as_deref() != Some(melody_id) {
            // A newer preview replaced this one before the event arrived.
            return;
        }
        if !model.autoplay_enabled().await {
            drop(model);
            self.stop_preview().await;
            return;
        }

        let displayed = model.displayed_melody_ids().await;
        match adjacent_position(&displayed, Some(melody_id), Step::Next) {
            Some(position) => {
                let target = model.displayed_melody_at(position).await;
                drop(model);
                if let Some(target) = target {
                    self.start_preview(target).await;
                }
            }
            None => {
                drop(model);
                self.stop_preview().await;
            }
        }
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn toggle_favorite_selected(&self) {
        let model = self.model.lock().await;
        let Some(selected) = model.get_selected_content_item().await else {
            return;
        };

        let item_id = match &selected {
            SelectedItem::Melody(melody) => melody.id.clone(),
            SelectedItem::Pack(pack) => pack.id.clone(),
            SelectedItem::CartEntry { pack_id } => pack_id.clone(),
            SelectedItem::Producer { .. } => return,
        };

        if let Some(market) = &model.market {
            // Remote first; local state flips only on success.
            match market.toggle_favorite(&item_id).await {
                Ok(favorite) => {
                    model.update_favorite_status(&item_id, favorite).await;
                    let status = if favorite { "added to" } else { "removed from" };
                    tracing::info!(item_id = %item_id, status, "Favorite toggled");
                }
                Err(e) => {
                    tracing::error!(item_id = %item_id, error = %e, "Favorite toggle failed");
                    let error_msg = Self::format_error(&e);
                    model.set_error(error_msg).await;
                }
            }
        }
    }

    // ========================================================================
    // Downloads
    // ========================================================================

    pub async fn download_selected_melody(&self) {
        let model = self.model.lock().await;
        let Some(SelectedItem::Melody(melody)) = model.get_selected_content_item().await else {
            return;
        };

        let Some(market) = model.get_market_client().await else {
            return;
        };
        drop(model);

        let counter_client = market.clone();
        let counted_id = melody.id.clone();
        tokio::spawn(async move {
            if let Err(e) = counter_client.increment_downloads(&counted_id).await {
                tracing::warn!(melody_id = %counted_id, error = %e, "Download counter increment failed");
            }
        });

        match market.download_melody(&melody, Path::new(DOWNLOAD_DIR)).await {
            Ok(path) => {
                let model = self.model.lock().await;
                model.set_notice(format!("Saved {}", path.display())).await;
            }
            Err(e) => {
                let model = self.model.lock().await;
                let error_msg = Self::format_error(&e);
                model.set_error(error_msg).await;
            }
        }
    }
}
