//! Listener for audio backend playback events

use tokio::sync::mpsc::UnboundedReceiver;

use crate::audio::PlayerEvent;
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: UnboundedReceiver<PlayerEvent>) {
        let model = self.model.clone();
        let controller = self.clone();
        tracing::info!("Starting audio backend event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                if model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match event {
                    PlayerEvent::TrackEnded { melody_id } => {
                        tracing::debug!(melody_id = %melody_id, "PlayerEvent::TrackEnded");
                        controller.handle_track_ended(&melody_id).await;
                    }
                    PlayerEvent::PlaybackFailed { melody_id, reason } => {
                        tracing::warn!(melody_id = %melody_id, %reason, "PlayerEvent::PlaybackFailed");
                        let model_guard = model.lock().await;
                        if model_guard.playing_id().await.as_deref() == Some(melody_id.as_str()) {
                            model_guard.clear_preview().await;
                            model_guard.set_error(format!("Preview failed: {}", reason)).await;
                        }
                    }
                }
            }
        });
    }
}
