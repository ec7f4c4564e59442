//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and manages preview playback.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Preview playback, favorites and downloads
//! - `navigation`: Listing loads, search, filters and cart
//! - `player_events`: Audio backend event listener

mod input;
mod playback;
mod navigation;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) audio_backend: Arc<Mutex<Option<AudioBackend>>>,
    event_listener_started: Arc<Mutex<bool>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, audio_backend: Arc<Mutex<Option<AudioBackend>>>) -> Self {
        Self {
            model,
            audio_backend,
            event_listener_started: Arc::new(Mutex::new(false)),
        }
    }

    /// Try to start the player event listener if backend is ready and not already started
    pub async fn try_start_event_listener(&self) {
        let mut started = self.event_listener_started.lock().await;
        if *started {
            return;
        }

        let mut backend_guard = self.audio_backend.lock().await;
        if let Some(backend) = backend_guard.as_mut() {
            if let Some(event_channel) = backend.take_event_channel() {
                *started = true;
                drop(backend_guard);
                drop(started);
                self.start_player_event_listener(event_channel);
            }
        }
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        // Map common marketplace API statuses to something actionable
        if error_str.contains("401") {
            "Session expired. Please restart the app.".to_string()
        } else if error_str.contains("402") {
            "Payment required. Check your order in the marketplace.".to_string()
        } else if error_str.contains("403") {
            "Action forbidden. A Pro subscription may be required.".to_string()
        } else if error_str.contains("404") {
            "Not found. The item may have been removed from the marketplace.".to_string()
        } else if error_str.contains("429") {
            "Rate limited. Please wait a moment.".to_string()
        } else {
            format!("Error: {}", error_str)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_statuses_map_to_readable_messages() {
        let err = anyhow::anyhow!("HTTP status client error (404 Not Found) for url");
        assert!(AppController::format_error(&err).contains("removed"));

        let err = anyhow::anyhow!("HTTP status client error (429 Too Many Requests) for url");
        assert!(AppController::format_error(&err).contains("Rate limited"));

        let err = anyhow::anyhow!("connection refused");
        assert_eq!(
            AppController::format_error(&err),
            "Error: connection refused"
        );
    }
}
