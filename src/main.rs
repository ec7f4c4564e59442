mod audio;
mod auth;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use controller::AppController;
use model::{AppModel, MarketClient};

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== MeloMarket Client Starting ===");

    // Step 1: Establish the marketplace session
    let auth_result = auth::establish_session().await?;

    let market = MarketClient::new(
        auth_result.base_url.clone(),
        auth_result.session_token.clone(),
        auth_result.expires_at,
    );

    // Initialize favorites cache from disk
    let cache_loaded = market.init_favorites_cache().await.is_ok();

    // If cache wasn't loaded from disk, refresh synchronously (first run)
    // Otherwise refresh in background
    if !cache_loaded || !std::path::Path::new(".cache/favorites.json").exists() {
        tracing::info!("Loading favorites from API (first run or cache miss)...");
        if let Err(e) = market.refresh_favorites_cache().await {
            tracing::warn!(error = %e, "Could not load favorites");
        }
    } else {
        tracing::debug!("Favorites cache found, refreshing in background");
        let market_for_cache = market.clone();
        tokio::spawn(async move {
            let _ = market_for_cache.refresh_favorites_cache().await;
        });
    }

    let mut app_model = AppModel::new();
    app_model.set_market_client(market.clone());

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let model = Arc::new(Mutex::new(app_model));
    model.lock().await.set_viewer(auth_result.viewer.clone()).await;

    let audio_backend: Arc<Mutex<Option<AudioBackend>>> = Arc::new(Mutex::new(None));

    // Initialize audio output in background; previews surface an error if
    // it never comes up
    let audio_backend_init = audio_backend.clone();
    let model_for_init = model.clone();
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(AudioBackend::new).await {
            Ok(Ok(backend)) => {
                *audio_backend_init.lock().await = Some(backend);
            }
            Ok(Err(e)) => {
                let model = model_for_init.lock().await;
                model.set_error(format!("Audio init failed: {}", e)).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Audio init task panicked");
            }
        }
    });

    let controller = AppController::new(model.clone(), audio_backend.clone());

    // Seed the first listing
    controller.load_feed().await;

    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("MeloMarket client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    // Track when we last checked the session
    let mut last_session_check = std::time::Instant::now();
    const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60); // Check every minute

    loop {
        // Periodically refresh the session token before it expires
        if last_session_check.elapsed() >= SESSION_CHECK_INTERVAL {
            last_session_check = std::time::Instant::now();

            let model_guard = model.lock().await;
            if let Some(market) = model_guard.get_market_client().await {
                drop(model_guard);
                tokio::spawn(async move {
                    match market.refresh_session_if_needed().await {
                        Ok(_) => {}
                        Err(e) => tracing::warn!("Session refresh check failed: {}", e),
                    }
                });
            } else {
                drop(model_guard);
            }
        }

        // Get current state
        let (playback, ui_state, content_state, cart, stats, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old notifications (after 5 seconds)
            model_guard.auto_clear_old_notifications().await;

            let stats = if model_guard.is_stats_popup_open().await {
                model_guard.current_stats().await
            } else {
                None
            };

            (
                model_guard.playback_snapshot().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.cart_snapshot().await,
                stats,
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &playback, &ui_state, &content_state, &cart, stats.as_ref());
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Errors are handled internally and surfaced as overlays
                let _ = controller.handle_key_event(key).await;
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
