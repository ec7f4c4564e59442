//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (sections, viewer, cart, UI state)
//! - `catalog`: Filtering, sorting and pagination of catalog listings
//! - `content`: Content view data (melodies, packs, producers)
//! - `playback`: Preview playback state (playing reference, timing)
//! - `favorites`: Favorite-id cache mirrored to disk
//! - `market_client`: Marketplace API client wrapper
//! - `app_model`: Main application model with state management methods

mod types;
mod catalog;
mod content;
mod playback;
mod favorites;
mod market_client;
mod app_model;

// Re-export all public types for convenient access
pub use types::{
    ActiveSection, CartState, OrderReceipt, SelectedItem, UiState, ViewerProfile,
};

pub use catalog::{
    catalog_stats, paginate, CatalogStats, FilterState, SortDirection, SortField, SortMode,
    TempoFilter, PAGE_SIZE,
};

pub use content::{
    ContentState, ContentView, Melody, Pack, ProducerProfile, ProducerSection,
};

pub use playback::{adjacent_position, NowPlaying, PlaybackView, Step};

pub use market_client::MarketClient;

pub use app_model::AppModel;
