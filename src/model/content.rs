//! Content view state and the marketplace data types behind each listing

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::catalog::CatalogEntry;

/// A melody as returned by the catalog API. `favorite` is viewer-local and
/// filled in from the favorites cache after fetch.
#[derive(Clone, Debug, Deserialize)]
pub struct Melody {
    pub id: String,
    pub title: String,
    pub producer: String,
    pub bpm: u32,
    pub musical_key: String,
    pub genre: String,
    pub artist_type: String,
    pub cover_url: String,
    pub audio_url: String,
    pub duration_ms: u32,
    pub plays: u64,
    pub downloads: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorite: bool,
}

impl CatalogEntry for Melody {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn producer(&self) -> &str {
        &self.producer
    }
    fn bpm(&self) -> Option<u32> {
        Some(self.bpm)
    }
    fn musical_key(&self) -> Option<&str> {
        Some(&self.musical_key)
    }
    fn genre(&self) -> Option<&str> {
        Some(&self.genre)
    }
    fn artist_type(&self) -> Option<&str> {
        Some(&self.artist_type)
    }
    fn play_count(&self) -> u64 {
        self.plays
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A purchasable sample pack. Carries no per-track musical metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct Pack {
    pub id: String,
    pub title: String,
    pub producer: String,
    pub genre: String,
    pub cover_url: String,
    pub price_cents: u64,
    pub melody_count: u32,
    pub plays: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorite: bool,
}

impl CatalogEntry for Pack {
    fn id(&self) -> &str {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn producer(&self) -> &str {
        &self.producer
    }
    fn bpm(&self) -> Option<u32> {
        None
    }
    fn musical_key(&self) -> Option<&str> {
        None
    }
    fn genre(&self) -> Option<&str> {
        Some(&self.genre)
    }
    fn artist_type(&self) -> Option<&str> {
        None
    }
    fn play_count(&self) -> u64 {
        self.plays
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A producer as listed in the directory.
#[derive(Clone, Debug, Deserialize)]
pub struct ProducerProfile {
    pub id: String,
    pub name: String,
    pub artist_type: String,
    pub melody_count: u32,
    pub pack_count: u32,
    pub total_plays: u64,
    pub joined_at: DateTime<Utc>,
}

/// Which half of a producer page is focused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProducerSection {
    #[default]
    Melodies,
    Packs,
}

impl ProducerSection {
    pub fn toggled(self) -> Self {
        match self {
            ProducerSection::Melodies => ProducerSection::Packs,
            ProducerSection::Packs => ProducerSection::Melodies,
        }
    }
}

/// Represents the current view in the main content area.
///
/// Listings keep both the fetched source items and the materialized
/// `displayed` order; `AppModel::refresh_view` rebuilds `displayed`
/// whenever the source, filter or sort changes.
#[derive(Clone, Debug, Default)]
pub enum ContentView {
    #[default]
    Empty,
    Melodies {
        title: String,
        items: Vec<Melody>,
        displayed: Vec<Melody>,
        selected: usize,
    },
    Packs {
        title: String,
        items: Vec<Pack>,
        displayed: Vec<Pack>,
        selected: usize,
    },
    Producers {
        producers: Vec<ProducerProfile>,
        selected: usize,
    },
    ProducerDetail {
        profile: ProducerProfile,
        melodies: Vec<Melody>,
        displayed: Vec<Melody>,
        packs: Vec<Pack>,
        section: ProducerSection,
        melody_index: usize,
        pack_index: usize,
    },
    Cart {
        selected: usize,
    },
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    pub is_loading: bool,
}
