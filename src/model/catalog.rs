//! Catalog view derivation: filtering, sorting and pagination
//!
//! Every listing in the app (browse, feed, search results, favorites,
//! producer pages) goes through the same pipeline: `build_view` filters the
//! source items and sorts the survivors, `paginate` windows the result. The
//! source list is never mutated; the displayed order is materialized once
//! per refresh so a random order stays put until the next refresh.

use std::cmp::Ordering;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

/// Accessors the view pipeline needs from a catalog item. Packs carry no
/// musical metadata, so those accessors are optional.
pub trait CatalogEntry {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn producer(&self) -> &str;
    fn bpm(&self) -> Option<u32>;
    fn musical_key(&self) -> Option<&str>;
    fn genre(&self) -> Option<&str>;
    fn artist_type(&self) -> Option<&str>;
    fn play_count(&self) -> u64;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Tempo constraint: an exact value or an inclusive range. A missing bound
/// is unbounded; a range with neither bound set is treated as no filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TempoFilter {
    Exact(u32),
    Range { min: Option<u32>, max: Option<u32> },
}

impl TempoFilter {
    pub fn contains(&self, bpm: u32) -> bool {
        match self {
            TempoFilter::Exact(target) => bpm == *target,
            TempoFilter::Range { min, max } => {
                min.map_or(true, |lo| bpm >= lo) && max.map_or(true, |hi| bpm <= hi)
            }
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, TempoFilter::Range { min: None, max: None })
    }

    pub fn label(&self) -> String {
        match self {
            TempoFilter::Exact(bpm) => format!("= {} bpm", bpm),
            TempoFilter::Range { min: Some(lo), max: Some(hi) } => format!("{}-{} bpm", lo, hi),
            TempoFilter::Range { min: Some(lo), max: None } => format!("≥ {} bpm", lo),
            TempoFilter::Range { min: None, max: Some(hi) } => format!("≤ {} bpm", hi),
            TempoFilter::Range { min: None, max: None } => "any".to_string(),
        }
    }
}

/// Active filter criteria. All fields are independently optional and
/// combine as a conjunction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub musical_key: Option<String>,
    pub genre: Option<String>,
    pub artist_type: Option<String>,
    pub tempo: Option<TempoFilter>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.musical_key.is_none()
            && self.genre.is_none()
            && self.artist_type.is_none()
            && self.tempo.map_or(true, |t| t.is_noop())
    }

    pub fn clear(&mut self) {
        *self = FilterState::default();
    }

    /// An item passes when every active predicate holds. Entries lacking a
    /// field an active filter names (e.g. a pack under a key filter) fail
    /// that predicate.
    pub fn matches<T: CatalogEntry>(&self, item: &T) -> bool {
        if !self.query.is_empty() {
            let query = self.query.to_lowercase();
            let in_title = item.title().to_lowercase().contains(&query);
            let in_producer = item.producer().to_lowercase().contains(&query);
            if !in_title && !in_producer {
                return false;
            }
        }

        if let Some(want) = &self.musical_key {
            if item.musical_key() != Some(want.as_str()) {
                return false;
            }
        }

        if let Some(want) = &self.genre {
            if item.genre() != Some(want.as_str()) {
                return false;
            }
        }

        if let Some(want) = &self.artist_type {
            if item.artist_type() != Some(want.as_str()) {
                return false;
            }
        }

        if let Some(tempo) = &self.tempo {
            if !tempo.is_noop() {
                match item.bpm() {
                    Some(bpm) if tempo.contains(bpm) => {}
                    _ => return false,
                }
            }
        }

        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Title,
    Producer,
    Bpm,
    MusicalKey,
    Genre,
}

impl SortField {
    fn label(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Producer => "producer",
            SortField::Bpm => "bpm",
            SortField::MusicalKey => "key",
            SortField::Genre => "genre",
        }
    }
}

/// Ranking applied to the filtered list. Field sorts compare numerically
/// for numeric fields and case-insensitively for string fields; `Random`
/// shuffles once per view refresh and is explicitly not reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    ByField { field: SortField, direction: SortDirection },
    ByRecency(SortDirection),
    ByPopularity(SortDirection),
    Random,
}

impl Default for SortMode {
    fn default() -> Self {
        SortMode::ByRecency(SortDirection::Descending)
    }
}

impl SortMode {
    /// Re-selecting the current field toggles direction; a new field starts
    /// ascending.
    pub fn select_field(self, field: SortField) -> SortMode {
        match self {
            SortMode::ByField { field: current, direction } if current == field => {
                SortMode::ByField { field, direction: direction.toggled() }
            }
            _ => SortMode::ByField { field, direction: SortDirection::Ascending },
        }
    }

    /// "Most recent" starts descending; re-selecting toggles.
    pub fn select_recency(self) -> SortMode {
        match self {
            SortMode::ByRecency(direction) => SortMode::ByRecency(direction.toggled()),
            _ => SortMode::ByRecency(SortDirection::Descending),
        }
    }

    /// "Most popular" starts descending; re-selecting toggles.
    pub fn select_popularity(self) -> SortMode {
        match self {
            SortMode::ByPopularity(direction) => SortMode::ByPopularity(direction.toggled()),
            _ => SortMode::ByPopularity(SortDirection::Descending),
        }
    }

    pub fn label(&self) -> String {
        match self {
            SortMode::ByField { field, direction } => {
                format!("{} {}", field.label(), direction.arrow())
            }
            SortMode::ByRecency(direction) => format!("recent {}", direction.arrow()),
            SortMode::ByPopularity(direction) => format!("popular {}", direction.arrow()),
            SortMode::Random => "random".to_string(),
        }
    }
}

fn compare_by_field<T: CatalogEntry>(a: &T, b: &T, field: SortField) -> Ordering {
    match field {
        SortField::Bpm => a.bpm().unwrap_or(0).cmp(&b.bpm().unwrap_or(0)),
        SortField::Title => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
        SortField::Producer => a.producer().to_lowercase().cmp(&b.producer().to_lowercase()),
        SortField::MusicalKey => a
            .musical_key()
            .unwrap_or("")
            .to_lowercase()
            .cmp(&b.musical_key().unwrap_or("").to_lowercase()),
        SortField::Genre => a
            .genre()
            .unwrap_or("")
            .to_lowercase()
            .cmp(&b.genre().unwrap_or("").to_lowercase()),
    }
}

/// Sort in place. Stable for every mode except `Random`, which permutes
/// the slice once.
pub fn sort_items<T: CatalogEntry>(items: &mut [T], sort: &SortMode) {
    match sort {
        SortMode::Random => items.shuffle(&mut rand::thread_rng()),
        SortMode::ByRecency(direction) => {
            items.sort_by(|a, b| direction.apply(a.created_at().cmp(&b.created_at())));
        }
        SortMode::ByPopularity(direction) => {
            items.sort_by(|a, b| direction.apply(a.play_count().cmp(&b.play_count())));
        }
        SortMode::ByField { field, direction } => {
            items.sort_by(|a, b| direction.apply(compare_by_field(a, b, *field)));
        }
    }
}

/// Filter then sort. Pure over its inputs: the source slice is untouched.
pub fn build_view<T: CatalogEntry + Clone>(
    source: &[T],
    filter: &FilterState,
    sort: &SortMode,
) -> Vec<T> {
    let mut view: Vec<T> = source.iter().filter(|item| filter.matches(*item)).cloned().collect();
    sort_items(&mut view, sort);
    view
}

pub const PAGE_SIZE: usize = 25;

pub struct Page<'a, T> {
    pub entries: &'a [T],
    pub index: usize,
    pub count: usize,
}

/// Window the displayed list into fixed-size pages, clamping the requested
/// page index to the valid range.
pub fn paginate<T>(items: &[T], requested: usize) -> Page<'_, T> {
    let count = items.len().div_ceil(PAGE_SIZE).max(1);
    let index = requested.min(count - 1);
    let start = index * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(items.len());
    Page { entries: &items[start..end], index, count }
}

/// Local aggregates shown in the stats overlay.
#[derive(Clone, Debug, Default)]
pub struct CatalogStats {
    pub total: usize,
    pub mean_bpm: Option<f64>,
    pub total_plays: u64,
    pub genres: Vec<(String, usize)>,
}

pub fn catalog_stats<T: CatalogEntry>(items: &[T]) -> CatalogStats {
    let total = items.len();
    let total_plays = items.iter().map(|i| i.play_count()).sum();

    let bpms: Vec<u32> = items.iter().filter_map(|i| i.bpm()).collect();
    let mean_bpm = if bpms.is_empty() {
        None
    } else {
        Some(bpms.iter().map(|&b| b as f64).sum::<f64>() / bpms.len() as f64)
    };

    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for item in items {
        if let Some(genre) = item.genre() {
            *counts.entry(genre.to_string()).or_default() += 1;
        }
    }
    let mut genres: Vec<(String, usize)> = counts.into_iter().collect();
    genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    CatalogStats { total, mean_bpm, total_plays, genres }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: String,
        title: String,
        producer: String,
        bpm: Option<u32>,
        key: Option<String>,
        genre: Option<String>,
        artist_type: Option<String>,
        plays: u64,
        created_at: DateTime<Utc>,
    }

    impl CatalogEntry for Item {
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
            self.bpm
        }
        fn musical_key(&self) -> Option<&str> {
            self.key.as_deref()
        }
        fn genre(&self) -> Option<&str> {
            self.genre.as_deref()
        }
        fn artist_type(&self) -> Option<&str> {
            self.artist_type.as_deref()
        }
        fn play_count(&self) -> u64 {
            self.plays
        }
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn item(id: &str, title: &str, bpm: u32, key: &str, plays: u64, day: u32) -> Item {
        Item {
            id: id.to_string(),
            title: title.to_string(),
            producer: "prodigy".to_string(),
            bpm: Some(bpm),
            key: Some(key.to_string()),
            genre: Some("trap".to_string()),
            artist_type: Some("producer".to_string()),
            plays,
            created_at: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
        }
    }

    fn alpha_beta() -> Vec<Item> {
        vec![item("a", "Alpha", 120, "C", 10, 2), item("b", "Beta", 90, "D", 50, 5)]
    }

    #[test]
    fn empty_filter_passes_everything() {
        let items = alpha_beta();
        let view = build_view(&items, &FilterState::default(), &SortMode::default());
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn key_filter_selects_exact_match() {
        let items = alpha_beta();
        let filter = FilterState { musical_key: Some("C".to_string()), ..Default::default() };
        let view = build_view(&items, &filter, &SortMode::default());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Alpha");
    }

    #[test]
    fn tempo_range_is_inclusive() {
        let items = alpha_beta();
        let filter = FilterState {
            tempo: Some(TempoFilter::Range { min: Some(100), max: Some(130) }),
            ..Default::default()
        };
        let view = build_view(&items, &filter, &SortMode::default());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Alpha");

        let edge = FilterState {
            tempo: Some(TempoFilter::Range { min: Some(90), max: Some(120) }),
            ..Default::default()
        };
        assert_eq!(build_view(&items, &edge, &SortMode::default()).len(), 2);
    }

    #[test]
    fn tempo_exact_and_half_open_bounds() {
        let items = alpha_beta();
        let exact = FilterState { tempo: Some(TempoFilter::Exact(90)), ..Default::default() };
        let view = build_view(&items, &exact, &SortMode::default());
        assert_eq!(view[0].title, "Beta");

        let at_least = FilterState {
            tempo: Some(TempoFilter::Range { min: Some(100), max: None }),
            ..Default::default()
        };
        assert_eq!(build_view(&items, &at_least, &SortMode::default())[0].title, "Alpha");
    }

    #[test]
    fn unbounded_tempo_range_is_a_noop() {
        let mut items = alpha_beta();
        items.push(Item { bpm: None, ..item("c", "Gamma", 0, "E", 0, 1) });
        let filter = FilterState {
            tempo: Some(TempoFilter::Range { min: None, max: None }),
            ..Default::default()
        };
        // Even the entry without a bpm survives a degenerate range.
        assert_eq!(build_view(&items, &filter, &SortMode::default()).len(), 3);
        assert!(filter.is_empty());
    }

    #[test]
    fn entries_missing_a_filtered_field_are_excluded() {
        let mut items = alpha_beta();
        items.push(Item { key: None, bpm: None, ..item("c", "Gamma", 0, "E", 0, 1) });

        let by_key = FilterState { musical_key: Some("C".to_string()), ..Default::default() };
        assert_eq!(build_view(&items, &by_key, &SortMode::default()).len(), 1);

        let by_tempo = FilterState {
            tempo: Some(TempoFilter::Range { min: Some(80), max: Some(130) }),
            ..Default::default()
        };
        let view = build_view(&items, &by_tempo, &SortMode::default());
        assert!(view.iter().all(|i| i.id != "c"));
    }

    #[test]
    fn query_matches_title_and_producer_case_insensitively() {
        let mut items = alpha_beta();
        items[1].producer = "Alphaville".to_string();
        let filter = FilterState { query: "alpha".to_string(), ..Default::default() };
        // "Alpha" by title, "Beta" through its producer name.
        assert_eq!(build_view(&items, &filter, &SortMode::default()).len(), 2);
    }

    #[test]
    fn filtered_view_is_subset_satisfying_all_predicates() {
        let items: Vec<Item> = (0..40)
            .map(|i| {
                item(
                    &format!("id{}", i),
                    &format!("Track {}", i),
                    60 + (i as u32 * 7) % 120,
                    ["C", "D", "E", "F"][i % 4],
                    i as u64,
                    1 + (i as u32) % 28,
                )
            })
            .collect();
        let filter = FilterState {
            query: "track".to_string(),
            musical_key: Some("C".to_string()),
            tempo: Some(TempoFilter::Range { min: Some(80), max: Some(160) }),
            ..Default::default()
        };
        let view = build_view(&items, &filter, &SortMode::default());
        assert!(view.iter().all(|v| filter.matches(v)));
        assert!(view.iter().all(|v| items.iter().any(|i| i.id == v.id)));
        for excluded in items.iter().filter(|i| !view.iter().any(|v| v.id == i.id)) {
            assert!(!filter.matches(excluded));
        }
    }

    #[test]
    fn bpm_sort_descending_matches_expected_order() {
        let items = alpha_beta();
        let sort = SortMode::ByField { field: SortField::Bpm, direction: SortDirection::Descending };
        let view = build_view(&items, &FilterState::default(), &sort);
        assert_eq!(view[0].title, "Alpha");
        assert_eq!(view[1].title, "Beta");
    }

    #[test]
    fn recency_descending_puts_newest_first() {
        let items = alpha_beta(); // Beta created later
        let view = build_view(
            &items,
            &FilterState::default(),
            &SortMode::ByRecency(SortDirection::Descending),
        );
        assert_eq!(view[0].title, "Beta");
    }

    #[test]
    fn popularity_descending_puts_most_played_first() {
        let items = alpha_beta();
        let view = build_view(
            &items,
            &FilterState::default(),
            &SortMode::ByPopularity(SortDirection::Descending),
        );
        assert_eq!(view[0].title, "Beta");
    }

    #[test]
    fn title_sort_is_case_insensitive() {
        let mut items = alpha_beta();
        items[0].title = "alpha".to_string();
        items[1].title = "Beta".to_string();
        let sort = SortMode::ByField { field: SortField::Title, direction: SortDirection::Ascending };
        let view = build_view(&items, &FilterState::default(), &sort);
        assert_eq!(view[0].title, "alpha");
    }

    #[test]
    fn sorting_is_idempotent_for_equal_criteria() {
        let items: Vec<Item> = (0..20)
            .map(|i| item(&format!("id{}", i), &format!("T{}", i % 5), 60 + i as u32, "C", i as u64, 1))
            .collect();
        for sort in [
            SortMode::ByField { field: SortField::Title, direction: SortDirection::Ascending },
            SortMode::ByRecency(SortDirection::Descending),
            SortMode::ByPopularity(SortDirection::Ascending),
        ] {
            let once = build_view(&items, &FilterState::default(), &sort);
            let twice = build_view(&once, &FilterState::default(), &sort);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn random_sort_is_a_permutation() {
        let items: Vec<Item> =
            (0..30).map(|i| item(&format!("id{}", i), "T", 100, "C", 0, 1)).collect();
        let view = build_view(&items, &FilterState::default(), &SortMode::Random);
        let mut original: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        let mut shuffled: Vec<&str> = view.iter().map(|i| i.id.as_str()).collect();
        original.sort();
        shuffled.sort();
        assert_eq!(original, shuffled);
    }

    #[test]
    fn field_reselect_toggles_direction_and_new_field_resets() {
        let sort = SortMode::default().select_field(SortField::Bpm);
        assert_eq!(
            sort,
            SortMode::ByField { field: SortField::Bpm, direction: SortDirection::Ascending }
        );
        let toggled = sort.select_field(SortField::Bpm);
        assert_eq!(
            toggled,
            SortMode::ByField { field: SortField::Bpm, direction: SortDirection::Descending }
        );
        let switched = toggled.select_field(SortField::Title);
        assert_eq!(
            switched,
            SortMode::ByField { field: SortField::Title, direction: SortDirection::Ascending }
        );
    }

    #[test]
    fn named_modes_start_descending_and_toggle() {
        let recency = SortMode::Random.select_recency();
        assert_eq!(recency, SortMode::ByRecency(SortDirection::Descending));
        assert_eq!(recency.select_recency(), SortMode::ByRecency(SortDirection::Ascending));

        let popular = recency.select_popularity();
        assert_eq!(popular, SortMode::ByPopularity(SortDirection::Descending));
    }

    #[test]
    fn pagination_windows_and_clamps() {
        let items: Vec<u32> = (0..60).collect();
        let first = paginate(&items, 0);
        assert_eq!(first.entries.len(), PAGE_SIZE);
        assert_eq!(first.count, 3);

        let last = paginate(&items, 2);
        assert_eq!(last.entries.len(), 10);

        // Out-of-range request clamps to the final page.
        let clamped = paginate(&items, 99);
        assert_eq!(clamped.index, 2);

        let empty: Vec<u32> = vec![];
        let page = paginate(&empty, 5);
        assert_eq!(page.index, 0);
        assert_eq!(page.count, 1);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn stats_aggregate_genres_and_bpm() {
        let mut items = alpha_beta();
        items[1].genre = Some("lofi".to_string());
        items.push(item("c", "Gamma", 150, "E", 5, 9));
        let stats = catalog_stats(&items);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_plays, 65);
        assert_eq!(stats.mean_bpm, Some(120.0));
        assert_eq!(stats.genres[0], ("trap".to_string(), 2));
    }
}
