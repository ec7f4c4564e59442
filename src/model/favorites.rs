//! Favorite-id cache mirrored to disk for fast lookup without API calls

use std::sync::Arc;
use std::collections::HashSet;
use std::path::PathBuf;
use anyhow::Result;
use tokio::sync::RwLock;

const FAVORITES_CACHE_FILE: &str = ".cache/favorites.json";

/// Cache of favorite item ids for the current viewer
#[derive(Clone)]
pub struct FavoritesCache {
    favorite_ids: Arc<RwLock<HashSet<String>>>,
    path: PathBuf,
}

impl FavoritesCache {
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(FAVORITES_CACHE_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { favorite_ids: Arc::new(RwLock::new(HashSet::new())), path }
    }

    pub async fn load_from_disk(&self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let ids: Vec<String> = serde_json::from_str(&content)?;
            let mut favorite_ids = self.favorite_ids.write().await;
            *favorite_ids = ids.into_iter().collect();
        }
        Ok(())
    }

    pub async fn save_to_disk(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let favorite_ids = self.favorite_ids.read().await;
        let ids: Vec<&String> = favorite_ids.iter().collect();
        let content = serde_json::to_string(&ids)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub async fn update(&self, ids: Vec<String>) {
        let mut favorite_ids = self.favorite_ids.write().await;
        *favorite_ids = ids.into_iter().collect();
    }

    pub async fn is_favorite(&self, item_id: &str) -> bool {
        let favorite_ids = self.favorite_ids.read().await;
        favorite_ids.contains(item_id)
    }

    pub async fn add(&self, item_id: String) {
        let mut favorite_ids = self.favorite_ids.write().await;
        favorite_ids.insert(item_id);
    }

    pub async fn remove(&self, item_id: &str) {
        let mut favorite_ids = self.favorite_ids.write().await;
        favorite_ids.remove(item_id);
    }
}

impl Default for FavoritesCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn membership_toggles_in_place() {
        let cache = FavoritesCache::with_path(PathBuf::from("unused.json"));
        cache.add("m1".to_string()).await;
        assert!(cache.is_favorite("m1").await);
        cache.remove("m1").await;
        assert!(!cache.is_favorite("m1").await);
    }

    #[tokio::test]
    async fn roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");

        let cache = FavoritesCache::with_path(path.clone());
        cache.update(vec!["m1".to_string(), "m2".to_string()]).await;
        cache.save_to_disk().await.unwrap();

        let reloaded = FavoritesCache::with_path(path);
        reloaded.load_from_disk().await.unwrap();
        assert!(reloaded.is_favorite("m1").await);
        assert!(reloaded.is_favorite("m2").await);
        assert!(!reloaded.is_favorite("m3").await);
    }

    #[tokio::test]
    async fn missing_cache_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FavoritesCache::with_path(dir.path().join("absent.json"));
        assert!(cache.load_from_disk().await.is_ok());
        assert!(!cache.is_favorite("m1").await);
    }
}
