//! Marketplace API client wrapper with all remote calls

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::favorites::FavoritesCache;
use super::content::{Melody, Pack, ProducerProfile};
use super::types::OrderReceipt;

#[derive(Debug, Deserialize)]
struct Listing<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct FavoriteIds {
    ids: Vec<String>,
}

/// A producer page: profile plus that producer's catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct ProducerPage {
    pub profile: ProducerProfile,
    pub melodies: Vec<Melody>,
    pub packs: Vec<Pack>,
}

/// Marketplace API client with favorites caching and session refresh
#[derive(Clone)]
pub struct MarketClient {
    http: reqwest::Client,
    base_url: String,
    session_token: Arc<RwLock<String>>,
    session_expires_at: Arc<RwLock<Option<chrono::DateTime<chrono::Utc>>>>,
    favorites_cache: FavoritesCache,
}

impl MarketClient {
    pub fn new(
        base_url: String,
        session_token: String,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: Arc::new(RwLock::new(session_token)),
            session_expires_at: Arc::new(RwLock::new(expires_at)),
            favorites_cache: FavoritesCache::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Preview/audio URLs may be absolute or API-relative.
    fn resolve_media_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.endpoint(url)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let token = self.session_token.read().await.clone();
        let response = self
            .http
            .get(self.endpoint(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {}", path))?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        let token = self.session_token.read().await.clone();
        self.http
            .post(self.endpoint(path))
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("POST {}", path))?
            .error_for_status()?;
        Ok(())
    }

    // ========================================================================
    // Session lifetime
    // ========================================================================

    pub async fn session_needs_refresh(&self) -> bool {
        let expires_at = self.session_expires_at.read().await;
        if let Some(exp) = *expires_at {
            let remaining = exp - chrono::Utc::now();
            // Refresh if less than 5 minutes remaining
            remaining.num_seconds() < 300
        } else {
            false
        }
    }

    pub async fn refresh_session_if_needed(&self) -> Result<bool> {
        if !self.session_needs_refresh().await {
            return Ok(false);
        }

        let current = self.session_token.read().await.clone();
        tracing::info!("Session expiring soon, refreshing...");

        match crate::auth::refresh_session(&self.base_url, &current).await {
            Ok((new_token, new_expires_at)) => {
                *self.session_token.write().await = new_token;
                *self.session_expires_at.write().await = new_expires_at;
                tracing::info!("Session refreshed successfully");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to refresh session");
                Err(e)
            }
        }
    }

    // ========================================================================
    // Catalog listings
    // ========================================================================

    pub async fn list_melodies(&self, limit: u32) -> Result<Vec<Melody>> {
        tracing::debug!(limit, "Fetching melody catalog");
        let listing: Listing<Melody> =
            self.get_json("/v1/melodies", &[("limit", limit.to_string())]).await?;
        Ok(listing.items)
    }

    pub async fn recent_melodies(&self, limit: u32) -> Result<Vec<Melody>> {
        let listing: Listing<Melody> = self
            .get_json(
                "/v1/melodies",
                &[("limit", limit.to_string()), ("order", "recent".to_string())],
            )
            .await?;
        Ok(listing.items)
    }

    pub async fn search_melodies(&self, query: &str, limit: u32) -> Result<Vec<Melody>> {
        tracing::debug!(query, "Searching melodies");
        let listing: Listing<Melody> = self
            .get_json(
                "/v1/search",
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;
        Ok(listing.items)
    }

    pub async fn list_packs(&self, limit: u32) -> Result<Vec<Pack>> {
        let listing: Listing<Pack> =
            self.get_json("/v1/packs", &[("limit", limit.to_string())]).await?;
        Ok(listing.items)
    }

    pub async fn list_producers(&self, limit: u32) -> Result<Vec<ProducerProfile>> {
        let listing: Listing<ProducerProfile> =
            self.get_json("/v1/producers", &[("limit", limit.to_string())]).await?;
        Ok(listing.items)
    }

    pub async fn get_producer(&self, producer_id: &str) -> Result<ProducerPage> {
        self.get_json(&format!("/v1/producers/{}", producer_id), &[]).await
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    pub async fn init_favorites_cache(&self) -> Result<()> {
        // Cache file may not exist yet, that is fine
        let _ = self.favorites_cache.load_from_disk().await;
        Ok(())
    }

    pub async fn refresh_favorites_cache(&self) -> Result<()> {
        tracing::debug!("Refreshing favorites cache from API");
        let favorites: FavoriteIds = self.get_json("/v1/favorites", &[]).await?;
        tracing::info!(count = favorites.ids.len(), "Favorites cache refreshed");

        self.favorites_cache.update(favorites.ids).await;
        let _ = self.favorites_cache.save_to_disk().await;
        Ok(())
    }

    pub async fn list_favorite_melodies(&self) -> Result<Vec<Melody>> {
        let listing: Listing<Melody> = self.get_json("/v1/favorites/melodies", &[]).await?;
        Ok(listing.items)
    }

    pub async fn mark_melodies_favorite(&self, melodies: &mut [Melody]) {
        for melody in melodies.iter_mut() {
            melody.favorite = self.favorites_cache.is_favorite(&melody.id).await;
        }
    }

    pub async fn mark_packs_favorite(&self, packs: &mut [Pack]) {
        for pack in packs.iter_mut() {
            pack.favorite = self.favorites_cache.is_favorite(&pack.id).await;
        }
    }

    async fn add_favorite(&self, item_id: &str) -> Result<()> {
        tracing::debug!(item_id, "Adding item to favorites");
        let token = self.session_token.read().await.clone();
        self.http
            .put(self.endpoint(&format!("/v1/favorites/{}", item_id)))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        self.favorites_cache.add(item_id.to_string()).await;
        let _ = self.favorites_cache.save_to_disk().await;

        tracing::info!(item_id, "Added item to favorites");
        Ok(())
    }

    async fn remove_favorite(&self, item_id: &str) -> Result<()> {
        tracing::debug!(item_id, "Removing item from favorites");
        let token = self.session_token.read().await.clone();
        self.http
            .delete(self.endpoint(&format!("/v1/favorites/{}", item_id)))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        self.favorites_cache.remove(item_id).await;
        let _ = self.favorites_cache.save_to_disk().await;

        tracing::info!(item_id, "Removed item from favorites");
        Ok(())
    }

    /// Flip membership at the remote first; the local cache changes only on
    /// success. Returns the new membership.
    pub async fn toggle_favorite(&self, item_id: &str) -> Result<bool> {
        if item_id.is_empty() {
            return Err(anyhow::anyhow!("Item ID is empty"));
        }

        if self.favorites_cache.is_favorite(item_id).await {
            self.remove_favorite(item_id).await?;
            Ok(false)
        } else {
            self.add_favorite(item_id).await?;
            Ok(true)
        }
    }

    // ========================================================================
    // Counters (fire-and-forget at call sites)
    // ========================================================================

    pub async fn increment_plays(&self, melody_id: &str) -> Result<()> {
        self.post_empty(&format!("/v1/melodies/{}/plays", melody_id)).await
    }

    pub async fn increment_downloads(&self, melody_id: &str) -> Result<()> {
        self.post_empty(&format!("/v1/melodies/{}/downloads", melody_id)).await
    }

    // ========================================================================
    // Media
    // ========================================================================

    pub async fn fetch_preview(&self, audio_url: &str) -> Result<Vec<u8>> {
        let url = self.resolve_media_url(audio_url);
        tracing::debug!(%url, "Fetching preview audio");
        let token = self.session_token.read().await.clone();
        let bytes = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// Stream a melody's audio to `dest_dir`, returning the written path.
    pub async fn download_melody(&self, melody: &Melody, dest_dir: &Path) -> Result<PathBuf> {
        if !dest_dir.exists() {
            std::fs::create_dir_all(dest_dir)?;
        }

        let file_name = format!("{} - {}.mp3", melody.producer, melody.title);
        let dest = dest_dir.join(sanitize_file_name(&file_name));

        let url = self.resolve_media_url(&melody.audio_url);
        let token = self.session_token.read().await.clone();
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let mut file = tokio::fs::File::create(&dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        tracing::info!(melody_id = %melody.id, path = %dest.display(), "Melody downloaded");
        Ok(dest)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    pub async fn create_order(&self, pack_ids: &[String]) -> Result<OrderReceipt> {
        if pack_ids.is_empty() {
            return Err(anyhow::anyhow!("Cart is empty"));
        }

        tracing::debug!(packs = pack_ids.len(), "Creating order");
        let token = self.session_token.read().await.clone();
        let receipt: OrderReceipt = self
            .http
            .post(self.endpoint("/v1/orders"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "pack_ids": pack_ids }))
            .send()
            .await
            .context("POST /v1/orders")?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(order_id = %receipt.order_id, total_cents = receipt.total_cents, "Order created");
        Ok(receipt)
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars().map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_urls_resolve_against_the_api_base() {
        let client = MarketClient::new("https://api.melomarket.io/".to_string(), "tok".to_string(), None);
        assert_eq!(
            client.resolve_media_url("/media/previews/m1.mp3"),
            "https://api.melomarket.io/media/previews/m1.mp3"
        );
        assert_eq!(
            client.resolve_media_url("https://cdn.melomarket.io/m1.mp3"),
            "https://cdn.melomarket.io/m1.mp3"
        );
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("a/b: c?.mp3"), "a_b_ c_.mp3");
    }
}
