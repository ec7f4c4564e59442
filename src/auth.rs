//! Session establishment against the marketplace API
//!
//! Configuration comes from the environment: `MELOMARKET_API_URL` points at
//! the API, `MELOMARKET_API_TOKEN` is the viewer's long-lived API token.
//! Logging in exchanges the API token for an expiring session token plus
//! the viewer profile.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::ViewerProfile;

const API_URL_ENV: &str = "MELOMARKET_API_URL";
const API_TOKEN_ENV: &str = "MELOMARKET_API_TOKEN";
const DEFAULT_API_URL: &str = "https://api.melomarket.io";

#[derive(Clone)]
pub struct AuthResult {
    pub base_url: String,
    pub session_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub viewer: ViewerProfile,
}

#[derive(Deserialize)]
struct SessionResponse {
    session_token: String,
    expires_at: Option<DateTime<Utc>>,
    viewer: ViewerProfile,
}

#[derive(Deserialize)]
struct RefreshResponse {
    session_token: String,
    expires_at: Option<DateTime<Utc>>,
}

fn client_name() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("melomarket-tui/{}", host)
}

/// Exchange the API token for a session. Fatal when the environment is
/// incomplete or the API rejects the token.
pub async fn establish_session() -> Result<AuthResult> {
    let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let base_url = base_url.trim_end_matches('/').to_string();
    let api_token = std::env::var(API_TOKEN_ENV)
        .with_context(|| format!("{} is not set", API_TOKEN_ENV))?;

    tracing::info!(%base_url, "Establishing marketplace session");

    let response: SessionResponse = reqwest::Client::new()
        .post(format!("{}/v1/session", base_url))
        .json(&serde_json::json!({
            "api_token": api_token,
            "client_name": client_name(),
        }))
        .send()
        .await
        .context("Could not reach the marketplace API")?
        .error_for_status()
        .context("Marketplace rejected the API token")?
        .json()
        .await?;

    tracing::info!(
        viewer = %response.viewer.handle,
        role = %response.viewer.role,
        "Session established"
    );

    Ok(AuthResult {
        base_url,
        session_token: response.session_token,
        expires_at: response.expires_at,
        viewer: response.viewer,
    })
}

/// Trade the current session token for a fresh one before it expires.
pub async fn refresh_session(
    base_url: &str,
    session_token: &str,
) -> Result<(String, Option<DateTime<Utc>>)> {
    let response: RefreshResponse = reqwest::Client::new()
        .post(format!("{}/v1/session/refresh", base_url))
        .bearer_auth(session_token)
        .send()
        .await
        .context("Could not reach the marketplace API")?
        .error_for_status()
        .context("Session refresh rejected")?
        .json()
        .await?;

    tracing::debug!("Session token refreshed");
    Ok((response.session_token, response.expires_at))
}
