//! Shared HTTP plumbing for provider requests

use crate::utils::config::AppSettings;
use crate::utils::error::CastdeskError;
use anyhow::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Build the client every engine shares.
///
/// Both timeouts are always set so an unresponsive provider fails the
/// request instead of hanging it.
pub fn build_client(settings: &AppSettings) -> Result<Client> {
    let client = Client::builder()
        .user_agent(settings.user_agent.clone())
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .build()?;
    Ok(client)
}

/// GET `url` and return the body as text; non-success statuses are errors
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    debug!("GET {}", url);
    let body = send(client.get(url)).await?;
    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

/// Same as [`fetch_text`] but for URLs with query parameters
pub async fn fetch_text_with_query(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String> {
    debug!("GET {} {:?}", url, query);
    send(client.get(url).query(query)).await
}

async fn send(request: reqwest::RequestBuilder) -> Result<String> {
    let response = request
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(CastdeskError::Network)?;
    let body = response.text().await.map_err(CastdeskError::Network)?;
    Ok(body)
}
