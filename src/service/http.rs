use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::{AppError, Result};

/// Shared client for scraping and API calls. Search engines and job sites
/// serve reduced pages to unknown agents, so callers pass a browser UA.
pub fn create_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::network(format!("Failed to build HTTP client: {}", e)))
}

/// GET a page and return its body; non-2xx responses are errors.
pub async fn fetch_html(client: &Client, url: Url) -> Result<String> {
    log::trace!("[HTTP] Fetching: {}", url);
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::network(format!("HTTP {} for {}", status, url)));
    }

    let body = response.text().await?;
    log::trace!("[HTTP] Received {} bytes from {}", body.len(), url);
    Ok(body)
}

pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| AppError::InvalidInput(format!("Invalid URL {}: {}", raw, e)))
}
