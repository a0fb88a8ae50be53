use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;

use super::parse::error_message;

pub(super) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// One GET against the backend, returning the raw body on 2xx. Non-success
/// responses surface the backend's `message` field verbatim so the UI can
/// show it unchanged.
pub(super) fn get_text(client: &Client, url: &str) -> Result<String> {
    log::info!("GET {url}");
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    let body = response
        .text()
        .with_context(|| format!("failed to read response body from {url}"))?;
    log::info!("GET {url} finished with status {status}");

    if status.is_success() {
        Ok(body)
    } else {
        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        Err(anyhow!("{message}"))
    }
}
