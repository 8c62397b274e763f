//! HTTP retrieval of the listing page.
//!
//! One GET, bounded by a timeout, no retries. Any failure aborts the scrape
//! stage before anything is written to disk.

use crate::error::PulseError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetch the raw markup of `url`.
///
/// # Arguments
///
/// * `url` - Listing page to request
/// * `timeout` - Upper bound on the whole request, body included
///
/// # Returns
///
/// The response body as text.
///
/// # Errors
///
/// Returns [`PulseError::Network`] on connection failure, timeout, a non-2xx
/// status, or a body that cannot be read as text.
#[instrument(level = "info", skip_all, fields(%url, timeout_secs = timeout.as_secs()))]
pub async fn fetch_listing(url: &str, timeout: Duration) -> Result<String, PulseError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PulseError::network(url, &e))?;

    info!("Fetching listing page");
    let response = client.get(url).send().await.map_err(|e| {
        error!(error = %e, "Request failed");
        PulseError::network(url, &e)
    })?;

    let status = response.status();
    if !status.is_success() {
        error!(%status, "Bad status code");
        return Err(PulseError::Network {
            url: url.to_string(),
            reason: format!("bad status {status}"),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| PulseError::network(url, &e))?;
    info!(bytes = body.len(), "Page fetched");
    debug!(preview = %truncate_for_log(&body, 200), "Response body");
    Ok(body)
}
