use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::debug;

use crate::error::HttpStatusError;

const RETRY_BACKOFF_MS: u64 = 300;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout of the first caller wins for the life
/// of the process.
pub fn http_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build http client")
    })
}

/// GET `url` and return the body. Transport errors, 5xx and 429 are retried
/// up to `attempts` times in total; any other non-success status fails at once.
pub fn fetch_json(client: &Client, url: &str, attempts: u32) -> Result<String> {
    let attempts = attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match fetch_once(client, url) {
            Ok(body) => return Ok(body),
            Err(err) => {
                debug!(url, attempt, "request failed: {err:#}");
                let permanent = err
                    .downcast_ref::<HttpStatusError>()
                    .is_some_and(|e| !e.is_retryable());
                if permanent {
                    return Err(err);
                }
                last_err = Some(err);
                if attempt + 1 < attempts {
                    std::thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS));
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("request failed")))
}

fn fetch_once(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .header(USER_AGENT, "roster-consistency/0.1")
        .header(ACCEPT, "application/json")
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(HttpStatusError {
            status,
            body: truncate(&body, 200).to_string(),
        }
        .into());
    }
    Ok(body)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
