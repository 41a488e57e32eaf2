mod basic;
mod client;

pub use basic::BasicClient;
pub use client::{HttpClient, HttpResponse};

use anyhow::{Result, bail};

/// GETs `url` and returns the body, failing on a non-success status.
pub fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let resp = client.get(url)?;
    if !resp.is_success() {
        bail!("request returned status {}", resp.status);
    }
    Ok(resp.body)
}
