mod signin;
mod types;

pub use types::USER_AGENT;

use anyhow::{Context, Result};
use reqwest::Client;

pub struct HttpClient {
    pub(super) client: Client,
}

impl HttpClient {
    /// Shared client; timeouts are applied per request.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}
