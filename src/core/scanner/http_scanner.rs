// src/core/scanner/http_scanner.rs

use tracing::{debug, info, warn};
use url::Url;

use crate::app::RunConfig;
use crate::core::errors::ProbeError;
use crate::core::models::HttpOutcome;

pub const USER_AGENT: &str = concat!("cname-hunter/", env!("CARGO_PKG_VERSION"));

/// Issues the single GET made for each subdomain.
///
/// `reqwest::Client` keeps its own connection pool and is cheap to clone, so
/// one client is built per run and shared by every probe task. The timeout is
/// fixed when the client is built.
#[derive(Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    scheme: &'static str,
}

impl HttpProber {
    pub fn new(cfg: &RunConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(cfg)?;
        Ok(Self::from_client(client, cfg))
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::Client, cfg: &RunConfig) -> Self {
        Self { client, scheme: cfg.scheme() }
    }

    /// The URL probed for `hostname`.
    pub fn url_for(&self, hostname: &str) -> Result<Url, ProbeError> {
        let raw = format!("{}://{}", self.scheme, hostname);
        Url::parse(&raw).map_err(|source| ProbeError::InvalidUrl { url: raw, source })
    }

    pub async fn probe(&self, hostname: &str) -> Result<HttpOutcome, ProbeError> {
        let url = self.url_for(hostname)?;
        debug!(url = %url, "Sending probe.");

        let response = self.client.get(url.clone()).send().await.map_err(|source| {
            warn!(url = %url, error = %source, "Probe request failed.");
            ProbeError::Request { url: url.to_string(), source }
        })?;

        let status = response.status();
        info!(url = %url, status = %status, "Received HTTP response.");
        Ok(HttpOutcome {
            url: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().map(String::from),
        })
    }
}

/// The shared client for a run: timeout, TLS leniency and user agent.
pub fn build_client(cfg: &RunConfig) -> Result<reqwest::Client, reqwest::Error> {
    client_builder(cfg).build()
}

fn client_builder(cfg: &RunConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(cfg.timeout)
        .danger_accept_invalid_certs(cfg.skip_tls_verify)
        .pool_max_idle_per_host(cfg.concurrency.min(32))
}
