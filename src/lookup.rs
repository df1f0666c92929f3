// ISP / public-IP enrichment via an external lookup service

use crate::models::PublicNet;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Best-effort client for an ip-api style lookup service. Every failure
/// (network error, malformed body, non-success API status) resolves to
/// absent; enrichment never blocks or fails a snapshot.
pub struct Resolver {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    status: Option<String>,
    query: Option<String>,
    isp: Option<String>,
}

impl Resolver {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Public IP and ISP of this host, queried once at startup and cached
    /// by the caller for process lifetime.
    pub async fn lookup_self(&self) -> Option<PublicNet> {
        let url = format!("{}/json/?fields=status,query,isp", self.endpoint);
        let body = self.fetch(&url).await?;
        Some(PublicNet {
            ip: body.query?,
            isp: body.isp?,
        })
    }

    /// ISP name for an arbitrary address (ad-hoc probe enrichment).
    pub async fn isp_for(&self, ip: IpAddr) -> Option<String> {
        let url = format!("{}/json/{}?fields=status,isp", self.endpoint, ip);
        self.fetch(&url).await?.isp.filter(|s| !s.is_empty())
    }

    async fn fetch(&self, url: &str) -> Option<LookupResponse> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "lookup request failed");
                return None;
            }
        };
        let body: LookupResponse = response.error_for_status().ok()?.json().await.ok()?;
        if body.status.as_deref() == Some("fail") {
            return None;
        }
        Some(body)
    }
}

/// First token of a multi-word ISP name, for compact display.
pub fn short_label(isp: &str) -> Option<String> {
    isp.split_whitespace().next().map(|s| s.to_string())
}
