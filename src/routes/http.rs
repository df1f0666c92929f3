// GET handlers: version, stats, host, pinginfo

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, request::Parts},
    response::IntoResponse,
};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::AppState;
use crate::models::PingInfo;
use crate::probe;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /stats — one formatted telemetry snapshot. Absent metrics are null.
pub(super) async fn stats_handler(
    State(state): State<AppState>,
    parts: Parts,
) -> impl IntoResponse {
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_ip = client_ip(&parts.headers, peer);
    axum::Json(state.aggregator.snapshot(client_ip).await)
}

/// GET /host — static host descriptor (fetched once at startup).
pub(super) async fn host_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.host_info.as_ref().clone())
}

#[derive(Deserialize)]
pub(super) struct PingInfoQuery {
    url: Option<String>,
}

/// GET /pinginfo?url= — resolve, probe and enrich an arbitrary host.
/// Every field of the response is nullable.
pub(super) async fn pinginfo_handler(
    State(state): State<AppState>,
    Query(query): Query<PingInfoQuery>,
) -> impl IntoResponse {
    let timeout = Duration::from_millis(state.config.probing.timeout_ms);
    let info = match query.url.as_deref() {
        Some(url) => probe::ping_info(url, &state.resolver, timeout).await,
        None => PingInfo::default(),
    };
    axum::Json(info)
}

/// Requesting client address: proxy headers first, then the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    for name in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok())
            && let Some(first) = value.split(',').next()
            && let Ok(ip) = first.trim().parse::<IpAddr>()
        {
            return Some(ip);
        }
    }
    peer.map(|addr| addr.ip())
}
