// Per-request telemetry snapshot and ad-hoc probe result

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One aggregated telemetry result. Every field is independently nullable:
/// a failed read serializes as `null` so the dashboard can hide the row
/// instead of showing a misleading zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub disk: Option<f64>,
    pub cores: Option<usize>,
    pub load: Option<[f64; 3]>,
    pub container_uptime: Option<String>,
    pub host_uptime: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<String>,
    pub public_ip: Option<String>,
    pub isp: Option<String>,
    pub client_ip: Option<String>,
    pub client_ping: Option<f64>,
    pub disk_io: Option<String>,
    pub net_io: Option<String>,
    /// One key per configured probe target: latency in ms, or null.
    #[serde(flatten)]
    pub targets: BTreeMap<String, Option<f64>>,
}

/// Public IP and ISP name resolved once at startup via the lookup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicNet {
    pub ip: String,
    pub isp: String,
}

/// GET /pinginfo result for an arbitrary user-supplied host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PingInfo {
    pub ip: Option<String>,
    pub isp: Option<String>,
    pub ping: Option<f64>,
}
