// Static host descriptor

use serde::{Deserialize, Serialize};

/// Static host identity; gathered once at startup and exposed via GET /host.
/// Each field is null when the platform does not report it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInfo {
    pub system: Option<String>,
    pub node: Option<String>,
    pub release: Option<String>,
    pub version: Option<String>,
    pub machine: Option<String>,
    pub processor: Option<String>,
    pub physical_cores: Option<usize>,
    pub total_cores: Option<usize>,
    /// Maximum CPU frequency in MHz.
    pub max_freq: Option<f64>,
    pub total_memory: Option<String>,
    pub total_disk: Option<String>,
}
