use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub probing: ProbingConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbingConfig {
    /// Per-probe connect/echo timeout. Probes that exceed it report null.
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// One named reference target probed on every /stats request.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the ip-api style lookup service.
    #[serde(default = "default_lookup_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_lookup_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_probe_timeout_ms() -> u64 {
    1000
}

fn default_lookup_endpoint() -> String {
    "http://ip-api.com".into()
}

fn default_lookup_timeout_ms() -> u64 {
    2000
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.probing.timeout_ms > 0,
            "probing.timeout_ms must be > 0, got {}",
            self.probing.timeout_ms
        );
        for target in &self.probing.targets {
            anyhow::ensure!(
                !target.name.is_empty() && !target.host.is_empty(),
                "probing.targets entries must have non-empty name and host"
            );
            anyhow::ensure!(
                target.port > 0,
                "probing.targets.{}.port must be > 0",
                target.name
            );
        }
        anyhow::ensure!(
            !self.lookup.endpoint.is_empty(),
            "lookup.endpoint must be non-empty"
        );
        anyhow::ensure!(
            self.lookup.timeout_ms > 0,
            "lookup.timeout_ms must be > 0, got {}",
            self.lookup.timeout_ms
        );
        Ok(())
    }
}
