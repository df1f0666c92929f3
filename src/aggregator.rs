// Snapshot orchestration: sampler + rate trackers + probes + enrichment

use crate::config::TargetConfig;
use crate::lookup::short_label;
use crate::models::{PublicNet, StatsSnapshot, humanize_duration, humanize_rate};
use crate::probe;
use crate::rates::RateTracker;
use crate::sampler::Sampler;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Pulls one coherent snapshot per request: OS sample, named-target probe
/// fan-out, and client ping run concurrently; the result is bounded by the
/// slowest probe timeout. Side effects are limited to advancing the two
/// rate-tracker baselines.
pub struct Aggregator {
    sampler: Sampler,
    net_rates: RateTracker,
    disk_rates: RateTracker,
    targets: Vec<TargetConfig>,
    probe_timeout: Duration,
    public_net: Option<PublicNet>,
    started: Instant,
}

impl Aggregator {
    pub fn new(
        sampler: Sampler,
        targets: Vec<TargetConfig>,
        probe_timeout: Duration,
        public_net: Option<PublicNet>,
    ) -> Self {
        Self {
            sampler,
            net_rates: RateTracker::new(),
            disk_rates: RateTracker::new(),
            targets,
            probe_timeout,
            public_net,
            started: Instant::now(),
        }
    }

    #[instrument(skip(self))]
    pub async fn snapshot(&self, client_ip: Option<IpAddr>) -> StatsSnapshot {
        let (partial, target_latencies, client_ping) = tokio::join!(
            self.sampler.sample(),
            probe::probe_targets(&self.targets, self.probe_timeout),
            async {
                match client_ip {
                    Some(ip) => probe::icmp_ping(&ip.to_string(), self.probe_timeout).await,
                    None => None,
                }
            },
        );

        let now = Instant::now();
        let net_io = partial.net_counters.map(|c| {
            let (up, down) = self.net_rates.rate(c.bytes_sent, c.bytes_recv, now);
            format!("\u{2191} {} \u{2193} {}", humanize_rate(up), humanize_rate(down))
        });
        let disk_io = partial.disk_counters.map(|c| {
            let (read, write) = self.disk_rates.rate(c.read_bytes, c.write_bytes, now);
            format!("R {} W {}", humanize_rate(read), humanize_rate(write))
        });

        StatsSnapshot {
            cpu: partial.cpu_percent,
            memory: partial.memory_percent,
            disk: partial.disk_percent,
            cores: partial.cores,
            load: partial.load_average,
            container_uptime: Some(humanize_duration(self.started.elapsed().as_secs())),
            host_uptime: partial.host_uptime_secs.map(humanize_duration),
            hostname: partial.hostname,
            ip: partial.local_ip,
            public_ip: self.public_net.as_ref().map(|net| net.ip.clone()),
            isp: self.public_net.as_ref().and_then(|net| short_label(&net.isp)),
            client_ip: client_ip.map(|ip| ip.to_string()),
            client_ping,
            disk_io,
            net_io,
            targets: target_latencies,
        }
    }
}
