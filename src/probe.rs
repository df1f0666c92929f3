// Bounded-timeout latency probes: TCP connect, ICMP echo, ad-hoc targets

use crate::config::TargetConfig;
use crate::lookup::Resolver;
use crate::models::PingInfo;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::process::Command;

/// Extra slack on the subprocess deadline so the ping binary's own timeout
/// fires first and we still collect its output.
const PING_GRACE: Duration = Duration::from_millis(500);

/// Wall-clock latency of one TCP connect in fractional milliseconds.
/// Timeout, refusal, and resolution failure all report absent.
pub async fn tcp_ping(host: &str, port: u16, timeout: Duration) -> Option<f64> {
    let start = Instant::now();
    let addr = format!("{}:{}", host, port);
    match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(_stream)) => Some(start.elapsed().as_secs_f64() * 1000.0),
        _ => None,
    }
}

/// One ICMP echo via the system ping binary (no raw-socket privileges
/// needed). Parses the reported round-trip time; any failure is absent.
pub async fn icmp_ping(host: &str, timeout: Duration) -> Option<f64> {
    let wait_secs = timeout.as_secs().max(1).to_string();
    let output = tokio::time::timeout(
        timeout + PING_GRACE,
        Command::new("ping")
            .args(["-n", "-c", "1", "-W", &wait_secs])
            .arg(host)
            .stdin(Stdio::null())
            .output(),
    )
    .await
    .ok()?
    .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_ping_time(&String::from_utf8_lossy(&output.stdout))
}

/// Extract "time=12.3 ms" from ping output.
pub fn parse_ping_time(output: &str) -> Option<f64> {
    let idx = output.find("time=")?;
    let rest = &output[idx + "time=".len()..];
    let value = rest.split_whitespace().next()?;
    value.parse::<f64>().ok()
}

/// Probe every configured target concurrently; total latency is bounded by
/// the slowest single probe, not the sum.
pub async fn probe_targets(
    targets: &[TargetConfig],
    timeout: Duration,
) -> BTreeMap<String, Option<f64>> {
    let probes = targets.iter().map(|target| {
        let name = target.name.clone();
        let host = target.host.clone();
        let port = target.port;
        async move { (name, tcp_ping(&host, port, timeout).await) }
    });
    join_all(probes).await.into_iter().collect()
}

/// Pull a probeable hostname out of arbitrary user input: strips scheme,
/// path, query, and a trailing port.
pub fn parse_host(input: &str) -> Option<String> {
    let s = input.trim();
    let s = s.split_once("://").map_or(s, |(_, rest)| rest);
    let s = s.split(['/', '?', '#']).next().unwrap_or(s);
    let s = match s.rsplit_once(':') {
        // Only treat the suffix as a port when the remainder is not itself
        // an IPv6 address full of colons.
        Some((host, port))
            if !host.is_empty()
                && !host.contains(':')
                && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            host
        }
        _ => s,
    };
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

/// Resolve a hostname to one address, preferring IPv4.
pub async fn lookup_ip(host: &str) -> Option<IpAddr> {
    let addrs: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
        .await
        .ok()?
        .map(|a| a.ip())
        .collect();
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// Resolve, probe, and enrich one ad-hoc user-supplied target. Every field
/// of the result is independently nullable.
pub async fn ping_info(raw_url: &str, resolver: &Resolver, timeout: Duration) -> PingInfo {
    let Some(host) = parse_host(raw_url) else {
        return PingInfo::default();
    };
    let ip = lookup_ip(&host).await;
    let probe_host = ip.map(|a| a.to_string()).unwrap_or(host);
    let (ping, isp) = tokio::join!(icmp_ping(&probe_host, timeout), async {
        match ip {
            Some(ip) => resolver.isp_for(ip).await,
            None => None,
        }
    });
    PingInfo {
        ip: ip.map(|a| a.to_string()),
        isp,
        ping,
    }
}
