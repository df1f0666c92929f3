// Point-in-time system metrics via sysinfo

mod linux;

use crate::models::{HostInfo, humanize_bytes};
use std::net::UdpSocket;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{Disks, Networks, System};
use tracing::instrument;

/// Raw monotonic network counters (totals since boot).
#[derive(Debug, Clone, Copy)]
pub struct NetCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Raw monotonic block-device counters (bytes since boot).
#[derive(Debug, Clone, Copy)]
pub struct DiskCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// One point-in-time read of the OS. Every field is independently nullable:
/// a metric that fails to read reports absent without suppressing the rest.
#[derive(Debug, Clone, Default)]
pub struct SamplePartial {
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_percent: Option<f64>,
    pub cores: Option<usize>,
    pub load_average: Option<[f64; 3]>,
    pub host_uptime_secs: Option<u64>,
    pub hostname: Option<String>,
    pub local_ip: Option<String>,
    pub net_counters: Option<NetCounters>,
    pub disk_counters: Option<DiskCounters>,
}

pub struct Sampler {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    last_cpu_refresh: Arc<Mutex<Option<(Instant, f64)>>>,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            networks: Arc::new(Mutex::new(networks)),
            last_cpu_refresh: Arc::new(Mutex::new(None)),
        }
    }

    /// Take one sample on the blocking pool. Never fails: a metric whose
    /// read errors out is simply absent from the result.
    #[instrument(skip(self), fields(repo = "sampler", operation = "sample"))]
    pub async fn sample(&self) -> SamplePartial {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let networks = self.networks.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut partial = SamplePartial {
                load_average: read_load_average(),
                host_uptime_secs: Some(System::uptime()),
                hostname: System::host_name(),
                local_ip: local_ip(),
                ..Default::default()
            };

            if let Ok(mut sys) = sys.lock() {
                partial.cpu_percent = cpu_percent(&mut sys, &last_cpu_refresh);
                sys.refresh_memory();
                let total = sys.total_memory();
                if total > 0 {
                    let used = total.saturating_sub(sys.available_memory());
                    partial.memory_percent = Some(used as f64 / total as f64 * 100.0);
                }
                let cores = sys.cpus().len();
                if cores > 0 {
                    partial.cores = Some(cores);
                }
            }

            if let Ok(mut disks) = disks.lock() {
                disks.refresh(false);
                partial.disk_percent = root_disk_percent(&disks);
            }
            partial.disk_counters = linux::read_disk_counters()
                .map(|(read_bytes, write_bytes)| DiskCounters {
                    read_bytes,
                    write_bytes,
                });

            if let Ok(mut networks) = networks.lock() {
                networks.refresh(true);
                let (mut sent, mut recv) = (0u64, 0u64);
                for (_, data) in networks.list() {
                    sent = sent.saturating_add(data.total_transmitted());
                    recv = recv.saturating_add(data.total_received());
                }
                partial.net_counters = Some(NetCounters {
                    bytes_sent: sent,
                    bytes_recv: recv,
                });
            }

            partial
        })
        .await;
        match result {
            Ok(partial) => partial,
            Err(e) => {
                tracing::warn!(error = %e, "sampler task join failed");
                SamplePartial::default()
            }
        }
    }

    /// Static host descriptor; fetched once at startup for GET /host.
    #[instrument(skip(self), fields(repo = "sampler", operation = "host_info"))]
    pub async fn host_info(&self) -> HostInfo {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut info = HostInfo {
                system: System::name(),
                node: System::host_name(),
                release: System::kernel_version(),
                version: System::os_version(),
                machine: Some(std::env::consts::ARCH.to_string()),
                physical_cores: System::physical_core_count(),
                ..Default::default()
            };

            if let Ok(sys) = sys.lock() {
                info.processor = linux::read_cpu_model().or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.brand().to_string())
                        .filter(|s| !s.is_empty())
                });
                let cores = sys.cpus().len();
                if cores > 0 {
                    info.total_cores = Some(cores);
                }
                info.max_freq = linux::read_max_freq_mhz().or_else(|| {
                    sys.cpus()
                        .iter()
                        .map(|c| c.frequency())
                        .max()
                        .filter(|f| *f > 0)
                        .map(|f| f as f64)
                });
                let total_memory = sys.total_memory();
                if total_memory > 0 {
                    info.total_memory = Some(humanize_bytes(total_memory as f64));
                }
            }

            if let Ok(disks) = disks.lock() {
                let total: u64 = disks.list().iter().map(|d| d.total_space()).sum();
                if total > 0 {
                    info.total_disk = Some(humanize_bytes(total as f64));
                }
            }

            info
        })
        .await;
        match result {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(error = %e, "host info task join failed");
                HostInfo::default()
            }
        }
    }
}

/// Global CPU usage with the cached-refresh pattern: sysinfo needs two
/// refreshes separated by MINIMUM_CPU_UPDATE_INTERVAL for a meaningful
/// number, so rapid polls return the cached reading instead of blocking.
fn cpu_percent(sys: &mut System, last: &Mutex<Option<(Instant, f64)>>) -> Option<f64> {
    let now = Instant::now();
    let mut guard = last.lock().ok()?;
    let usage = match *guard {
        Some((prev_ts, prev_usage)) => {
            if now.duration_since(prev_ts) >= sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
                sys.refresh_cpu_all();
                let new_usage = sys.global_cpu_usage() as f64;
                *guard = Some((now, new_usage));
                new_usage
            } else {
                prev_usage
            }
        }
        None => {
            // First call establishes the measurement baseline.
            sys.refresh_cpu_all();
            *guard = Some((now, 0.0));
            0.0
        }
    };
    Some(usage.clamp(0.0, 100.0))
}

fn read_load_average() -> Option<[f64; 3]> {
    let load = System::load_average();
    // sysinfo reports zeros on platforms without getloadavg.
    if load.one == 0.0 && load.five == 0.0 && load.fifteen == 0.0 {
        return None;
    }
    Some([load.one, load.five, load.fifteen])
}

/// Usage percent of the root filesystem, falling back to the largest mount
/// when nothing is mounted at "/" (e.g. in containers with exotic layouts).
fn root_disk_percent(disks: &Disks) -> Option<f64> {
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == std::path::Path::new("/"))
        .or_else(|| disks.list().iter().max_by_key(|d| d.total_space()))?;
    let total = disk.total_space();
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(disk.available_space());
    Some(used as f64 / total as f64 * 100.0)
}

/// Primary outbound interface address via the UDP-connect trick.
/// No packet is sent; the kernel just picks a route and source address.
fn local_ip() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    Some(socket.local_addr().ok()?.ip().to_string())
}
