// Linux-specific helpers: /proc and /sys readers.

/// Read first "model name" from /proc/cpuinfo (Linux).
pub(super) fn read_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty())?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Max CPU frequency in MHz from cpufreq (Linux reports kHz).
pub(super) fn read_max_freq_mhz() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let content =
            std::fs::read_to_string("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")
                .ok()?;
        if let Ok(khz) = content.trim().parse::<u64>()
            && khz > 0
        {
            return Some(khz as f64 / 1000.0);
        }
    }
    None
}

/// Total bytes read/written across whole block devices from /proc/diskstats.
/// Partitions are skipped so the numbers are not double-counted.
pub(super) fn read_disk_counters() -> Option<(u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        const SECTOR_SIZE: u64 = 512;
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        let (mut read, mut written) = (0u64, 0u64);
        let mut seen = false;
        for line in content.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            // major minor name reads _ sectors_read _ writes _ sectors_written ...
            if fields.len() < 10 || !is_whole_disk(fields[2]) {
                continue;
            }
            if let (Ok(sectors_read), Ok(sectors_written)) =
                (fields[5].parse::<u64>(), fields[9].parse::<u64>())
            {
                read = read.saturating_add(sectors_read * SECTOR_SIZE);
                written = written.saturating_add(sectors_written * SECTOR_SIZE);
                seen = true;
            }
        }
        if seen {
            return Some((read, written));
        }
    }
    None
}

/// Heuristic: whole physical disks only, no partitions or pseudo devices.
#[cfg(target_os = "linux")]
fn is_whole_disk(name: &str) -> bool {
    for pseudo in ["loop", "ram", "zram", "sr", "dm-", "md"] {
        if name.starts_with(pseudo) {
            return false;
        }
    }
    if let Some(rest) = name.strip_prefix("nvme") {
        // nvme0n1 is a disk, nvme0n1p1 a partition
        return !rest.contains('p');
    }
    if let Some(rest) = name.strip_prefix("mmcblk") {
        return !rest.contains('p');
    }
    // sda/vdb/xvda style: a trailing digit marks a partition
    !name.ends_with(|c: char| c.is_ascii_digit())
}
