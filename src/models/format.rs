// Human-readable duration and byte-size formatting

const BYTE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Format seconds as "2d 3h 4m 5s". Zero-valued leading units are omitted;
/// once a unit is shown, every smaller unit is shown too. All-zero input
/// still shows the smallest unit ("0s"), never an empty string.
pub fn humanize_duration(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut parts: Vec<String> = Vec::with_capacity(4);
    for (value, unit) in [(days, "d"), (hours, "h"), (minutes, "m")] {
        if value > 0 || !parts.is_empty() {
            parts.push(format!("{}{}", value, unit));
        }
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

/// Format a byte count with binary (1024-based) units to one decimal place,
/// escalating the unit until the magnitude drops below 1024.
pub fn humanize_bytes(bytes: f64) -> String {
    let mut value = bytes.max(0.0);
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, BYTE_UNITS[unit])
}

/// Format a bytes-per-second rate, e.g. "1.5KB/s".
pub fn humanize_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", humanize_bytes(bytes_per_sec))
}
