// Wire models for the dashboard endpoints

mod format;
mod host;
mod snapshot;

pub use format::{humanize_bytes, humanize_duration, humanize_rate};
pub use host::HostInfo;
pub use snapshot::{PingInfo, PublicNet, StatsSnapshot};
