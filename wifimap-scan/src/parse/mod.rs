//! Parsers for the text printed by OS Wi-Fi and network tools.
//!
//! Every parser is a pure function over captured output. Unknown lines are
//! skipped, so partial or localized output degrades to fewer fields rather
//! than an error.

mod linux;
mod macos;
mod ping;
mod route;
mod util;
mod windows;

pub use linux::{parse_iw_link, parse_iw_scan};
pub use macos::{parse_airport, parse_system_profiler, parse_wdutil_info, parse_wdutil_scan};
pub use ping::{parse_ping, PingStats};
pub use route::{parse_ip_route, parse_netstat, parse_route_get, parse_route_print};
pub use util::{channel_from_frequency, percent_to_dbm};
pub use windows::{parse_netsh_interfaces, parse_netsh_networks};
