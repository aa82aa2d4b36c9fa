//! Endpoint paths, event names and configuration defaults.

/// Environment variable name for the backend base URL.
///
/// # Example
///
/// ```bash
/// export BAMSTATS_BACKEND=https://backend.example.org
/// ```
pub const BACKEND_URL_ENV: &str = "BAMSTATS_BACKEND";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

// backend endpoints
pub const BAI_READ_DEPTH_ENDPOINT: &str = "/baiReadDepth";
pub const CRAI_READ_DEPTH_ENDPOINT: &str = "/craiReadDepth";
pub const HEADER_ENDPOINT: &str = "/alignmentHeader";
pub const STATS_STREAM_ENDPOINT: &str = "/alignmentStatsStream";

/// Separator between JSON objects of a statistics stream.
pub const STREAM_DELIMITER: u8 = b';';

// published events
pub const EVENT_HEADER: &str = "header";
pub const EVENT_READ_DEPTH: &str = "read-depth";
pub const EVENT_USABLE_REFERENCES: &str = "usable-references";
pub const EVENT_ERROR: &str = "error";

// Command-line interface command names
pub const STREAM_CMD: &str = "stream";
