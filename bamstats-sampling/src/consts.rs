/// Width of a window drawn from the ideal tier.
pub const TARGET_BIN: u64 = 10_000;

/// Width of a window drawn from the secondary tier.
pub const SECONDARY_BIN: u64 = 5_000;

/// Width of a window drawn from the tertiary tier.
pub const TERTIARY_BIN: u64 = 2_500;

/// Number of ideal-width windows requested by default.
pub const BASE_SAMPLE_COUNT: usize = 20;

/// Below this many candidate offsets, sub-window offsets are drawn without replacement.
pub const EXHAUSTIVE_OFFSET_LIMIT: u64 = 1000;

// Command-line interface command names
pub const SAMPLE_CMD: &str = "sample";
