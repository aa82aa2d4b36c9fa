//! Constants describing the backend text formats.

/// Width of one coverage bin, in bases.
pub const COVERAGE_BIN_SIZE: u64 = 16384;

/// A reference needs more bins than this to be sampled from.
pub const MIN_USABLE_BINS: usize = 1000;

/// Marker that opens a reference group in a coverage dump.
pub const GROUP_MARKER: char = '#';

/// Marker of the unplaced-reads line in a coverage dump.
pub const UNPLACED_MARKER: char = '*';

/// Key the unplaced-reads count is published under.
pub const UNPLACED_READS_KEY: &str = "no_coor";

/// Marker of reference-sequence lines in an alignment header.
pub const REFERENCE_LINE_MARKER: &str = "@SQ";

pub const REFERENCE_NAME_TAG: &str = "SN:";
pub const REFERENCE_LENGTH_TAG: &str = "LN:";

/// Prefix stripped from interval reference names that do not match any known reference.
pub const CHR_PREFIX: &str = "chr";
