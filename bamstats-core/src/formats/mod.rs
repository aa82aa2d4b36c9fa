//! Parsers for the text formats exchanged with a bamstats backend.
pub mod coverage;
pub mod header;
pub mod intervals;

pub use coverage::{parse_coverage_dump, select_usable_references};
pub use header::parse_header;
pub use intervals::{normalize_reference_name, parse_interval_file};
