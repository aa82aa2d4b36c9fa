//! # Core models and parsers for bamstats
//!
//! This crate holds the entities shared by every bamstats tool: reference sequences,
//! coverage bins, intervals and sample windows, together with the parsers for the
//! compact text formats a bamstats backend returns.
//!
//! - [`formats::parse_header`] reads `@SQ` reference listings.
//! - [`formats::parse_coverage_dump`] reads per-reference coverage bin dumps.
//! - [`formats::parse_interval_file`] reads BED-like target region files.
//! - [`formats::select_usable_references`] picks references with enough coverage
//!   resolution to sample from.
//!
//! # Example
//!
//! ```
//! use bamstats_core::formats::parse_header;
//!
//! let header = "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:100\n@SQ\tSN:chr2\tLN:50\n";
//! let references = parse_header(header).unwrap();
//!
//! assert_eq!(references.len(), 2);
//! assert_eq!(references[0].name, "chr1");
//! ```
pub mod consts;
pub mod errors;
pub mod formats;
pub mod models;
pub mod utils;

// re-export for cleaner imports
pub use errors::FormatError;
pub use models::{
    CoverageBin, CoverageDump, CoverageGroup, Interval, ReferenceSequence, SampleWindow,
};
