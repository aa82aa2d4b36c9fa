//! # Region sampling for bamstats
//!
//! Picks a bounded set of genomic windows that a backend computes detailed alignment
//! statistics for, so that a multi-gigabyte alignment file never has to be scanned
//! in full.
//!
//! Intervals are split into three tiers by length. Windows are drawn from the largest
//! tier first. The smaller tiers top up the count with more, narrower windows when
//! the larger ones run out.
//!
//! # Example
//!
//! ```
//! use bamstats_core::models::Interval;
//! use bamstats_sampling::RegionSampler;
//!
//! let intervals = vec![Interval::new("chr1", 0, 5_000_000), Interval::new("chr2", 0, 3_000_000)];
//! let mut sampler = RegionSampler::with_seed(7);
//! let windows = sampler.sample(&intervals, None).unwrap();
//!
//! assert_eq!(windows.len(), 20);
//! assert!(windows.iter().all(|w| w.width() == 10_000));
//! ```
pub mod consts;
pub mod errors;
pub mod sampler;

pub use errors::SamplingError;
pub use sampler::RegionSampler;
