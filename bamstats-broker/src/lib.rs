//! # Streaming statistics broker
//!
//! Requests read-depth statistics for a large alignment file from a bamstats backend
//! without scanning the file: it fetches the header and coverage index, samples a
//! bounded set of windows with [`bamstats_sampling::RegionSampler`], opens a streaming
//! statistics request for them and publishes every metric as it changes.
//!
//! Collaborators talk to a [`StatsBroker`] through an [`EventHub`]: they set source
//! parameters, call [`StatsBroker::tick`] once per scheduling quantum, and receive
//! `header`, `read-depth` and per-metric events.
//!
//! # Example
//!
//! ```no_run
//! use bamstats_broker::{BackendConfig, HttpBackend, StatsBroker};
//!
//! # async fn run() -> Result<(), bamstats_broker::BrokerError> {
//! let config = BackendConfig::builder()
//!     .with_base_url("http://localhost:4000".to_string())
//!     .finish();
//! let mut broker = StatsBroker::new(HttpBackend::new(&config)?);
//!
//! let _total = broker.hub().subscribe("total_reads", |value| println!("total reads: {}", value));
//!
//! broker.set_url("https://example.org/NA12878.bam");
//! broker.tick().await?;
//! broker.join_stream().await;
//! # Ok(())
//! # }
//! ```
pub mod backend;
pub mod broker;
pub mod cancel;
pub mod config;
pub mod consts;
pub mod decoder;
pub mod errors;
pub mod hub;
pub mod scheduler;
pub mod snapshot;

// re-exports
pub use backend::{Backend, ChunkStream, HttpBackend};
pub use broker::{BrokerState, StatsBroker};
pub use cancel::{CancelHandle, CancelToken};
pub use config::BackendConfig;
pub use decoder::StreamDecoder;
pub use errors::BrokerError;
pub use hub::{EventHub, Subscription};
pub use scheduler::CoalescingScheduler;
pub use snapshot::StatSnapshot;
