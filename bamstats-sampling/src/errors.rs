use bamstats_core::models::Interval;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SamplingError {
    /// A computed window does not fit inside the interval it was drawn from.
    #[error("Sample window {window} falls outside its source interval {interval}")]
    WindowOutOfBounds { window: Interval, interval: Interval },
}
