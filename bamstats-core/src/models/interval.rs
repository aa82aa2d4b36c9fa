use std::fmt::{self, Display};

use crate::models::ReferenceSequence;

///
/// A named sub-range `[start, end)` of a reference, either a whole reference
/// or one line of a user-supplied interval file.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Interval {
    pub reference_name: String,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(reference_name: impl Into<String>, start: u64, end: u64) -> Self {
        Interval {
            reference_name: reference_name.into(),
            start,
            end,
        }
    }

    ///
    /// Get length of the interval
    ///
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `[start, end)` lies entirely within this interval.
    pub fn contains(&self, start: u64, end: u64) -> bool {
        start >= self.start && end <= self.end && start <= end
    }
}

impl From<&ReferenceSequence> for Interval {
    fn from(reference: &ReferenceSequence) -> Self {
        Interval {
            reference_name: reference.name.clone(),
            start: reference.start,
            end: reference.end,
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.reference_name, self.start, self.end)
    }
}
