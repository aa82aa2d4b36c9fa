use std::fmt::{self, Display};

///
/// A sub-range chosen by the sampler to request detailed statistics for.
/// Always lies inside the interval it was drawn from.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SampleWindow {
    pub reference_name: String,
    pub start: u64,
    pub end: u64,
}

impl SampleWindow {
    ///
    /// Get width of the window
    ///
    pub fn width(&self) -> u64 {
        self.end - self.start
    }

    ///
    /// Get BED line of the window
    ///
    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}", self.reference_name, self.start, self.end)
    }
}

impl Display for SampleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
