use std::fmt::{self, Display};

///
/// One named sequence (a chromosome or contig) listed in an alignment header.
///
/// `start` and `end` are 0-based offsets in the reference's own coordinates,
/// so `end` always equals `length`.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceSequence {
    pub name: String,
    pub length: u64,
    pub start: u64,
    pub end: u64,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        ReferenceSequence {
            name: name.into(),
            length,
            start: 0,
            end: length,
        }
    }
}

impl Display for ReferenceSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.name, self.length)
    }
}
