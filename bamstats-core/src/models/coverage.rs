use crate::consts::COVERAGE_BIN_SIZE;

///
/// Read count for one fixed-size bin of a reference.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CoverageBin {
    pub offset: u64,
    pub read_count: u64,
    pub avg_coverage: u64,
}

impl CoverageBin {
    /// Build a bin, deriving `avg_coverage` as `read_count / 16384` rounded to the nearest integer.
    pub fn new(offset: u64, read_count: u64) -> Self {
        let avg_coverage = (read_count as f64 / COVERAGE_BIN_SIZE as f64).round() as u64;
        CoverageBin {
            offset,
            read_count,
            avg_coverage,
        }
    }
}

///
/// All bins of one reference, as opened by a `#` line of a coverage dump.
///
/// `id` is the reference index as written by the backend.
///
#[derive(Eq, PartialEq, Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageGroup {
    pub id: String,
    pub mapped: Option<u64>,
    pub unmapped: Option<u64>,
    pub bins: Vec<CoverageBin>,
}

impl CoverageGroup {
    pub fn new(id: impl Into<String>) -> Self {
        CoverageGroup {
            id: id.into(),
            ..Default::default()
        }
    }
}

///
/// A parsed coverage dump: reference groups in listing order plus the
/// count of reads without a placement.
///
#[derive(Eq, PartialEq, Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageDump {
    pub groups: Vec<CoverageGroup>,
    pub unplaced: Option<u64>,
}

impl CoverageDump {
    pub fn get(&self, id: &str) -> Option<&CoverageGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
