use thiserror::Error;

/// Errors raised while parsing backend text formats and interval files.
///
/// Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Coverage data on line {line} appears before any reference group: {content}")]
    OrphanCoverageLine { line: usize, content: String },

    #[error("Can't parse coverage line {line}: {content}")]
    CoverageLineParse { line: usize, content: String },

    #[error("Header line {line} is missing the {tag} field")]
    MissingHeaderField { line: usize, tag: &'static str },

    #[error("Invalid reference length on header line {line}: {value}")]
    InvalidReferenceLength { line: usize, value: String },

    #[error("Interval line {line} has fewer than 3 fields: {content}")]
    TooFewIntervalFields { line: usize, content: String },

    #[error("Error parsing interval on line {line}: {content}")]
    IntervalParse { line: usize, content: String },

    #[error("Interval on line {line} ends at {end}, which is not after its start {start}")]
    EmptyInterval { line: usize, start: u64, end: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
