use std::collections::HashSet;

use log::debug;

use crate::consts::CHR_PREFIX;
use crate::errors::FormatError;
use crate::models::{Interval, ReferenceSequence};

///
/// Map an interval reference name onto the known reference names.
///
/// A name that is already known is returned unchanged. Otherwise a leading `chr` is
/// stripped and the result is used if it is known. Names that still don't match
/// are returned as-is.
///
pub fn normalize_reference_name(name: &str, known: &HashSet<&str>) -> String {
    if known.contains(name) {
        return name.to_string();
    }

    match name.strip_prefix(CHR_PREFIX) {
        Some(stripped) if known.contains(stripped) => stripped.to_string(),
        _ => {
            debug!("interval reference '{}' matches no known reference", name);
            name.to_string()
        }
    }
}

///
/// Parse a BED-like interval file: tab-separated `name start end` lines.
///
/// Blank lines, `#` comments and `track`/`browser` lines are skipped. Columns past
/// the third are ignored. Reference names are normalized against `references` with
/// [`normalize_reference_name`].
///
/// # Arguments
/// - text: contents of the interval file
/// - references: the references of the alignment file the intervals target
pub fn parse_interval_file(
    text: &str,
    references: &[ReferenceSequence],
) -> Result<Vec<Interval>, FormatError> {
    let known: HashSet<&str> = references.iter().map(|r| r.name.as_str()).collect();
    let mut intervals = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end();

        if line.trim().is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
        {
            continue;
        }

        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 3 {
            return Err(FormatError::TooFewIntervalFields {
                line: line_no,
                content: line.to_string(),
            });
        }

        let (start, end) = match (parts[1].trim().parse::<u64>(), parts[2].trim().parse::<u64>()) {
            (Ok(start), Ok(end)) => (start, end),
            _ => {
                return Err(FormatError::IntervalParse {
                    line: line_no,
                    content: line.to_string(),
                });
            }
        };

        if end <= start {
            return Err(FormatError::EmptyInterval {
                line: line_no,
                start,
                end,
            });
        }

        intervals.push(Interval {
            reference_name: normalize_reference_name(parts[0].trim(), &known),
            start,
            end,
        });
    }

    Ok(intervals)
}
