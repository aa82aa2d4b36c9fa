use log::debug;

use crate::consts::{GROUP_MARKER, MIN_USABLE_BINS, UNPLACED_MARKER};
use crate::errors::FormatError;
use crate::models::{CoverageBin, CoverageDump, CoverageGroup, ReferenceSequence};

///
/// Parse a coverage dump into per-reference bin groups.
///
/// A `#` line opens a group: its tab-separated fields are the reference index and,
/// when present, the mapped and unmapped read counts. A `*` line carries the count of
/// unplaced reads. Every other non-blank line holds `offset readCount` for the
/// most recently opened group.
///
/// # Arguments
/// - text: the dump as returned by the read-depth endpoint
///
/// # Errors
/// A data line before any group marker, or a line whose numbers don't parse.
pub fn parse_coverage_dump(text: &str) -> Result<CoverageDump, FormatError> {
    let mut dump = CoverageDump::default();
    let mut current: Option<usize> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end();

        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(GROUP_MARKER) {
            let mut fields = rest.split('\t');
            let id = fields.next().unwrap_or_default().trim().to_string();
            let mapped = parse_optional_count(fields.next(), line_no, line)?;
            let unmapped = parse_optional_count(fields.next(), line_no, line)?;

            // a repeated id reopens the existing group
            let position = match dump.groups.iter().position(|group| group.id == id) {
                Some(position) => position,
                None => {
                    dump.groups.push(CoverageGroup::new(id));
                    dump.groups.len() - 1
                }
            };
            let group = &mut dump.groups[position];
            group.mapped = mapped.or(group.mapped);
            group.unmapped = unmapped.or(group.unmapped);
            current = Some(position);
            continue;
        }

        if let Some(rest) = line.strip_prefix(UNPLACED_MARKER) {
            let value = rest.split_whitespace().next();
            dump.unplaced = parse_optional_count(value, line_no, line)?;
            continue;
        }

        let Some(position) = current else {
            return Err(FormatError::OrphanCoverageLine {
                line: line_no,
                content: line.to_string(),
            });
        };

        let mut fields = line.split_whitespace();
        let offset = parse_count(fields.next(), line_no, line)?;
        let read_count = parse_count(fields.next(), line_no, line)?;
        dump.groups[position]
            .bins
            .push(CoverageBin::new(offset, read_count));
    }

    for group in dump.groups.iter_mut() {
        group.bins.sort_by_key(|bin| bin.offset);
    }

    debug!(
        "parsed coverage dump with {} reference groups",
        dump.groups.len()
    );

    Ok(dump)
}

fn parse_count(field: Option<&str>, line: usize, content: &str) -> Result<u64, FormatError> {
    field
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| FormatError::CoverageLineParse {
            line,
            content: content.to_string(),
        })
}

fn parse_optional_count(
    field: Option<&str>,
    line: usize,
    content: &str,
) -> Result<Option<u64>, FormatError> {
    match field.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| FormatError::CoverageLineParse {
                line,
                content: content.to_string(),
            }),
    }
}

///
/// Keep the references that have enough coverage bins to be sampled from.
///
/// Groups are filtered in dump order, keeping those with more than
/// [`MIN_USABLE_BINS`] bins. The n-th kept group selects the n-th entry of
/// `references`: the join is positional, not by name or id.
///
/// # Arguments
/// - references: references in header listing order
/// - coverage: the parsed coverage dump for the same alignment file
pub fn select_usable_references(
    references: &[ReferenceSequence],
    coverage: &CoverageDump,
) -> Vec<ReferenceSequence> {
    coverage
        .groups
        .iter()
        .filter(|group| group.bins.len() > MIN_USABLE_BINS)
        .enumerate()
        .filter_map(|(position, _)| references.get(position).cloned())
        .collect()
}
