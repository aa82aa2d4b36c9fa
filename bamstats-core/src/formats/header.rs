use crate::consts::{REFERENCE_LENGTH_TAG, REFERENCE_LINE_MARKER, REFERENCE_NAME_TAG};
use crate::errors::FormatError;
use crate::models::ReferenceSequence;

///
/// Parse the `@SQ` lines of an alignment header into reference sequences.
///
/// Output order follows the header. Duplicate names are kept as separate entries.
/// Lines that are not `@SQ` lines are skipped.
///
/// # Arguments
/// - text: header text as returned by the alignment-header endpoint
pub fn parse_header(text: &str) -> Result<Vec<ReferenceSequence>, FormatError> {
    let mut references = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end();

        if !line.starts_with(REFERENCE_LINE_MARKER) {
            continue;
        }

        let mut name: Option<&str> = None;
        let mut length: Option<&str> = None;
        for field in line.split('\t').skip(1) {
            if let Some(value) = field.strip_prefix(REFERENCE_NAME_TAG) {
                name = Some(value);
            } else if let Some(value) = field.strip_prefix(REFERENCE_LENGTH_TAG) {
                length = Some(value);
            }
        }

        let name = name.ok_or(FormatError::MissingHeaderField {
            line: line_no,
            tag: REFERENCE_NAME_TAG,
        })?;
        let length = length.ok_or(FormatError::MissingHeaderField {
            line: line_no,
            tag: REFERENCE_LENGTH_TAG,
        })?;

        let length = match length.trim().parse::<u64>() {
            Ok(length) if length > 0 => length,
            _ => {
                return Err(FormatError::InvalidReferenceLength {
                    line: line_no,
                    value: length.to_string(),
                });
            }
        };

        references.push(ReferenceSequence::new(name, length));
    }

    Ok(references)
}
