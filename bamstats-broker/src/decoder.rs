//! Reassembly of delimiter-separated JSON objects from an arbitrarily chunked byte stream.

use log::warn;
use serde_json::Value;

use crate::consts::STREAM_DELIMITER;

///
/// Splits a byte stream into JSON objects separated by a delimiter byte.
///
/// Chunks may cut an object anywhere, including inside a multi-byte character. The
/// trailing fragment of each chunk is carried over and completed by the next one.
///
/// ```
/// use bamstats_broker::StreamDecoder;
///
/// let mut decoder = StreamDecoder::new();
/// assert_eq!(decoder.feed(br#"{"a":1};{"b""#).len(), 1);
/// assert_eq!(decoder.feed(b":2}").len(), 1);
/// ```
///
#[derive(Debug)]
pub struct StreamDecoder {
    carry: Vec<u8>,
    delimiter: u8,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_delimiter(STREAM_DELIMITER)
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        StreamDecoder {
            carry: Vec::new(),
            delimiter,
        }
    }

    ///
    /// Decode every complete object available after appending `chunk`.
    ///
    /// The last piece of the chunk becomes the new carry-over if it does not
    /// parse yet. Earlier pieces that fail to parse are logged and dropped.
    ///
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        let mut data = std::mem::take(&mut self.carry);
        data.extend_from_slice(chunk);

        let delimiter = self.delimiter;
        let pieces: Vec<&[u8]> = data.split(|byte| *byte == delimiter).collect();
        let last = pieces.len() - 1;
        let mut decoded = Vec::new();

        for (index, piece) in pieces.iter().enumerate() {
            if piece.trim_ascii().is_empty() {
                continue;
            }
            match serde_json::from_slice::<Value>(piece) {
                Ok(value) => decoded.push(value),
                Err(_) if index == last => self.carry = piece.to_vec(),
                Err(err) => warn!(
                    "dropping undecodable stream fragment of {} bytes: {}",
                    piece.len(),
                    err
                ),
            }
        }

        decoded
    }

    ///
    /// Flush the carry-over at end of stream.
    ///
    /// Returns the buffered object if it is complete. An incomplete fragment is
    /// logged and dropped.
    ///
    pub fn finish(&mut self) -> Option<Value> {
        let rest = std::mem::take(&mut self.carry);
        if rest.trim_ascii().is_empty() {
            return None;
        }
        match serde_json::from_slice::<Value>(&rest) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "stream ended inside a fragment of {} bytes: {}",
                    rest.len(),
                    err
                );
                None
            }
        }
    }

    /// Forget any buffered fragment.
    pub fn reset(&mut self) {
        self.carry.clear();
    }

    pub fn has_pending(&self) -> bool {
        !self.carry.trim_ascii().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn decode_all(chunks: &[&[u8]]) -> Vec<Value> {
        let mut decoder = StreamDecoder::new();
        let mut values: Vec<Value> = chunks.iter().flat_map(|c| decoder.feed(c)).collect();
        values.extend(decoder.finish());
        values
    }

    #[rstest]
    fn test_object_split_across_chunks() {
        let mut decoder = StreamDecoder::new();

        assert_eq!(decoder.feed(br#"{"a":1};{"b""#), vec![json!({"a": 1})]);
        assert!(decoder.has_pending());
        assert_eq!(decoder.feed(b":2}"), vec![json!({"b": 2})]);
        assert!(!decoder.has_pending());
    }

    #[rstest]
    fn test_every_split_point_yields_same_objects() {
        let payload = r#"{"total":10,"name":"é"};{"total":11};{"hist":{"0":3,"1":4}};"#.as_bytes();
        let expected = vec![
            json!({"total": 10, "name": "é"}),
            json!({"total": 11}),
            json!({"hist": {"0": 3, "1": 4}}),
        ];

        for split in 0..=payload.len() {
            let (head, tail) = payload.split_at(split);
            assert_eq!(decode_all(&[head, tail]), expected, "split at {}", split);
        }
    }

    #[rstest]
    fn test_byte_by_byte() {
        let payload = br#"{"a":[1,2,3]};{"b":{"c":null}}"#;
        let chunks: Vec<&[u8]> = payload.chunks(1).collect();
        assert_eq!(
            decode_all(&chunks),
            vec![json!({"a": [1, 2, 3]}), json!({"b": {"c": null}})]
        );
    }

    #[rstest]
    fn test_broken_middle_fragment_is_dropped() {
        let mut decoder = StreamDecoder::new();
        let values = decoder.feed(br#"{"a":1};{oops};{"b":2};"#);
        assert_eq!(values, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[rstest]
    fn test_finish_drops_incomplete_tail() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(br#"{"a":"#);
        assert_eq!(decoder.finish(), None);
        assert!(!decoder.has_pending());
    }

    #[rstest]
    fn test_reset_discards_carry() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(br#"{"a":"#);
        decoder.reset();
        assert_eq!(decoder.feed(br#"{"b":2}"#), vec![json!({"b": 2})]);
    }
}
