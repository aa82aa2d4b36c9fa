use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

///
/// Container format of an alignment file, as told by its extension.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentKind {
    Bam,
    Cram,
}

impl FromStr for AlignmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cram" => Ok(AlignmentKind::Cram),
            // everything else is served through the BAM index route
            _ => Ok(AlignmentKind::Bam),
        }
    }
}

impl AlignmentKind {
    ///
    /// Detect the kind from a URL or path. Query strings and fragments are ignored.
    ///
    pub fn detect(location: &str) -> AlignmentKind {
        let path = strip_query(location);
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
        AlignmentKind::from_str(ext).unwrap_or(AlignmentKind::Bam)
    }

    ///
    /// Suffix appended to an alignment path to get its index path.
    ///
    pub fn index_suffix(&self) -> &'static str {
        match self {
            AlignmentKind::Bam => ".bai",
            AlignmentKind::Cram => ".crai",
        }
    }
}

fn strip_query(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    &location[..end]
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read a whole (optionally gzip'd) text file into memory.
///
pub fn read_to_string(path: &Path) -> Result<String> {
    let mut reader = get_dynamic_reader(path)?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(text)
}
