use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use bamstats_core::formats::{
    parse_coverage_dump, parse_header, parse_interval_file, select_usable_references,
};
use bamstats_core::models::{Interval, SampleWindow};
use bamstats_core::utils::read_to_string;
use bamstats_sampling::RegionSampler;

/// Execute the `sample` subcommand
/// # Arguments
/// - matches: matched items from CLAP args
pub fn run_sample(matches: &ArgMatches) -> Result<()> {
    let header = matches
        .get_one::<String>("header")
        .context("A path to a header file is required.")?;
    let coverage = matches
        .get_one::<String>("coverage")
        .context("A path to a coverage dump is required.")?;
    let intervals = matches.get_one::<String>("intervals").map(Path::new);
    let multiplier = matches.get_one::<u32>("multiplier").copied();

    let mut sampler = match matches.get_one::<u64>("seed") {
        Some(seed) => RegionSampler::with_seed(*seed),
        None => RegionSampler::new(),
    };

    let windows = sample_windows(
        Path::new(header),
        Path::new(coverage),
        intervals,
        multiplier,
        &mut sampler,
    )?;

    match matches.get_one::<String>("output") {
        Some(output) => {
            let file = File::create(output)
                .with_context(|| format!("Failed to create output file: {}", output))?;
            write_windows(&windows, BufWriter::new(file))?;
            info!("wrote {} windows to {}", windows.len(), output);
        }
        None => write_windows(&windows, BufWriter::new(io::stdout().lock()))?,
    }

    Ok(())
}

///
/// Parse the saved header and coverage dump, and sample windows from the usable
/// references, or from the target regions of `intervals` when given.
///
pub fn sample_windows(
    header: &Path,
    coverage: &Path,
    intervals: Option<&Path>,
    multiplier: Option<u32>,
    sampler: &mut RegionSampler,
) -> Result<Vec<SampleWindow>> {
    let references = parse_header(&read_to_string(header)?)
        .with_context(|| format!("Malformed header file: {:?}", header))?;
    let dump = parse_coverage_dump(&read_to_string(coverage)?)
        .with_context(|| format!("Malformed coverage dump: {:?}", coverage))?;

    let candidates: Vec<Interval> = match intervals {
        Some(path) => parse_interval_file(&read_to_string(path)?, &references)
            .with_context(|| format!("Malformed interval file: {:?}", path))?,
        None => select_usable_references(&references, &dump)
            .iter()
            .map(Interval::from)
            .collect(),
    };
    info!(
        "sampling from {} candidate intervals over {} references",
        candidates.len(),
        references.len()
    );

    Ok(sampler.sample(&candidates, multiplier)?)
}

pub fn write_windows<W: Write>(windows: &[SampleWindow], mut out: W) -> Result<()> {
    for window in windows {
        writeln!(out, "{}", window.as_string())?;
    }
    out.flush()?;
    Ok(())
}
