use bamstats_core::models::{Interval, ReferenceSequence, SampleWindow};
use bamstats_sampling::consts::{BASE_SAMPLE_COUNT, SECONDARY_BIN, TARGET_BIN, TERTIARY_BIN};
use bamstats_sampling::RegionSampler;

use pretty_assertions::assert_eq;
use rstest::*;

fn intervals(prefix: &str, n: usize, length: u64) -> Vec<Interval> {
    (0..n)
        .map(|i| Interval::new(format!("{}{:03}", prefix, i), 1_000, 1_000 + length))
        .collect()
}

fn assert_contained(windows: &[SampleWindow], sources: &[Interval]) {
    for window in windows {
        assert!(
            sources.iter().any(|source| source.reference_name == window.reference_name
                && window.start >= source.start
                && window.end <= source.end),
            "window {} escapes every source interval",
            window
        );
    }
}

fn assert_sorted(windows: &[SampleWindow]) {
    assert!(windows.windows(2).all(|pair| {
        (&pair[0].reference_name, pair[0].start) <= (&pair[1].reference_name, pair[1].start)
    }));
}

fn count_width(windows: &[SampleWindow], width: u64) -> usize {
    windows.iter().filter(|w| w.width() == width).count()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(42)]
#[case(2024)]
fn test_enough_ideal_intervals(#[case] seed: u64) {
    let sources = intervals("ref", 30, 250_000);
    let windows = RegionSampler::with_seed(seed).sample(&sources, None).unwrap();

    assert_eq!(windows.len(), BASE_SAMPLE_COUNT);
    assert_eq!(count_width(&windows, TARGET_BIN), BASE_SAMPLE_COUNT);
    assert_contained(&windows, &sources);
    assert_sorted(&windows);
}

#[rstest]
#[case(5)]
#[case(99)]
fn test_whole_genome_is_expanded(#[case] seed: u64) {
    let genome = vec![
        ReferenceSequence::new("chr2", 242_193_529),
        ReferenceSequence::new("chr1", 248_956_422),
        ReferenceSequence::new("chrM", 16_569),
    ];
    let sources: Vec<Interval> = genome.iter().map(Interval::from).collect();

    let windows = RegionSampler::with_seed(seed).sample(&sources, None).unwrap();

    assert_eq!(windows.len(), BASE_SAMPLE_COUNT);
    assert_contained(&windows, &sources);
    assert_sorted(&windows);
}

#[rstest]
#[case(3)]
#[case(17)]
fn test_only_tertiary_intervals(#[case] seed: u64) {
    let sources = intervals("t", 10, 3_000);
    let windows = RegionSampler::with_seed(seed).sample(&sources, None).unwrap();

    assert_eq!(windows.len(), 10);
    assert!(windows.iter().all(|w| w.width() == TERTIARY_BIN));
    assert_contained(&windows, &sources);
    assert_sorted(&windows);
}

#[rstest]
fn test_secondary_covers_shortfall_before_tertiary() {
    let mut sources = intervals("s", 50, 6_000);
    sources.extend(intervals("t", 5, 3_000));

    let windows = RegionSampler::with_seed(8).sample(&sources, None).unwrap();

    // twice the shortfall in half-width windows, nothing left for the tertiary tier
    assert_eq!(count_width(&windows, SECONDARY_BIN), 2 * BASE_SAMPLE_COUNT);
    assert_eq!(count_width(&windows, TERTIARY_BIN), 0);
    assert_contained(&windows, &sources);
}

#[rstest]
fn test_tertiary_tops_up_remaining_shortfall() {
    let mut sources = intervals("s", 4, 7_500);
    sources.extend(intervals("t", 100, 4_000));

    let windows = RegionSampler::with_seed(8).sample(&sources, None).unwrap();

    // 4 secondary windows count as 2 ideal ones, leaving 18 * 4 tertiary windows
    assert_eq!(count_width(&windows, SECONDARY_BIN), 4);
    assert_eq!(count_width(&windows, TERTIARY_BIN), 72);
    assert_contained(&windows, &sources);
    assert_sorted(&windows);
}

#[rstest]
#[case(Some(2), 30, 15_000)]
#[case(Some(4), 40, 20_000)]
#[case(Some(1), 20, 10_000)]
#[case(None, 20, 10_000)]
fn test_size_multiplier(
    #[case] multiplier: Option<u32>,
    #[case] expected_count: usize,
    #[case] expected_width: u64,
) {
    let sources = intervals("ref", 60, 500_000);
    let windows = RegionSampler::with_seed(21).sample(&sources, multiplier).unwrap();

    assert_eq!(windows.len(), expected_count);
    assert!(windows.iter().all(|w| w.width() == expected_width));
    assert_contained(&windows, &sources);
}

#[rstest]
fn test_short_intervals_are_discarded() {
    let sources = intervals("x", 25, 2_499);
    let windows = RegionSampler::with_seed(1).sample(&sources, None).unwrap();
    assert!(windows.is_empty());
}

#[rstest]
fn test_unexpandable_ideal_intervals_are_kept() {
    let mut sources = intervals("i", 3, TARGET_BIN);
    sources.extend(intervals("s", 40, 5_000));

    let windows = RegionSampler::with_seed(4).sample(&sources, None).unwrap();

    assert_eq!(count_width(&windows, TARGET_BIN), 3);
    assert_eq!(count_width(&windows, SECONDARY_BIN), 34);
    assert_contained(&windows, &sources);
}

#[rstest]
#[case(2)]
#[case(3)]
fn test_sample_more_keeps_narrow_ideal_intervals(#[case] multiplier: u32) {
    let sources = intervals("target", 30, 12_000);

    let base = RegionSampler::with_seed(13).sample(&sources, None).unwrap();
    let more = RegionSampler::with_seed(13)
        .sample(&sources, Some(multiplier))
        .unwrap();

    assert_eq!(base.len(), BASE_SAMPLE_COUNT);
    assert!(more.len() >= base.len());
    assert!(more.iter().all(|w| w.width() == 12_000));
    assert_contained(&more, &sources);
}
