use log::debug;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use bamstats_core::models::{Interval, SampleWindow};

use crate::consts::{
    BASE_SAMPLE_COUNT, EXHAUSTIVE_OFFSET_LIMIT, SECONDARY_BIN, TARGET_BIN, TERTIARY_BIN,
};
use crate::errors::SamplingError;

/// Candidate intervals split by length.
#[derive(Debug, Default)]
struct Tiers {
    ideal: Vec<Interval>,
    secondary: Vec<Interval>,
    tertiary: Vec<Interval>,
}

impl Tiers {
    fn classify(intervals: &[Interval]) -> Tiers {
        let mut tiers = Tiers::default();
        for interval in intervals {
            let length = interval.len();
            if length >= TARGET_BIN {
                tiers.ideal.push(interval.clone());
            } else if length >= SECONDARY_BIN {
                tiers.secondary.push(interval.clone());
            } else if length >= TERTIARY_BIN {
                tiers.tertiary.push(interval.clone());
            }
        }
        tiers
    }
}

///
/// Draws sample windows from genomic intervals.
///
/// Owns its random source so that a seeded sampler reproduces its output exactly.
///
pub struct RegionSampler {
    rng: StdRng,
}

impl Default for RegionSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionSampler {
    /// Creates a sampler seeded from the operating system.
    pub fn new() -> Self {
        RegionSampler {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a sampler with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        RegionSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    ///
    /// Select sample windows from `intervals`.
    ///
    /// Without a multiplier (or with one of at most 1) up to [`BASE_SAMPLE_COUNT`] windows
    /// of [`TARGET_BIN`] bases are drawn. A multiplier `m > 1` widens windows to
    /// `TARGET_BIN + TARGET_BIN / 4 * m` and raises the count to `BASE_SAMPLE_COUNT +
    /// BASE_SAMPLE_COUNT / 4 * m`. When the ideal tier can't supply [`BASE_SAMPLE_COUNT`]
    /// windows, the secondary and tertiary tiers add proportionally more narrow ones.
    ///
    /// Ideal intervals shorter than a widened window yield one window spanning the
    /// whole interval, so raising the multiplier never empties the ideal tier.
    ///
    /// The result is sorted by reference name, then start.
    ///
    /// # Arguments
    /// - intervals: candidate intervals; those shorter than [`TERTIARY_BIN`] are ignored
    /// - size_multiplier: how many times the user asked to sample more
    pub fn sample(
        &mut self,
        intervals: &[Interval],
        size_multiplier: Option<u32>,
    ) -> Result<Vec<SampleWindow>, SamplingError> {
        let mut tiers = Tiers::classify(intervals);

        let (count, size) = match size_multiplier {
            Some(multiplier) if multiplier > 1 => (
                BASE_SAMPLE_COUNT + (BASE_SAMPLE_COUNT / 4) * multiplier as usize,
                TARGET_BIN + (TARGET_BIN / 4) * multiplier as u64,
            ),
            _ => (BASE_SAMPLE_COUNT, TARGET_BIN),
        };

        if tiers.ideal.len() < BASE_SAMPLE_COUNT {
            let expanded = self.expand(&tiers.ideal, size);
            if expanded.len() > tiers.ideal.len() {
                tiers.ideal = expanded;
            }
        }

        let mut windows = Vec::with_capacity(count);
        // ideal intervals narrower than a widened window are sampled whole
        self.draw(&tiers.ideal, count, TARGET_BIN, size, &mut windows)?;

        // shortfall is counted in ideal-width windows
        let mut shortfall = BASE_SAMPLE_COUNT.saturating_sub(windows.len());
        for (pool, width) in [
            (&tiers.secondary, SECONDARY_BIN),
            (&tiers.tertiary, TERTIARY_BIN),
        ] {
            if shortfall == 0 {
                break;
            }
            let ratio = (TARGET_BIN / width) as usize;
            let drawn = self.draw(pool, shortfall * ratio, width, width, &mut windows)?;
            debug!(
                "topped up {} windows of {} bases for a shortfall of {}",
                drawn, width, shortfall
            );
            shortfall = shortfall.saturating_sub(drawn / ratio);
        }

        windows.sort();
        Ok(windows)
    }

    ///
    /// Split each interval longer than `width` into up to [`BASE_SAMPLE_COUNT`]
    /// randomly placed sub-intervals of exactly `width` bases.
    ///
    /// With fewer than [`EXHAUSTIVE_OFFSET_LIMIT`] possible offsets, the offsets are
    /// distinct. Otherwise they are drawn independently and may coincide.
    ///
    fn expand(&mut self, intervals: &[Interval], width: u64) -> Vec<Interval> {
        let mut expanded = Vec::new();

        for interval in intervals {
            if interval.len() <= width {
                expanded.push(interval.clone());
                continue;
            }

            let positions = interval.len() - width + 1;
            let offsets: Vec<u64> = if positions < EXHAUSTIVE_OFFSET_LIMIT {
                let amount = BASE_SAMPLE_COUNT.min(positions as usize);
                index::sample(&mut self.rng, positions as usize, amount)
                    .into_iter()
                    .map(|offset| offset as u64)
                    .collect()
            } else {
                (0..BASE_SAMPLE_COUNT)
                    .map(|_| self.rng.random_range(0..positions))
                    .collect()
            };

            expanded.extend(offsets.into_iter().map(|offset| Interval {
                reference_name: interval.reference_name.clone(),
                start: interval.start + offset,
                end: interval.start + offset + width,
            }));
        }

        expanded
    }

    ///
    /// Draw up to `count` windows, each from a distinct interval of `pool` chosen
    /// uniformly at random. Windows are `width` bases wide, or as wide as the source
    /// interval when that is shorter. Intervals shorter than `min_width` are skipped.
    /// Returns how many windows were added to `out`.
    ///
    fn draw(
        &mut self,
        pool: &[Interval],
        count: usize,
        min_width: u64,
        width: u64,
        out: &mut Vec<SampleWindow>,
    ) -> Result<usize, SamplingError> {
        let mut remaining: Vec<&Interval> = pool
            .iter()
            .filter(|interval| interval.len() >= min_width)
            .collect();
        let mut drawn = 0;

        while drawn < count && !remaining.is_empty() {
            let pick = self.rng.random_range(0..remaining.len());
            let source = remaining.swap_remove(pick);

            let width = width.min(source.len());
            let start = source.start + self.rng.random_range(0..=source.len() - width);
            let window = SampleWindow {
                reference_name: source.reference_name.clone(),
                start,
                end: start + width,
            };
            check_within(&window, source)?;

            out.push(window);
            drawn += 1;
        }

        Ok(drawn)
    }
}

fn check_within(window: &SampleWindow, source: &Interval) -> Result<(), SamplingError> {
    if window.reference_name == source.reference_name && source.contains(window.start, window.end) {
        Ok(())
    } else {
        Err(SamplingError::WindowOutOfBounds {
            window: Interval::new(window.reference_name.clone(), window.start, window.end),
            interval: source.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_classify_tiers() {
        let intervals = vec![
            Interval::new("1", 0, 10_000),
            Interval::new("1", 0, 9_999),
            Interval::new("1", 0, 5_000),
            Interval::new("1", 0, 4_999),
            Interval::new("1", 0, 2_500),
            Interval::new("1", 0, 2_499),
        ];
        let tiers = Tiers::classify(&intervals);

        assert_eq!(tiers.ideal.len(), 1);
        assert_eq!(tiers.secondary.len(), 2);
        assert_eq!(tiers.tertiary.len(), 2);
    }

    #[rstest]
    fn test_expand_few_offsets_are_distinct() {
        let mut sampler = RegionSampler::with_seed(3);
        // 10_030 - 10_000 + 1 = 31 possible offsets
        let expanded = sampler.expand(&[Interval::new("2", 100, 10_130)], TARGET_BIN);

        assert_eq!(expanded.len(), BASE_SAMPLE_COUNT);
        let mut starts: Vec<u64> = expanded.iter().map(|i| i.start).collect();
        starts.sort();
        starts.dedup();
        assert_eq!(starts.len(), BASE_SAMPLE_COUNT);
        assert!(expanded.iter().all(|i| i.start >= 100 && i.end <= 10_130));
    }

    #[rstest]
    fn test_expand_caps_at_possible_offsets() {
        let mut sampler = RegionSampler::with_seed(3);
        let expanded = sampler.expand(&[Interval::new("2", 0, 10_004)], TARGET_BIN);
        assert_eq!(expanded.len(), 5);
    }

    #[rstest]
    fn test_expand_keeps_exact_width_intervals() {
        let mut sampler = RegionSampler::with_seed(3);
        let interval = Interval::new("2", 0, 10_000);
        assert_eq!(sampler.expand(&[interval.clone()], TARGET_BIN), vec![interval]);
    }

    #[rstest]
    fn test_check_within_rejects_overrun() {
        let window = SampleWindow {
            reference_name: "1".to_string(),
            start: 50,
            end: 150,
        };
        let result = check_within(&window, &Interval::new("1", 0, 100));
        assert!(matches!(result, Err(SamplingError::WindowOutOfBounds { .. })));
    }

    #[rstest]
    fn test_draw_caps_width_at_interval_length() {
        let mut sampler = RegionSampler::with_seed(3);
        let pool = vec![Interval::new("1", 500, 12_500), Interval::new("1", 0, 9_000)];
        let mut out = Vec::new();

        let drawn = sampler.draw(&pool, 5, TARGET_BIN, 15_000, &mut out).unwrap();

        assert_eq!(drawn, 1);
        assert_eq!(
            out,
            vec![SampleWindow {
                reference_name: "1".to_string(),
                start: 500,
                end: 12_500,
            }]
        );
    }

    #[rstest]
    fn test_same_seed_same_windows() {
        let intervals = vec![Interval::new("1", 0, 1_000_000), Interval::new("2", 0, 800_000)];
        let first = RegionSampler::with_seed(11).sample(&intervals, None).unwrap();
        let second = RegionSampler::with_seed(11).sample(&intervals, None).unwrap();
        assert_eq!(first, second);
    }
}
