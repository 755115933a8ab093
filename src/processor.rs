//! Statistical fusion of a ping batch
//!
//! Turns the per-ping readings of one measurement into a single distance with
//! a quality classification. Pure: no I/O, no state.
//!
//! # Decision Chain
//! 1. No pings attempted: `InsufficientSamples`
//! 2. Valid ratio below 0.4: refined to `OutOfRange`, `Timeout` or
//!    `InsufficientSamples` depending on what the failed pings reported
//! 3. Population standard deviation above `max_dev_cm`: `HighVariance`
//! 4. Reduce the valid samples with the configured [`Filter`]
//! 5. Ratio ≥ 0.7: `Ok`, or `WeakSignal` if the deviation exceeds 60% of the
//!    limit; ratio in [0.4, 0.7): always `WeakSignal`
//!
//! # Dominant Cluster
//! Sorted samples are grouped into runs where every member lies within 5 cm
//! of the run's first (smallest) value. The largest run of at least two wins
//! (first one on ties) and its mean is the result. Without any such run the
//! median is used instead.

use heapless::Vec;
use libm::sqrtf;

use crate::types::{Filter, Reading, UsConfig, UsResult, MAX_PINGS};

/// Ratio at or above which a measurement can be `Ok`
const VALID_PING_RATIO: f32 = 0.7;

/// Ratio below which there is not enough data for a distance
const INVALID_PING_RATIO: f32 = 0.4;

/// Fraction of `max_dev_cm` above which an otherwise good measurement is weak
const WEAK_VARIANCE_RATIO: f32 = 0.6;

/// Maximum spread within a cluster (cm)
const CLUSTER_DELTA_CM: f32 = 5.0;

/// Smallest run that counts as a cluster
const CLUSTER_MIN_SIZE: usize = 2;

type Samples = Vec<f32, MAX_PINGS>;

/// Reduces a batch of pings to one reading
pub trait Processor {
    /// Fuse the first `total_pings` readings of `pings`.
    fn process(&self, pings: &[Reading], total_pings: u8, cfg: UsConfig) -> Reading;
}

impl<P: Processor + ?Sized> Processor for &P {
    fn process(&self, pings: &[Reading], total_pings: u8, cfg: UsConfig) -> Reading {
        P::process(self, pings, total_pings, cfg)
    }
}

/// Default statistical processor
#[derive(Debug, Default, Clone, Copy)]
pub struct UsProcessor;

impl UsProcessor {
    pub const fn new() -> Self {
        Self
    }
}

impl Processor for UsProcessor {
    fn process(&self, pings: &[Reading], total_pings: u8, cfg: UsConfig) -> Reading {
        let total = usize::from(total_pings).min(MAX_PINGS);
        if total == 0 {
            return Reading::failure(UsResult::InsufficientSamples);
        }

        let mut samples = Samples::new();
        let mut timeouts = 0usize;
        let mut out_of_range = 0usize;
        for ping in pings.iter().take(total) {
            match ping.result {
                UsResult::Ok | UsResult::WeakSignal => {
                    // at most `total` pushes, which fits MAX_PINGS
                    let _ = samples.push(ping.cm);
                }
                UsResult::Timeout => timeouts += 1,
                UsResult::OutOfRange => out_of_range += 1,
                _ => {}
            }
        }

        let ratio = samples.len() as f32 / total as f32;
        if ratio < INVALID_PING_RATIO {
            debug!(
                "Insufficient samples: ratio={} (need >= {})",
                ratio, INVALID_PING_RATIO
            );
            return Reading::failure(refine_failure(timeouts, out_of_range));
        }

        let std_dev = std_dev(&samples);
        if std_dev > cfg.max_dev_cm {
            debug!("High variance: std_dev={} cm (limit={} cm)", std_dev, cfg.max_dev_cm);
            return Reading::failure(UsResult::HighVariance);
        }

        let distance_cm = match cfg.filter {
            Filter::Median => reduce_median(&mut samples),
            Filter::DominantCluster => reduce_dominant_cluster(&mut samples),
        };

        if ratio >= VALID_PING_RATIO {
            if std_dev > cfg.max_dev_cm * WEAK_VARIANCE_RATIO {
                debug!("Weak signal (high ratio, elevated variance): std_dev={}", std_dev);
                return Reading::weak(distance_cm);
            }
            return Reading::ok(distance_cm);
        }

        debug!("Weak signal (low ratio): ratio={}", ratio);
        Reading::weak(distance_cm)
    }
}

/// Names the dominant reason behind a batch without enough valid pings
fn refine_failure(timeouts: usize, out_of_range: usize) -> UsResult {
    if out_of_range >= timeouts && out_of_range > 0 {
        UsResult::OutOfRange
    } else if timeouts > 0 {
        UsResult::Timeout
    } else {
        UsResult::InsufficientSamples
    }
}

/// Population standard deviation
fn std_dev(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let count = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / count;
    let variance = samples
        .iter()
        .map(|sample| {
            let delta = sample - mean;
            delta * delta
        })
        .sum::<f32>()
        / count;
    sqrtf(variance)
}

/// Element at `n / 2` of the sorted samples
fn reduce_median(samples: &mut [f32]) -> f32 {
    samples.sort_unstable_by(f32::total_cmp);
    samples.get(samples.len() / 2).copied().unwrap_or(0.0)
}

fn reduce_dominant_cluster(samples: &mut [f32]) -> f32 {
    samples.sort_unstable_by(f32::total_cmp);

    // (sum, size) of the best run so far
    let mut best: Option<(f32, usize)> = None;
    for (index, &first) in samples.iter().enumerate() {
        let (sum, size) = samples
            .iter()
            .skip(index)
            .take_while(|&&value| value - first <= CLUSTER_DELTA_CM)
            .fold((0.0f32, 0usize), |(sum, size), &value| (sum + value, size + 1));

        if size >= CLUSTER_MIN_SIZE && best.map_or(true, |(_, best_size)| size > best_size) {
            best = Some((sum, size));
        }
    }

    match best {
        Some((sum, size)) => sum / size as f32,
        None => {
            warn!("No valid cluster found, falling back to median");
            reduce_median(samples)
        }
    }
}
