//! Ranging data model
//!
//! Result codes, single readings, filter selection and the per-call
//! configuration shared by the driver, the processor and the sensor.
//!
//! # Result Classes
//! - Success: `Ok`, `WeakSignal` (distance is valid)
//! - Logical failures: `Timeout`, `OutOfRange`, `HighVariance`, `InsufficientSamples`
//! - Hardware failures: `EchoStuck`, `HwFault` (need external action, e.g. power-cycling)
//!
//! # Usage
//!
//! ```rust,ignore
//! let reading = sensor.read_distance(7);
//! if let Some(cm) = reading.distance() {
//!     use_distance(cm);
//! } else if reading.result == UsResult::EchoStuck {
//!     power_cycle_sensor();
//! }
//! ```

use heapless::Vec;
use libm::fabsf;

/// Upper bound on pings per measurement, end to end
pub const MAX_PINGS: usize = 15;

/// Two distances closer than this are considered equal (cm)
const DISTANCE_EPSILON_CM: f32 = 0.001;

/// Fixed-capacity batch of per-ping readings
pub type PingBatch = Vec<Reading, MAX_PINGS>;

/// Outcome of a ping or of a fused measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsResult {
    /// Reliable reading: high ping ratio, low variance
    Ok,
    /// Usable reading, but ping ratio or spread is worse than ideal
    WeakSignal,
    /// Sensor did not answer within `timeout_us`
    Timeout,
    /// Distance outside `[min_distance_cm, max_distance_cm]`
    OutOfRange,
    /// Standard deviation of the valid pings exceeds `max_dev_cm`
    HighVariance,
    /// Too few valid pings to say anything
    InsufficientSamples,
    /// Echo line was already HIGH before the trigger
    EchoStuck,
    /// A GPIO or timer operation failed
    HwFault,
}

impl UsResult {
    /// Returns true if a reading with this result carries a valid distance
    pub const fn is_success(self) -> bool {
        matches!(self, UsResult::Ok | UsResult::WeakSignal)
    }

    /// Returns true for failures that invalidate the whole measurement session
    pub const fn is_hardware_failure(self) -> bool {
        matches!(self, UsResult::EchoStuck | UsResult::HwFault)
    }
}

/// Returns true if `result` carries a valid distance
pub const fn is_success(result: UsResult) -> bool {
    result.is_success()
}

/// A single ping or a fused measurement
///
/// `cm` is only meaningful when `result` is a success; everywhere else it is `0.0`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub result: UsResult,
    /// Distance in centimeters
    pub cm: f32,
}

impl Reading {
    /// Reliable reading at `cm`
    pub const fn ok(cm: f32) -> Self {
        Self { result: UsResult::Ok, cm }
    }

    /// Degraded but usable reading at `cm`
    pub const fn weak(cm: f32) -> Self {
        Self {
            result: UsResult::WeakSignal,
            cm,
        }
    }

    /// Reading without a distance
    pub const fn failure(result: UsResult) -> Self {
        Self { result, cm: 0.0 }
    }

    /// Distance in cm, if the result carries one
    pub fn distance(&self) -> Option<f32> {
        self.result.is_success().then_some(self.cm)
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::failure(UsResult::InsufficientSamples)
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.result == other.result
            && (!self.result.is_success() || fabsf(self.cm - other.cm) < DISTANCE_EPSILON_CM)
    }
}

/// Reduction applied to the valid samples of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    /// Middle element of the sorted samples (upper-middle for even counts)
    #[default]
    Median,
    /// Mean of the largest group of mutually close samples
    DominantCluster,
}

/// Hardware and measurement configuration
///
/// The number of pings is not part of the configuration; it is passed to each
/// measurement so the application can vary it at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsConfig {
    /// Settle delay after a successful ping (ms)
    pub ping_interval_ms: u16,
    /// Trigger pulse width (µs)
    pub ping_duration_us: u16,
    /// Maximum wait for each timing phase of a ping (µs)
    pub timeout_us: u32,
    /// Reduction applied to the valid samples
    pub filter: Filter,
    /// Closest accepted distance (cm)
    pub min_distance_cm: f32,
    /// Farthest accepted distance (cm)
    pub max_distance_cm: f32,
    /// Largest standard deviation accepted for a measurement (cm)
    pub max_dev_cm: f32,
    /// Settle time after pin setup, before the first ping (ms)
    pub warmup_time_ms: u16,
}

impl Default for UsConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: 70,
            ping_duration_us: 20,
            timeout_us: 30_000,
            filter: Filter::Median,
            min_distance_cm: 10.0,
            max_distance_cm: 200.0,
            max_dev_cm: 15.0,
            warmup_time_ms: 600,
        }
    }
}
