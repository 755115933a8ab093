//! Distance sensor handling
//!
//! Periodically measures the distance to the nearest object with an RCWL-1655
//! ultrasonic sensor and publishes every fused reading to the orchestrator.
//!
//! # Sensor Operation
//! - Measurements taken every 2s
//! - Each measurement fuses a burst of pings with the dominant-cluster filter
//! - Distance reported in centimeters
//!
//! # Adaptive Ping Count
//! - Starts with 7 pings per measurement
//! - A weak signal adds one ping to the next burst, up to `MAX_PINGS`
//! - A clean reading drops back to 7
//!
//! # Error Handling
//! - Pin setup failure is reported once and ends the task
//! - Failed measurements are published like any other reading; the
//!   orchestrator decides what to tell the user

use crate::system::event::{send, Events};
use crate::system::resources::UltrasonicDistanceSensorResources;
use defmt::{error, info, Debug2Format};
use embassy_rp::gpio::Flex;
use embassy_time::{Duration, Timer};
use ultrasonic_ranger::{Filter, UsConfig, UsResult, UsSensor, MAX_PINGS};

/// Time between measurements
const MEASUREMENT_INTERVAL: Duration = Duration::from_millis(2000);

/// Pings per measurement while the signal is good
const INITIAL_PING_COUNT: u8 = 7;

/// RCWL-1655 profile
///
/// The sensor needs 70ms between pings to let the previous echo die out and
/// is only trusted between 25cm and 200cm. It is ready right after power-up.
pub const SENSOR_CONFIG: UsConfig = UsConfig {
    ping_interval_ms: 70,
    ping_duration_us: 20,
    timeout_us: 25_000,
    filter: Filter::DominantCluster,
    min_distance_cm: 25.0,
    max_distance_cm: 200.0,
    max_dev_cm: 15.0,
    warmup_time_ms: 0,
};

/// Main distance measurement task
#[embassy_executor::task]
pub async fn distance_measure(r: UltrasonicDistanceSensorResources) {
    let trigger = Flex::new(r.trigger_pin);
    let echo = Flex::new(r.echo_pin);
    let mut sensor = UsSensor::rp(trigger, echo, SENSOR_CONFIG);

    if let Err(e) = sensor.init() {
        error!("Ultrasonic sensor init failed: {}", Debug2Format(&e));
        send(Events::DistanceSensorFailed).await;
        return;
    }
    info!("Ultrasonic sensor ready");

    let mut ping_count = INITIAL_PING_COUNT;
    loop {
        let reading = sensor.read_distance(ping_count);
        send(Events::DistanceMeasured {
            reading,
            pings: ping_count,
        })
        .await;

        ping_count = next_ping_count(reading.result, ping_count);
        Timer::after(MEASUREMENT_INTERVAL).await;
    }
}

/// Ping count for the next burst, given the outcome of the last one
fn next_ping_count(result: UsResult, current: u8) -> u8 {
    match result {
        UsResult::WeakSignal => current.saturating_add(1).min(MAX_PINGS as u8),
        UsResult::Ok => INITIAL_PING_COUNT,
        _ => current,
    }
}
