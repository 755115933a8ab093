//! Orchestrator Module
//!
//! Listens for system events and reports every distance reading with a
//! hint on what to check when the measurement failed.

use crate::system::event::{self, Events};
use crate::task::distance_measure::SENSOR_CONFIG;
use defmt::{error, info, warn};
use ultrasonic_ranger::{Reading, UsResult};

/// Main orchestrator task
#[embassy_executor::task]
pub async fn orchestrate() {
    info!("Orchestrator started");
    loop {
        match event::wait().await {
            Events::DistanceMeasured { reading, pings } => report(reading, pings),
            Events::DistanceSensorFailed => {
                error!("Distance sensor unavailable, check wiring and power")
            }
        }
    }
}

fn report(reading: Reading, pings: u8) {
    match reading.result {
        UsResult::Ok => info!("Distance: {} cm | quality: good | pings: {}", reading.cm, pings),
        UsResult::WeakSignal => warn!(
            "Distance: {} cm | quality: weak | pings: {}, taking more pings next time",
            reading.cm, pings
        ),
        UsResult::Timeout => warn!("No echo (timeout), check connections"),
        UsResult::OutOfRange => warn!(
            "Object out of range ({} cm to {} cm)",
            SENSOR_CONFIG.min_distance_cm, SENSOR_CONFIG.max_distance_cm
        ),
        UsResult::HighVariance => warn!("Readings spread too far, object might be moving"),
        UsResult::InsufficientSamples => warn!("Too few valid pings for a reliable distance"),
        UsResult::EchoStuck => error!("Echo line stuck high, power-cycle the sensor"),
        UsResult::HwFault => error!("GPIO or timer failure during measurement"),
    }
}
