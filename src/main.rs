//! Ultrasonic ranging firmware entry point
//!
//! Initializes the system and spawns the measurement and reporting tasks.

#![no_std]
#![no_main]

use crate::task::{distance_measure::distance_measure, orchestrate::orchestrate};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use system::resources::{AssignedResources, UltrasonicDistanceSensorResources};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    let r = split_resources!(p);

    // The orchestrator has to be listening before the first reading is published
    spawner.spawn(orchestrate()).unwrap();
    spawner.spawn(distance_measure(r.us_distance_sensor)).unwrap();
}
