//! Hardware Resource Management
//!
//! Allocates the pins used by the firmware to the task that owns them.
//!
//! # Resource Groups
//! - Distance Sensor: trigger and echo pins of the HC-SR04 / RCWL-1655 ultrasonic sensor

use assign_resources::assign_resources;
use embassy_rp::peripherals;

assign_resources! {
    /// Ultrasonic distance sensor pins, both driven through `Flex`
    us_distance_sensor: UltrasonicDistanceSensorResources {
       trigger_pin: PIN_15,
       echo_pin: PIN_14,
    },
}
