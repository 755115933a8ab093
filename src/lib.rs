//! Pulse-echo ultrasonic ranging
//!
//! Drives the trigger/echo pin pair of an HC-SR04 compatible sensor, times the
//! echo pulse and fuses several pings into one robust distance with a quality
//! classification.
//!
//! # Layers
//! - [`hal`]: GPIO and timer capabilities the driver runs on (plus RP235x adapters with `rp`)
//! - [`driver`]: single-ping protocol state machine
//! - [`processor`]: statistical fusion of a ping batch (median / dominant cluster)
//! - [`sensor`]: orchestration of a burst of pings
//!
//! # Features
//! - `defmt`: log through `defmt`
//! - `rp`: RP235x adapters and the demo firmware (implies `defmt`)

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod driver;
pub mod hal;
pub mod processor;
pub mod sensor;
pub mod types;

#[cfg(test)]
mod mock;

pub use driver::{Driver, UsDriver};
pub use processor::{Processor, UsProcessor};
pub use sensor::UsSensor;
pub use types::{is_success, Filter, Reading, UsConfig, UsResult, MAX_PINGS};
