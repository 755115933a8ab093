//! Ultrasonic sensor orchestrator
//!
//! Runs a burst of pings through a [`Driver`] and fuses them with a
//! [`Processor`] into one [`Reading`].
//!
//! # Failure Handling
//! - Hardware failures (`EchoStuck`, `HwFault`) end the burst at once and are
//!   returned as-is; the processor never sees a partial batch
//! - Logical failures (`Timeout`, `OutOfRange`) stay in the batch and are
//!   refined by the processor
//! - Nothing is retried here; raising the ping count after a `WeakSignal` is
//!   up to the caller
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut sensor = UsSensor::new(UsConfig::default(), driver, UsProcessor::new());
//! sensor.init()?;
//! let reading = sensor.read_distance(7);
//! ```

use crate::driver::Driver;
use crate::processor::Processor;
use crate::types::{PingBatch, Reading, UsConfig, MAX_PINGS};

#[cfg(feature = "rp")]
use crate::{
    driver::UsDriver,
    hal::rp::{EmbassyTimer, RpGpio, SensorPin},
    processor::UsProcessor,
};

/// Multi-ping distance sensor
pub struct UsSensor<D, P> {
    cfg: UsConfig,
    driver: D,
    processor: P,
}

impl<D: Driver, P: Processor> UsSensor<D, P> {
    pub fn new(cfg: UsConfig, driver: D, processor: P) -> Self {
        Self {
            cfg,
            driver,
            processor,
        }
    }

    /// Configure the pins and wait out the warmup time. Call once before measuring.
    pub fn init(&mut self) -> Result<(), D::Error> {
        self.driver.init(self.cfg.warmup_time_ms)
    }

    /// Put both pins back into a safe, low state
    pub fn deinit(&mut self) -> Result<(), D::Error> {
        self.driver.deinit()
    }

    /// Measure with `ping_count` pings, clamped to `1..=MAX_PINGS`
    pub fn read_distance(&mut self, ping_count: u8) -> Reading {
        let ping_count = clamp_ping_count(ping_count);

        let mut pings = PingBatch::new();
        for index in 0..ping_count {
            let reading = self.driver.ping_once(self.cfg);

            if reading.result.is_hardware_failure() {
                error!("Hardware failure on ping {}: {} - aborting", index, reading.result);
                return reading;
            }
            if !reading.result.is_success() {
                debug!("Ping {} failed: {}", index, reading.result);
            }

            if pings.push(reading).is_err() {
                break;
            }
        }

        self.processor.process(&pings, ping_count, self.cfg)
    }

    pub fn config(&self) -> &UsConfig {
        &self.cfg
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Give back the driver and processor
    pub fn release(self) -> (D, P) {
        (self.driver, self.processor)
    }
}

#[cfg(feature = "rp")]
impl<'d> UsSensor<UsDriver<RpGpio<'d>, EmbassyTimer>, UsProcessor> {
    /// Sensor on two RP235x pins, using the embassy time driver
    pub fn rp(trigger: embassy_rp::gpio::Flex<'d>, echo: embassy_rp::gpio::Flex<'d>, cfg: UsConfig) -> Self {
        let driver = UsDriver::new(
            RpGpio::new(trigger, echo),
            EmbassyTimer,
            SensorPin::Trigger,
            SensorPin::Echo,
        );
        Self::new(cfg, driver, UsProcessor::new())
    }
}

fn clamp_ping_count(ping_count: u8) -> u8 {
    let max = MAX_PINGS as u8;
    if ping_count == 0 || ping_count > max {
        warn!("ping_count {} out of range [1, {}], clamping", ping_count, max);
    }
    ping_count.clamp(1, max)
}
