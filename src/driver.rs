//! Single-ping protocol driver
//!
//! Bit-bangs the trigger/echo handshake of an HC-SR04 compatible sensor and
//! maps every hardware and timing outcome to a [`UsResult`].
//!
//! # Ping Sequence
//! 1. Prepare: echo forced to output low (discharges residue), then input
//! 2. Stuck check: echo already HIGH means a broken or miswired sensor
//! 3. Trigger: `ping_duration_us` HIGH pulse on the trigger pin (busy wait)
//! 4. Rising edge: poll echo until HIGH, bounded by `timeout_us`
//! 5. Pulse: poll echo until LOW, bounded by `timeout_us` from the rising edge
//! 6. Convert: `cm = duration_us * 0.0343 / 2`, then range check
//! 7. Settle: `ping_interval_ms` yielding delay after a good ping
//!
//! # Error Mapping
//! - Any GPIO/timer failure during a ping: `HwFault`
//! - Any phase exceeding `timeout_us`: `Timeout`
//! - Echo HIGH before the trigger: `EchoStuck`
//! - Distance outside the configured limits: `OutOfRange`
//!
//! Setup and teardown are not pings: their failures are returned untranslated
//! as [`HalError`].

use core::fmt;

use crate::hal::{GpioHal, HalError, PinConfig, PinMode, TimerHal};
use crate::types::{Reading, UsConfig, UsResult};

/// Speed of sound at ~20°C in cm/µs
pub const SOUND_SPEED_CM_PER_US: f32 = 0.0343;

/// Converts an echo pulse width to a one-way distance
///
/// The pulse covers the round trip, hence the halving.
pub fn duration_to_cm(duration_us: u32) -> f32 {
    (duration_us as f32 * SOUND_SPEED_CM_PER_US) / 2.0
}

/// Low-level sensor driver: one ping per call
pub trait Driver {
    /// Error reported by `init` and `deinit`.
    type Error: fmt::Debug;

    /// Configure the pins and wait `warmup_time_ms` for the sensor to settle.
    fn init(&mut self, warmup_time_ms: u16) -> Result<(), Self::Error>;

    /// Return both pins to a safe state.
    fn deinit(&mut self) -> Result<(), Self::Error>;

    /// Run one trigger-and-measure cycle.
    fn ping_once(&mut self, cfg: UsConfig) -> Reading;
}

impl<D: Driver + ?Sized> Driver for &mut D {
    type Error = D::Error;

    fn init(&mut self, warmup_time_ms: u16) -> Result<(), Self::Error> {
        D::init(self, warmup_time_ms)
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        D::deinit(self)
    }

    fn ping_once(&mut self, cfg: UsConfig) -> Reading {
        D::ping_once(self, cfg)
    }
}

fn hw_fault<E>(_: E) -> UsResult {
    UsResult::HwFault
}

/// HC-SR04 style driver over a trigger/echo pin pair
pub struct UsDriver<G: GpioHal, T: TimerHal> {
    gpio: G,
    timer: T,
    trig_pin: G::Pin,
    echo_pin: G::Pin,
}

impl<G: GpioHal, T: TimerHal> UsDriver<G, T> {
    pub fn new(gpio: G, timer: T, trig_pin: G::Pin, echo_pin: G::Pin) -> Self {
        Self {
            gpio,
            timer,
            trig_pin,
            echo_pin,
        }
    }

    /// Give back the capabilities
    pub fn release(self) -> (G, T) {
        (self.gpio, self.timer)
    }

    /// Steps 1-6 of the ping sequence; `Err` carries the failure class
    fn measure(&mut self, cfg: &UsConfig) -> Result<f32, UsResult> {
        self.prepare_echo()?;
        self.check_echo_stuck()?;
        self.trigger(cfg.ping_duration_us)?;
        self.wait_rising_edge(cfg.timeout_us)?;
        let duration_us = self.measure_pulse(cfg.timeout_us)?;

        let cm = duration_to_cm(duration_us);
        if cm < cfg.min_distance_cm || cm > cfg.max_distance_cm {
            debug!(
                "Out of range: {} cm (limits: {}-{})",
                cm, cfg.min_distance_cm, cfg.max_distance_cm
            );
            return Err(UsResult::OutOfRange);
        }
        Ok(cm)
    }

    fn prepare_echo(&mut self) -> Result<(), UsResult> {
        self.gpio.set_direction(self.echo_pin, PinMode::Output).map_err(hw_fault)?;
        self.gpio.set_level(self.echo_pin, false).map_err(hw_fault)?;
        self.gpio.set_direction(self.echo_pin, PinMode::Input).map_err(hw_fault)
    }

    fn check_echo_stuck(&mut self) -> Result<(), UsResult> {
        if self.gpio.get_level(self.echo_pin).map_err(hw_fault)? {
            return Err(UsResult::EchoStuck);
        }
        Ok(())
    }

    fn trigger(&mut self, pulse_duration_us: u16) -> Result<(), UsResult> {
        self.gpio.set_level(self.trig_pin, true).map_err(hw_fault)?;
        self.timer.delay_us(u32::from(pulse_duration_us)).map_err(hw_fault)?;
        self.gpio.set_level(self.trig_pin, false).map_err(hw_fault)
    }

    fn wait_rising_edge(&mut self, timeout_us: u32) -> Result<(), UsResult> {
        let start = self.timer.now_us();
        loop {
            let level = self.gpio.get_level(self.echo_pin).map_err(hw_fault)?;
            if self.timer.now_us().saturating_sub(start) > u64::from(timeout_us) {
                return Err(UsResult::Timeout);
            }
            if level {
                return Ok(());
            }
        }
    }

    /// Returns the echo pulse width in µs
    fn measure_pulse(&mut self, timeout_us: u32) -> Result<u32, UsResult> {
        let echo_start = self.timer.now_us();
        loop {
            let level = self.gpio.get_level(self.echo_pin).map_err(hw_fault)?;
            if self.timer.now_us().saturating_sub(echo_start) > u64::from(timeout_us) {
                return Err(UsResult::Timeout);
            }
            if !level {
                break;
            }
        }
        let echo_end = self.timer.now_us();
        Ok(u32::try_from(echo_end.saturating_sub(echo_start)).unwrap_or(u32::MAX))
    }
}

impl<G: GpioHal, T: TimerHal> Driver for UsDriver<G, T> {
    type Error = HalError<G::Error, T::Error>;

    fn init(&mut self, warmup_time_ms: u16) -> Result<(), Self::Error> {
        debug!("Initializing driver, warmup {} ms", warmup_time_ms);

        // Trigger: output, idle low
        self.gpio.reset_pin(self.trig_pin).map_err(HalError::Gpio)?;
        self.gpio
            .configure(self.trig_pin, PinConfig::output())
            .map_err(HalError::Gpio)?;
        self.gpio.set_level(self.trig_pin, false).map_err(HalError::Gpio)?;

        // Echo: input, after one low pulse to clear any residual latch
        self.gpio.reset_pin(self.echo_pin).map_err(HalError::Gpio)?;
        self.gpio
            .configure(self.echo_pin, PinConfig::input())
            .map_err(HalError::Gpio)?;
        self.gpio
            .set_direction(self.echo_pin, PinMode::Output)
            .map_err(HalError::Gpio)?;
        self.gpio.set_level(self.echo_pin, false).map_err(HalError::Gpio)?;
        self.gpio
            .set_direction(self.echo_pin, PinMode::Input)
            .map_err(HalError::Gpio)?;

        if warmup_time_ms > 0 {
            self.timer
                .delay_ms(u32::from(warmup_time_ms))
                .map_err(HalError::Timer)?;
        }
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        self.gpio.set_level(self.trig_pin, false).map_err(HalError::Gpio)?;
        self.gpio.set_level(self.echo_pin, false).map_err(HalError::Gpio)?;
        self.gpio.reset_pin(self.trig_pin).map_err(HalError::Gpio)?;
        self.gpio.reset_pin(self.echo_pin).map_err(HalError::Gpio)
    }

    fn ping_once(&mut self, cfg: UsConfig) -> Reading {
        let cm = match self.measure(&cfg) {
            Ok(cm) => cm,
            Err(result) => return Reading::failure(result),
        };

        // Failed pings skip the settle delay and return straight away.
        if cfg.ping_interval_ms > 0 && self.timer.delay_ms(u32::from(cfg.ping_interval_ms)).is_err() {
            debug!("Settle delay failed, ignoring");
        }
        Reading::ok(cm)
    }
}
