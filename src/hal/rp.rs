//! RP235x capability adapters
//!
//! Backs [`GpioHal`] with a pair of `embassy_rp` flex pins and [`TimerHal`]
//! with `embassy_time`.
//!
//! # Timing
//! - `now_us` reads the embassy time driver (1 MHz tick on RP235x)
//! - `delay_us` and `delay_ms` both spin via `block_for`; the driver API is
//!   blocking, so there is no executor to yield to from inside a ping

use core::convert::Infallible;

use embassy_rp::gpio::{Drive, Flex, Level, Pull};
use embassy_time::{block_for, Duration, Instant};

use super::{DriveStrength, GpioHal, PinConfig, PinMode, TimerHal};

/// The two lines of a pulse-echo sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum SensorPin {
    Trigger,
    Echo,
}

/// GPIO capability over the sensor's trigger and echo pins
pub struct RpGpio<'d> {
    trigger: Flex<'d>,
    echo: Flex<'d>,
}

impl<'d> RpGpio<'d> {
    pub fn new(trigger: Flex<'d>, echo: Flex<'d>) -> Self {
        Self { trigger, echo }
    }

    fn pin(&mut self, pin: SensorPin) -> &mut Flex<'d> {
        match pin {
            SensorPin::Trigger => &mut self.trigger,
            SensorPin::Echo => &mut self.echo,
        }
    }
}

impl GpioHal for RpGpio<'_> {
    type Pin = SensorPin;
    type Error = Infallible;

    fn reset_pin(&mut self, pin: SensorPin) -> Result<(), Infallible> {
        let flex = self.pin(pin);
        flex.set_as_input();
        flex.set_pull(Pull::None);
        flex.set_low();
        Ok(())
    }

    fn configure(&mut self, pin: SensorPin, config: PinConfig) -> Result<(), Infallible> {
        let flex = self.pin(pin);
        let pull = match (config.pull_up, config.pull_down) {
            (true, _) => Pull::Up,
            (false, true) => Pull::Down,
            (false, false) => Pull::None,
        };
        flex.set_pull(pull);
        // Flex pins only raise interrupts while a wait future is polled, so
        // `config.interrupt` needs no register write here.
        match config.mode {
            PinMode::Input => flex.set_as_input(),
            PinMode::Output => flex.set_as_output(),
        }
        Ok(())
    }

    fn set_level(&mut self, pin: SensorPin, level: bool) -> Result<(), Infallible> {
        self.pin(pin).set_level(Level::from(level));
        Ok(())
    }

    fn get_level(&mut self, pin: SensorPin) -> Result<bool, Infallible> {
        Ok(self.pin(pin).is_high())
    }

    fn set_direction(&mut self, pin: SensorPin, mode: PinMode) -> Result<(), Infallible> {
        let flex = self.pin(pin);
        match mode {
            PinMode::Input => flex.set_as_input(),
            PinMode::Output => flex.set_as_output(),
        }
        Ok(())
    }

    fn set_drive_capability(&mut self, pin: SensorPin, strength: DriveStrength) -> Result<(), Infallible> {
        let drive = match strength {
            DriveStrength::Weakest => Drive::_2mA,
            DriveStrength::Weak => Drive::_4mA,
            DriveStrength::Medium => Drive::_8mA,
            DriveStrength::Strongest => Drive::_12mA,
        };
        self.pin(pin).set_drive_strength(drive);
        Ok(())
    }
}

/// Timing capability over the embassy time driver
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyTimer;

impl TimerHal for EmbassyTimer {
    type Error = Infallible;

    fn now_us(&mut self) -> u64 {
        Instant::now().as_micros()
    }

    fn delay_us(&mut self, us: u32) -> Result<(), Infallible> {
        block_for(Duration::from_micros(u64::from(us)));
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), Infallible> {
        block_for(Duration::from_millis(u64::from(ms)));
        Ok(())
    }
}
