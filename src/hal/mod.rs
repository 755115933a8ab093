//! Hardware capabilities consumed by the driver
//!
//! The driver never touches registers or vendor APIs directly. It talks to two
//! narrow capabilities:
//! - [`GpioHal`]: pin reset/configure/read/write/drive strength
//! - [`TimerHal`]: monotonic microsecond clock, busy µs delay, yielding ms delay
//!
//! Production code plugs in the RP235x adapters from [`rp`] (feature `rp`);
//! tests plug in scripted fakes.

use core::fmt;

#[cfg(feature = "rp")]
pub mod rp;

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    Input,
    Output,
}

/// Output drive strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    Weakest,
    Weak,
    #[default]
    Medium,
    Strongest,
}

/// Full pin configuration applied in one go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub mode: PinMode,
    pub pull_up: bool,
    pub pull_down: bool,
    /// Edge/level interrupt enabled
    pub interrupt: bool,
}

impl PinConfig {
    /// Push-pull output, no pulls, no interrupt
    pub const fn output() -> Self {
        Self {
            mode: PinMode::Output,
            pull_up: false,
            pull_down: false,
            interrupt: false,
        }
    }

    /// Floating input, no interrupt
    pub const fn input() -> Self {
        Self {
            mode: PinMode::Input,
            pull_up: false,
            pull_down: false,
            interrupt: false,
        }
    }
}

/// GPIO capability
///
/// # Type Parameters
///
/// - `Pin`: platform pin identifier
/// - `Error`: failure reported by any pin operation
pub trait GpioHal {
    /// Platform pin identifier.
    type Pin: Copy + fmt::Debug;

    /// Error type for GPIO operations.
    type Error: fmt::Debug;

    /// Return a pin to its power-on state.
    fn reset_pin(&mut self, pin: Self::Pin) -> Result<(), Self::Error>;

    /// Apply a full configuration to a pin.
    fn configure(&mut self, pin: Self::Pin, config: PinConfig) -> Result<(), Self::Error>;

    /// Drive an output pin high (`true`) or low (`false`).
    fn set_level(&mut self, pin: Self::Pin, level: bool) -> Result<(), Self::Error>;

    /// Read the current logic level of a pin.
    fn get_level(&mut self, pin: Self::Pin) -> Result<bool, Self::Error>;

    /// Switch a pin between input and output.
    fn set_direction(&mut self, pin: Self::Pin, mode: PinMode) -> Result<(), Self::Error>;

    /// Set the output drive strength of a pin.
    fn set_drive_capability(&mut self, pin: Self::Pin, strength: DriveStrength) -> Result<(), Self::Error>;
}

/// Timing capability
pub trait TimerHal {
    /// Error type for delay operations.
    type Error: fmt::Debug;

    /// Monotonic time since an arbitrary epoch, in microseconds.
    fn now_us(&mut self) -> u64;

    /// Busy-wait; must not yield, jitter here corrupts the trigger pulse.
    fn delay_us(&mut self, us: u32) -> Result<(), Self::Error>;

    /// Millisecond delay that may let other work run.
    fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error>;
}

impl<G: GpioHal + ?Sized> GpioHal for &mut G {
    type Pin = G::Pin;
    type Error = G::Error;

    fn reset_pin(&mut self, pin: Self::Pin) -> Result<(), Self::Error> {
        G::reset_pin(self, pin)
    }

    fn configure(&mut self, pin: Self::Pin, config: PinConfig) -> Result<(), Self::Error> {
        G::configure(self, pin, config)
    }

    fn set_level(&mut self, pin: Self::Pin, level: bool) -> Result<(), Self::Error> {
        G::set_level(self, pin, level)
    }

    fn get_level(&mut self, pin: Self::Pin) -> Result<bool, Self::Error> {
        G::get_level(self, pin)
    }

    fn set_direction(&mut self, pin: Self::Pin, mode: PinMode) -> Result<(), Self::Error> {
        G::set_direction(self, pin, mode)
    }

    fn set_drive_capability(&mut self, pin: Self::Pin, strength: DriveStrength) -> Result<(), Self::Error> {
        G::set_drive_capability(self, pin, strength)
    }
}

impl<T: TimerHal + ?Sized> TimerHal for &mut T {
    type Error = T::Error;

    fn now_us(&mut self) -> u64 {
        T::now_us(self)
    }

    fn delay_us(&mut self, us: u32) -> Result<(), Self::Error> {
        T::delay_us(self, us)
    }

    fn delay_ms(&mut self, ms: u32) -> Result<(), Self::Error> {
        T::delay_ms(self, ms)
    }
}

/// Setup/teardown failure, tagged with the capability that reported it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError<G, T> {
    Gpio(G),
    Timer(T),
}

impl<G: fmt::Debug, T: fmt::Debug> fmt::Display for HalError<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalError::Gpio(e) => write!(f, "gpio operation failed: {e:?}"),
            HalError::Timer(e) => write!(f, "timer operation failed: {e:?}"),
        }
    }
}
