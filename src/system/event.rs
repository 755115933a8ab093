//! System Events
//!
//! Defines events and channels for inter-task communication.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use ultrasonic_ranger::Reading;

/// Multi-producer, single-consumer event channel with capacity of 10
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, 10> = Channel::new();

/// Sends an event to the system channel
pub async fn send(event: Events) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Receives the next event from the system channel
pub async fn wait() -> Events {
    EVENT_CHANNEL.receiver().receive().await
}

/// System-wide events
#[derive(Debug, Clone, Copy, Format)]
pub enum Events {
    /// A fused distance reading, with the number of pings it was taken from
    DistanceMeasured { reading: Reading, pings: u8 },
    /// Sensor pins could not be set up; no readings will follow
    DistanceSensorFailed,
}
