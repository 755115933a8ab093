//! Core system components for the ranging firmware
pub mod event;
pub mod resources;
