//! Async tasks spawned by the firmware entry point
pub mod distance_measure;
pub mod orchestrate;
