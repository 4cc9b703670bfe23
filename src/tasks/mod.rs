//! Embassy tasks module
//!
//! Contains the async tasks for the firmware.

pub mod ble;

pub use ble::{ble_task, INTERVAL_SIGNAL, READING_CHANNEL};
